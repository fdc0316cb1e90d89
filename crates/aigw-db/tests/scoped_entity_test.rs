//! Integration tests for the scoped entity repositories (AI providers,
//! AI models, API key definitions) using in-memory SurrealDB.

use aigw_core::effective_items;
use aigw_core::error::GatewayError;
use aigw_core::models::ai_model::{CreateAiModel, UpdateAiModel};
use aigw_core::models::ai_provider::{CreateAiProvider, UpdateAiProvider};
use aigw_core::models::api_key::{CreateApiKeyDefinition, UpdateApiKeyDefinition};
use aigw_core::models::scope::ScopeInfo;
use aigw_core::repository::ScopedEntityRepository;
use aigw_db::repository::{
    SurrealAiModelRepository, SurrealAiProviderRepository, SurrealApiKeyRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    aigw_db::run_migrations(&db).await.unwrap();
    db
}

fn provider(name: &str, scope: ScopeInfo, base_url: &str) -> CreateAiProvider {
    CreateAiProvider {
        name: name.into(),
        label: name.to_uppercase(),
        provider_type: "openai".into(),
        base_url: base_url.into(),
        enabled: true,
        scope_info: scope,
        metadata: None,
    }
}

// ---------------------------------------------------------------------------
// AI providers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_provider() {
    let repo = SurrealAiProviderRepository::new(setup().await);

    let created = repo
        .create(provider(
            "openai",
            ScopeInfo::organization("org1"),
            "https://api.openai.com/v1",
        ))
        .await
        .unwrap();

    assert_eq!(created.name, "openai");
    assert_eq!(created.scope_info, ScopeInfo::organization("org1"));
    assert!(created.metadata.is_object());

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.base_url, "https://api.openai.com/v1");
}

#[tokio::test]
async fn duplicate_name_at_same_scope_is_rejected() {
    let repo = SurrealAiProviderRepository::new(setup().await);
    let org = ScopeInfo::organization("org1");

    repo.create(provider("openai", org.clone(), "https://a"))
        .await
        .unwrap();
    let err = repo
        .create(provider("openai", org.clone(), "https://b"))
        .await
        .unwrap_err();
    match err {
        GatewayError::AlreadyExists { entity } => {
            assert_eq!(entity, "ai_provider 'openai' at organization:org1");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The same name at another scope is an override, not a duplicate.
    repo.create(provider("openai", ScopeInfo::division("div1"), "https://c"))
        .await
        .unwrap();
}

#[tokio::test]
async fn update_provider() {
    let repo = SurrealAiProviderRepository::new(setup().await);
    let created = repo
        .create(provider("openai", ScopeInfo::organization("org1"), "https://a"))
        .await
        .unwrap();

    let updated = repo
        .update(
            created.id,
            UpdateAiProvider {
                base_url: Some("https://b".into()),
                enabled: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.base_url, "https://b");
    assert!(!updated.enabled);
    assert_eq!(updated.label, "OPENAI");
}

#[tokio::test]
async fn update_unknown_provider_is_not_found() {
    let repo = SurrealAiProviderRepository::new(setup().await);

    let err = repo
        .update(Uuid::new_v4(), UpdateAiProvider::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }));
}

#[tokio::test]
async fn list_providers_by_scopes_and_resolve() {
    let repo = SurrealAiProviderRepository::new(setup().await);
    let org = ScopeInfo::organization("org1");
    let div1 = ScopeInfo::division("div1");
    let div2 = ScopeInfo::division("div2");

    repo.create(provider("openai", org.clone(), "https://org"))
        .await
        .unwrap();
    repo.create(provider("anthropic", org.clone(), "https://org"))
        .await
        .unwrap();
    repo.create(provider("openai", div1.clone(), "https://div1"))
        .await
        .unwrap();
    repo.create(provider("openai", div2.clone(), "https://div2"))
        .await
        .unwrap();

    let visible = repo
        .list_by_scopes(&[div1.clone(), org.clone()])
        .await
        .unwrap();
    assert_eq!(visible.len(), 3);

    let effective = effective_items(visible).unwrap();
    assert_eq!(effective.len(), 2);
    let openai = effective.iter().find(|p| p.name == "openai").unwrap();
    assert_eq!(openai.scope_info, div1);
    assert_eq!(openai.base_url, "https://div1");

    assert!(repo.list_by_scopes(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_provider() {
    let repo = SurrealAiProviderRepository::new(setup().await);
    let created = repo
        .create(provider("openai", ScopeInfo::organization("org1"), "https://a"))
        .await
        .unwrap();

    repo.delete(created.id).await.unwrap();

    let err = repo.get_by_id(created.id).await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// AI models
// ---------------------------------------------------------------------------

#[tokio::test]
async fn model_crud() {
    let repo = SurrealAiModelRepository::new(setup().await);
    let org = ScopeInfo::organization("org1");

    let created = repo
        .create(CreateAiModel {
            name: "gpt-4o".into(),
            provider_name: "openai".into(),
            label: "GPT-4o".into(),
            max_tokens: Some(4096),
            enabled: true,
            scope_info: org.clone(),
            metadata: Some(serde_json::json!({ "tier": "premium" })),
        })
        .await
        .unwrap();
    assert_eq!(created.max_tokens, Some(4096));
    assert_eq!(created.metadata["tier"], "premium");

    let cleared = repo
        .update(
            created.id,
            UpdateAiModel {
                max_tokens: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.max_tokens, None);
    assert_eq!(cleared.provider_name, "openai");

    let listed = repo.list_by_scopes(&[org]).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    repo.delete(created.id).await.unwrap();
    assert!(repo.get_by_id(created.id).await.is_err());
}

// ---------------------------------------------------------------------------
// API key definitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_key_crud() {
    let repo = SurrealApiKeyRepository::new(setup().await);
    let div = ScopeInfo::division("div1");

    let created = repo
        .create(CreateApiKeyDefinition {
            name: "mattermost".into(),
            label: "Mattermost".into(),
            description: "Bot token".into(),
            header_name: "Authorization".into(),
            enabled: true,
            scope_info: div.clone(),
            metadata: None,
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            created.id,
            UpdateApiKeyDefinition {
                header_name: Some("X-Api-Key".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.header_name, "X-Api-Key");
    assert_eq!(updated.description, "Bot token");

    let listed = repo
        .list_by_scopes(&[div, ScopeInfo::organization("org1")])
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    repo.delete(created.id).await.unwrap();
    assert!(repo.get_by_id(created.id).await.is_err());
}
