//! SurrealDB implementation of [`ScopedEntityRepository`] for AI providers.

use aigw_core::error::GatewayResult;
use aigw_core::models::ai_provider::{AiProvider, CreateAiProvider, UpdateAiProvider};
use aigw_core::models::scope::ScopeInfo;
use aigw_core::repository::ScopedEntityRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::row::{parse_scope, parse_uuid, scope_keys};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AiProviderRow {
    name: String,
    label: String,
    provider_type: String,
    base_url: String,
    enabled: bool,
    scope_type: String,
    scope_id: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AiProviderRowWithId {
    record_id: String,
    name: String,
    label: String,
    provider_type: String,
    base_url: String,
    enabled: bool,
    scope_type: String,
    scope_id: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AiProviderRow {
    fn into_provider(self, id: Uuid) -> Result<AiProvider, DbError> {
        Ok(AiProvider {
            id,
            name: self.name,
            label: self.label,
            provider_type: self.provider_type,
            base_url: self.base_url,
            enabled: self.enabled,
            scope_info: parse_scope(&self.scope_type, self.scope_id)?,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AiProviderRowWithId {
    fn try_into_provider(self) -> Result<AiProvider, DbError> {
        let id = parse_uuid("ai_provider", &self.record_id)?;
        Ok(AiProvider {
            id,
            name: self.name,
            label: self.label,
            provider_type: self.provider_type,
            base_url: self.base_url,
            enabled: self.enabled,
            scope_info: parse_scope(&self.scope_type, self.scope_id)?,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the AI provider repository.
#[derive(Clone)]
pub struct SurrealAiProviderRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAiProviderRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ScopedEntityRepository for SurrealAiProviderRepository<C> {
    type Entity = AiProvider;

    async fn create(&self, input: CreateAiProvider) -> GatewayResult<AiProvider> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));
        let scope = input.scope_info;
        let entity = format!("ai_provider '{}' at {scope}", input.name);

        let result = self
            .db
            .query(
                "CREATE type::record('ai_provider', $id) SET \
                 name = $name, label = $label, \
                 provider_type = $provider_type, base_url = $base_url, \
                 enabled = $enabled, scope_type = $scope_type, \
                 scope_id = $scope_id, scope_key = $scope_key, \
                 metadata = $metadata",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("label", input.label))
            .bind(("provider_type", input.provider_type))
            .bind(("base_url", input.base_url))
            .bind(("enabled", input.enabled))
            .bind(("scope_type", scope.scope_type.as_str()))
            .bind(("scope_key", scope.key()))
            .bind(("scope_id", scope.scope_id))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::on_write(entity, e.to_string()))?;

        let rows: Vec<AiProviderRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ai_provider".into(),
            id: id_str,
        })?;

        Ok(row.into_provider(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> GatewayResult<AiProvider> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('ai_provider', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AiProviderRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ai_provider".into(),
            id: id_str,
        })?;

        Ok(row.into_provider(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateAiProvider) -> GatewayResult<AiProvider> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.label.is_some() {
            sets.push("label = $label");
        }
        if input.provider_type.is_some() {
            sets.push("provider_type = $provider_type");
        }
        if input.base_url.is_some() {
            sets.push("base_url = $base_url");
        }
        if input.enabled.is_some() {
            sets.push("enabled = $enabled");
        }
        if input.metadata.is_some() {
            sets.push("metadata = $metadata");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('ai_provider', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(label) = input.label {
            builder = builder.bind(("label", label));
        }
        if let Some(provider_type) = input.provider_type {
            builder = builder.bind(("provider_type", provider_type));
        }
        if let Some(base_url) = input.base_url {
            builder = builder.bind(("base_url", base_url));
        }
        if let Some(enabled) = input.enabled {
            builder = builder.bind(("enabled", enabled));
        }
        if let Some(metadata) = input.metadata {
            builder = builder.bind(("metadata", metadata));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AiProviderRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ai_provider".into(),
            id: id_str,
        })?;

        Ok(row.into_provider(id)?)
    }

    async fn delete(&self, id: Uuid) -> GatewayResult<()> {
        self.db
            .query("DELETE type::record('ai_provider', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_scopes(&self, scopes: &[ScopeInfo]) -> GatewayResult<Vec<AiProvider>> {
        if scopes.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM ai_provider \
                 WHERE scope_key IN $scope_keys \
                 ORDER BY created_at ASC",
            )
            .bind(("scope_keys", scope_keys(scopes)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AiProviderRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(AiProviderRowWithId::try_into_provider)
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }
}
