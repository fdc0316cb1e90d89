//! OAuth2 connection guard with a stubbed provider and navigator.

use std::time::Duration;

use aigw_admin::{ExternalNavigator, GuardDecision, OAuthGuard, UserInfoFetcher};
use aigw_auth::AuthConfig;
use aigw_core::error::{GatewayError, GatewayResult};
use aigw_core::models::oauth_account::CreateOAuthAccount;
use aigw_core::repository::OAuthAccountRepository;
use aigw_db::repository::SurrealOAuthAccountRepository;
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Answers every fetch with a fixed result.
struct StubFetcher {
    user_info: Option<Value>,
}

impl UserInfoFetcher for StubFetcher {
    async fn fetch_user_info(&self, provider: &str) -> GatewayResult<Value> {
        self.user_info
            .clone()
            .ok_or_else(|| GatewayError::Upstream(format!("{provider} rejected the token")))
    }
}

/// Records external navigations.
#[derive(Clone)]
struct RecordingNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl ExternalNavigator for RecordingNavigator {
    fn navigate_external(&self, url: &str) {
        let _ = self.tx.send(url.to_string());
    }
}

async fn accounts() -> SurrealOAuthAccountRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    aigw_db::run_migrations(&db).await.unwrap();
    SurrealOAuthAccountRepository::new(db)
}

async fn connected(accounts: &SurrealOAuthAccountRepository<Db>, provider: &str) -> Uuid {
    let user_id = Uuid::new_v4();
    accounts
        .connect(CreateOAuthAccount {
            user_id,
            provider: provider.into(),
            external_user_id: None,
        })
        .await
        .unwrap();
    user_id
}

fn navigator() -> (RecordingNavigator, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RecordingNavigator { tx }, rx)
}

#[tokio::test]
async fn missing_account_redirects_to_login() {
    let accounts = accounts().await;
    let (nav, mut visited) = navigator();
    let guard = OAuthGuard::new(
        accounts,
        StubFetcher { user_info: None },
        nav,
        AuthConfig::default(),
    );

    let decision = guard.activate(Some(Uuid::new_v4()), "box").await;

    assert_eq!(decision, GuardDecision::Deny);
    assert_eq!(visited.try_recv().unwrap(), "/api/oauth2/box/login");
}

#[tokio::test]
async fn anonymous_user_redirects_to_login() {
    let (nav, mut visited) = navigator();
    let guard = OAuthGuard::new(
        accounts().await,
        StubFetcher { user_info: None },
        nav,
        AuthConfig::default(),
    );

    assert_eq!(guard.activate(None, "git").await, GuardDecision::Deny);
    assert_eq!(visited.try_recv().unwrap(), "/api/oauth2/git/login");
}

#[tokio::test]
async fn unknown_provider_is_denied_without_navigation() {
    let accounts = accounts().await;
    let user_id = connected(&accounts, "dropbox").await;
    let (nav, mut visited) = navigator();
    let guard = OAuthGuard::new(
        accounts,
        StubFetcher { user_info: None },
        nav,
        AuthConfig::default(),
    );

    assert_eq!(guard.activate(Some(user_id), "dropbox").await, GuardDecision::Deny);
    assert!(visited.try_recv().is_err());
}

#[tokio::test]
async fn connected_user_is_allowed_and_external_id_recorded() {
    let accounts = accounts().await;
    let user_id = connected(&accounts, "box").await;
    let (nav, mut visited) = navigator();
    let guard = OAuthGuard::new(
        accounts.clone(),
        StubFetcher {
            user_info: Some(json!({ "id": "box-42", "name": "Alice" })),
        },
        nav,
        AuthConfig::default(),
    );

    assert_eq!(guard.activate(Some(user_id), "box").await, GuardDecision::Allow);

    // The profile refresh runs in the background.
    let mut recorded = None;
    for _ in 0..50 {
        let account = accounts.find(user_id, "box").await.unwrap().unwrap();
        if account.external_user_id.is_some() {
            recorded = account.external_user_id;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(recorded.as_deref(), Some("box-42"));
    assert!(visited.try_recv().is_err());
}

#[tokio::test]
async fn failed_profile_refresh_sends_user_to_login() {
    let accounts = accounts().await;
    let user_id = connected(&accounts, "mattermost").await;
    let (nav, mut visited) = navigator();
    let guard = OAuthGuard::new(
        accounts,
        StubFetcher { user_info: None },
        nav,
        AuthConfig::default(),
    );

    // Navigation is allowed before the refresh completes.
    assert_eq!(
        guard.activate(Some(user_id), "mattermost").await,
        GuardDecision::Allow
    );

    let url = tokio::time::timeout(Duration::from_secs(5), visited.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(url, "/api/oauth2/mattermost/login");
}
