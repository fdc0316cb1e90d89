use std::sync::Arc;

use aigw_auth::AuthConfig;
use aigw_core::error::GatewayResult;
use aigw_core::models::oauth_account::{CreateOAuthAccount, OAuthAccount};
use aigw_core::repository::OAuthAccountRepository;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::guard::GuardDecision;

/// Fetches the connected user's profile from an OAuth2 provider.
pub trait UserInfoFetcher: Send + Sync + 'static {
    fn fetch_user_info(
        &self,
        provider: &str,
    ) -> impl Future<Output = GatewayResult<Value>> + Send;
}

/// Performs a full-page navigation away from the application.
pub trait ExternalNavigator: Send + Sync + 'static {
    fn navigate_external(&self, url: &str);
}

/// Gates the chat integrations behind a connected OAuth2 account.
///
/// A connected user is let through at once while their profile is
/// refreshed in the background; if that refresh fails the user is sent to
/// the provider's login page. A user without an account is sent there
/// straight away.
pub struct OAuthGuard<A, F, N> {
    accounts: Arc<A>,
    fetcher: Arc<F>,
    navigator: Arc<N>,
    config: AuthConfig,
}

impl<A, F, N> OAuthGuard<A, F, N>
where
    A: OAuthAccountRepository + 'static,
    F: UserInfoFetcher,
    N: ExternalNavigator,
{
    pub fn new(accounts: A, fetcher: F, navigator: N, config: AuthConfig) -> Self {
        Self {
            accounts: Arc::new(accounts),
            fetcher: Arc::new(fetcher),
            navigator: Arc::new(navigator),
            config,
        }
    }

    pub async fn activate(&self, user_id: Option<Uuid>, provider: &str) -> GuardDecision {
        let Some(provider_config) = self.config.provider(provider) else {
            warn!(provider, "Unknown OAuth2 provider");
            return GuardDecision::Deny;
        };

        let Some(account) = self.find_account(user_id, provider).await else {
            info!(?user_id, provider, "No connected account, sending to provider login");
            self.navigator.navigate_external(&provider_config.login_url);
            return GuardDecision::Deny;
        };

        self.refresh_user_info(account, provider_config.login_url.clone());
        GuardDecision::Allow
    }

    async fn find_account(&self, user_id: Option<Uuid>, provider: &str) -> Option<OAuthAccount> {
        let user_id = user_id?;
        match self.accounts.find(user_id, provider).await {
            Ok(account) => account,
            Err(e) => {
                warn!(%user_id, provider, error = %e, "Failed to look up OAuth2 account");
                None
            }
        }
    }

    fn refresh_user_info(&self, account: OAuthAccount, login_url: String) {
        let accounts = Arc::clone(&self.accounts);
        let fetcher = Arc::clone(&self.fetcher);
        let navigator = Arc::clone(&self.navigator);

        tokio::spawn(async move {
            let info = match fetcher.fetch_user_info(&account.provider).await {
                Ok(info) => info,
                Err(e) => {
                    error!(
                        user_id = %account.user_id,
                        provider = %account.provider,
                        error = %e,
                        "Failed to fetch OAuth2 user info"
                    );
                    navigator.navigate_external(&login_url);
                    return;
                }
            };

            let Some(external_user_id) = external_user_id(&info) else {
                debug!(provider = %account.provider, "User info carries no id");
                return;
            };
            if account.external_user_id.as_deref() == Some(external_user_id.as_str()) {
                return;
            }

            let input = CreateOAuthAccount {
                user_id: account.user_id,
                provider: account.provider.clone(),
                external_user_id: Some(external_user_id),
            };
            if let Err(e) = accounts.connect(input).await {
                warn!(provider = %account.provider, error = %e, "Failed to record external user id");
            }
        });
    }
}

fn external_user_id(info: &Value) -> Option<String> {
    match info.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
