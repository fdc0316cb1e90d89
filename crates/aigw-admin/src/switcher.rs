//! The console's explicit "switch scope" action.

use aigw_auth::AuthError;
use aigw_core::error::GatewayResult;
use aigw_core::models::scope::ScopeInfo;
use aigw_core::repository::{ScopeLabelRepository, UserRepository};
use tracing::info;
use uuid::Uuid;

use crate::config::AdminConfig;
use crate::route::AdminRoute;
use crate::scope_state::ScopeSelector;
use crate::scopes::{AdminScope, AdminScopes};

pub struct ScopeSwitcher<U, L> {
    scopes: AdminScopes<U, L>,
    selector: ScopeSelector,
    config: AdminConfig,
}

impl<U: UserRepository, L: ScopeLabelRepository> ScopeSwitcher<U, L> {
    pub fn new(users: U, labels: L, selector: ScopeSelector, config: AdminConfig) -> Self {
        Self {
            scopes: AdminScopes::new(users, labels, &config),
            selector,
            config,
        }
    }

    /// Entries for the scope picker.
    pub async fn options(&self, user_id: Option<Uuid>) -> Vec<AdminScope> {
        self.scopes.for_user(user_id).await
    }

    /// Selects `target` and returns the path of the current section at that
    /// scope. Fails unless `target` is one of the user's admin scopes.
    pub async fn switch_scope(
        &self,
        user_id: Option<Uuid>,
        target: ScopeInfo,
        current_url: &str,
    ) -> GatewayResult<String> {
        let available = self.scopes.for_user(user_id).await;
        if !available.iter().any(|s| s.scope == target) {
            return Err(AuthError::ScopePermissionDenied {
                action: "switch admin scope".into(),
                scope: target,
            }
            .into());
        }

        let prefix = &self.config.admin_prefix;
        let path = AdminRoute::parse(prefix, current_url)
            .unwrap_or_default()
            .with_scope(target.clone())
            .to_path(prefix);

        info!(?user_id, scope = %target, "Switching admin scope");
        self.selector.set(Some(target));
        Ok(path)
    }
}
