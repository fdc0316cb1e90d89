use aigw_core::repository::{ScopeLabelRepository, UserRepository};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::AdminConfig;
use crate::guard::GuardDecision;
use crate::route::AdminRoute;
use crate::scope_state::ScopeSelector;
use crate::scopes::AdminScopes;

/// Guards the admin console and keeps the selected scope in step with the
/// route.
///
/// - A user without any admin scope is sent home.
/// - A route naming one of the user's admin scopes selects it.
/// - Any other route selects the broadest admin scope and redirects to the
///   same section at that scope.
pub struct AdminScopeGuard<U, L> {
    scopes: AdminScopes<U, L>,
    selector: ScopeSelector,
    config: AdminConfig,
}

impl<U: UserRepository, L: ScopeLabelRepository> AdminScopeGuard<U, L> {
    pub fn new(users: U, labels: L, selector: ScopeSelector, config: AdminConfig) -> Self {
        Self {
            scopes: AdminScopes::new(users, labels, &config),
            selector,
            config,
        }
    }

    pub async fn activate(&self, user_id: Option<Uuid>, url: &str) -> GuardDecision {
        let route = AdminRoute::parse(&self.config.admin_prefix, url).unwrap_or_default();
        let available = self.scopes.for_user(user_id).await;

        let Some(default_scope) = available.first() else {
            debug!(?user_id, url, "No admin scopes, redirecting home");
            return GuardDecision::Redirect {
                to: self.config.home_path.clone(),
                replace_url: false,
            };
        };

        let requested_is_available = route
            .scope
            .as_ref()
            .is_some_and(|requested| available.iter().any(|s| &s.scope == requested));
        if requested_is_available {
            self.selector.set(route.scope.clone());
            return GuardDecision::Allow;
        }

        let target = route.with_scope(default_scope.scope.clone());
        self.selector.set(Some(default_scope.scope.clone()));
        let to = target.to_path(&self.config.admin_prefix);
        info!(
            ?user_id,
            requested = ?route.scope.as_ref().map(|s| s.key()),
            %to,
            "Redirecting to default admin scope"
        );
        GuardDecision::Redirect {
            to,
            replace_url: true,
        }
    }
}
