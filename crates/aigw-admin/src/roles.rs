//! Role management for the members of the selected scope.

use aigw_auth::{AuthConfig, Permissions, RoleTier, ScopeRequirement, authorize};
use aigw_core::error::{GatewayError, GatewayResult};
use aigw_core::models::scope::{ScopeInfo, ScopeType};
use aigw_core::models::user::{User, UserRoleAssignment, UserRoleType};
use aigw_core::repository::UserRepository;
use tracing::info;
use uuid::Uuid;

use crate::scope_state::SelectedScope;

pub struct UserRoleService<U> {
    users: U,
    selected: SelectedScope,
    auth: AuthConfig,
}

impl<U: UserRepository> UserRoleService<U> {
    pub fn new(users: U, selected: SelectedScope, auth: AuthConfig) -> Self {
        Self {
            users,
            selected,
            auth,
        }
    }

    /// Users holding any role at the selected scope.
    pub async fn members(&self) -> GatewayResult<Vec<User>> {
        let scope = self.selected_scope()?;
        self.users.list_by_scope(&scope).await
    }

    pub async fn assign(&self, actor: &User, user_id: Uuid, role: UserRoleType) -> GatewayResult<()> {
        let scope = self.selected_scope()?;
        self.require_manage(actor, &scope)?;

        self.users
            .assign_role(user_id, UserRoleAssignment::new(scope.clone(), role))
            .await?;
        info!(actor = %actor.id, %user_id, role = role.as_str(), scope = %scope, "Role assigned");
        Ok(())
    }

    pub async fn unassign(
        &self,
        actor: &User,
        user_id: Uuid,
        role: UserRoleType,
    ) -> GatewayResult<()> {
        let scope = self.selected_scope()?;
        self.require_manage(actor, &scope)?;

        self.users
            .unassign_role(user_id, UserRoleAssignment::new(scope.clone(), role))
            .await?;
        info!(actor = %actor.id, %user_id, role = role.as_str(), scope = %scope, "Role revoked");
        Ok(())
    }

    fn selected_scope(&self) -> GatewayResult<ScopeInfo> {
        self.selected
            .current()
            .ok_or_else(|| GatewayError::InvalidScope("no admin scope selected".into()))
    }

    /// Divisions use [`Permissions::can_manage_user_roles`]; other scopes
    /// need a manager-tier role at exactly that scope.
    fn require_manage(&self, actor: &User, scope: &ScopeInfo) -> GatewayResult<()> {
        let permissions = Permissions::new(Some(actor), &self.auth);
        let allowed = match scope.scope_type {
            ScopeType::Division => permissions.can_manage_user_roles(&scope.scope_id),
            _ => authorize(
                &actor.role_list,
                &ScopeRequirement::Exact(scope.clone()),
                RoleTier::Manager,
            )
            .is_allowed(),
        };
        permissions.require(allowed, &format!("manage user roles at {scope}"))?;
        Ok(())
    }
}
