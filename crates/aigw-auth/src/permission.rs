//! Scope-based permission predicates.
//!
//! Every check is a pure function of the current user's role list and the
//! target scope. A missing user is denied everything; nothing here panics
//! or returns an error except the explicit `require*` helpers.

use aigw_core::models::scope::{ScopeInfo, ScopeType};
use aigw_core::models::user::{User, UserRoleAssignment, UserRoleType};
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// A set of role types granting a class of management rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTier {
    /// `SuperAdmin` or `Admin`: may edit the scope's configuration.
    Admin,
    /// `Admin` tier plus `Maintainer`: may manage members and divisions.
    Manager,
}

impl RoleTier {
    pub fn includes(self, role: UserRoleType) -> bool {
        match self {
            RoleTier::Admin => matches!(role, UserRoleType::SuperAdmin | UserRoleType::Admin),
            RoleTier::Manager => matches!(
                role,
                UserRoleType::SuperAdmin | UserRoleType::Admin | UserRoleType::Maintainer
            ),
        }
    }
}

/// Which scopes a role must be attached to for a check to pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeRequirement {
    Exact(ScopeInfo),
    AnyOfType(ScopeType),
}

impl ScopeRequirement {
    fn matches(&self, scope: &ScopeInfo) -> bool {
        match self {
            ScopeRequirement::Exact(required) => required == scope,
            ScopeRequirement::AnyOfType(scope_type) => scope.scope_type == *scope_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Allows iff some role in `roles` belongs to `tier` and sits at a scope
/// matching `required`.
pub fn authorize(
    roles: &[UserRoleAssignment],
    required: &ScopeRequirement,
    tier: RoleTier,
) -> Decision {
    roles
        .iter()
        .any(|r| tier.includes(r.role) && required.matches(&r.scope_info))
        .into()
}

/// Permission checks for one (possibly absent) user.
#[derive(Debug, Clone, Copy)]
pub struct Permissions<'a> {
    user: Option<&'a User>,
    config: &'a AuthConfig,
}

impl<'a> Permissions<'a> {
    pub fn new(user: Option<&'a User>, config: &'a AuthConfig) -> Self {
        Self { user, config }
    }

    fn check(&self, required: ScopeRequirement, tier: RoleTier) -> bool {
        self.user
            .is_some_and(|u| authorize(&u.role_list, &required, tier).is_allowed())
    }

    /// Whether the user may edit configuration at the given scope.
    ///
    /// - A division id from [`AuthConfig::new_division_ids`] means the
    ///   division is being created; that needs an organization admin.
    /// - Users always manage their own user scope; division admins may
    ///   manage any user.
    /// - Everything else needs an admin role at exactly that scope.
    pub fn can_edit_scope(&self, scope_type: ScopeType, scope_id: &str) -> bool {
        let Some(user) = self.user else {
            return false;
        };

        match scope_type {
            ScopeType::Division if self.config.is_new_division_id(scope_id) => self.check(
                ScopeRequirement::AnyOfType(ScopeType::Organization),
                RoleTier::Admin,
            ),
            ScopeType::User => {
                scope_id == user.id.to_string()
                    || self.check(
                        ScopeRequirement::AnyOfType(ScopeType::Division),
                        RoleTier::Admin,
                    )
            }
            _ => self.check(
                ScopeRequirement::Exact(ScopeInfo::new(scope_type, scope_id)),
                RoleTier::Admin,
            ),
        }
    }

    pub fn can_edit(&self, scope: &ScopeInfo) -> bool {
        self.can_edit_scope(scope.scope_type, &scope.scope_id)
    }

    /// Whether the user may grant and revoke roles inside a division.
    pub fn can_manage_user_roles(&self, division_id: &str) -> bool {
        self.check(
            ScopeRequirement::Exact(ScopeInfo::division(division_id)),
            RoleTier::Manager,
        )
    }

    /// Whether the user may create a division in some organization.
    pub fn can_create_division(&self) -> bool {
        self.check(
            ScopeRequirement::AnyOfType(ScopeType::Organization),
            RoleTier::Manager,
        )
    }

    /// Whether the user may create a division under `organization`:
    /// [`Permissions::can_create_division`] plus a manager-tier role at that
    /// organization.
    pub fn can_create_division_in(&self, organization: &ScopeInfo) -> bool {
        organization.scope_type == ScopeType::Organization
            && self.can_create_division()
            && self.check(ScopeRequirement::Exact(organization.clone()), RoleTier::Manager)
    }

    /// Turns a negative check into an error naming the refused action.
    pub fn require(&self, allowed: bool, action: &str) -> Result<(), AuthError> {
        if allowed {
            return Ok(());
        }
        debug!(user_id = ?self.user.map(|u| u.id), action, "Permission denied");
        Err(AuthError::PermissionDenied {
            action: action.into(),
        })
    }

    /// Requires [`Permissions::can_edit`] for `scope`.
    pub fn require_edit(&self, scope: &ScopeInfo, action: &str) -> Result<(), AuthError> {
        if self.can_edit(scope) {
            return Ok(());
        }
        debug!(
            user_id = ?self.user.map(|u| u.id),
            scope = %scope,
            action,
            "Scope permission denied"
        );
        Err(AuthError::ScopePermissionDenied {
            action: action.into(),
            scope: scope.clone(),
        })
    }
}
