//! Scopes a user may open the admin console at.

use std::collections::HashSet;

use aigw_auth::RoleTier;
use aigw_core::models::scope::{ScopeInfo, ScopeLabels, ScopeType};
use aigw_core::models::user::{User, UserRoleAssignment};
use aigw_core::repository::{ScopeLabelRepository, UserRepository};
use tracing::warn;
use uuid::Uuid;

use crate::config::AdminConfig;

/// A scope offered in the console's scope picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminScope {
    pub scope: ScopeInfo,
    pub label: String,
}

/// Admin-tier roles at one of `scope_types`, one entry per scope, broadest
/// scope first and then by label. Scopes without a label show their id.
pub fn available_admin_scopes(
    roles: &[UserRoleAssignment],
    labels: &ScopeLabels,
    scope_types: &[ScopeType],
) -> Vec<AdminScope> {
    let mut seen = HashSet::new();
    let mut scopes: Vec<AdminScope> = roles
        .iter()
        .filter(|r| RoleTier::Admin.includes(r.role))
        .filter(|r| scope_types.iter().any(|t| r.is_at(*t)))
        .filter(|r| seen.insert(r.scope_info.clone()))
        .map(|r| AdminScope {
            label: labels
                .label_for(&r.scope_info)
                .unwrap_or(&r.scope_info.scope_id)
                .to_string(),
            scope: r.scope_info.clone(),
        })
        .collect();

    scopes.sort_by(|a, b| {
        b.scope
            .scope_type
            .priority()
            .cmp(&a.scope.scope_type.priority())
            .then_with(|| a.label.cmp(&b.label))
    });
    scopes
}

/// Loads users and scope labels to compute [`available_admin_scopes`].
#[derive(Debug, Clone)]
pub struct AdminScopes<U, L> {
    users: U,
    labels: L,
    scope_types: Vec<ScopeType>,
}

impl<U: UserRepository, L: ScopeLabelRepository> AdminScopes<U, L> {
    pub fn new(users: U, labels: L, config: &AdminConfig) -> Self {
        Self {
            users,
            labels,
            scope_types: config.admin_scope_types.clone(),
        }
    }

    /// Scopes `user_id` may administer. Empty for anonymous or unknown
    /// users, or when the user cannot be loaded.
    pub async fn for_user(&self, user_id: Option<Uuid>) -> Vec<AdminScope> {
        let (user, labels) = tokio::join!(self.load_user(user_id), self.load_labels());
        match user {
            Some(user) => available_admin_scopes(&user.role_list, &labels, &self.scope_types),
            None => Vec::new(),
        }
    }

    pub async fn load_user(&self, user_id: Option<Uuid>) -> Option<User> {
        let user_id = user_id?;
        match self.users.get_by_id(user_id).await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(%user_id, error = %e, "Failed to load user for admin scopes");
                None
            }
        }
    }

    async fn load_labels(&self) -> ScopeLabels {
        match self.labels.list().await {
            Ok(labels) => ScopeLabels::from_labels(labels),
            Err(e) => {
                warn!(error = %e, "Failed to load scope labels");
                ScopeLabels::default()
            }
        }
    }
}
