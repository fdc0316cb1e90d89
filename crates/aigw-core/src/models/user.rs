//! User and role-assignment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scope::{ScopeInfo, ScopeType};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRoleType {
    SuperAdmin,
    Admin,
    Maintainer,
    Member,
}

impl UserRoleType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRoleType::SuperAdmin => "super_admin",
            UserRoleType::Admin => "admin",
            UserRoleType::Maintainer => "maintainer",
            UserRoleType::Member => "member",
        }
    }
}

/// A role held by a user at one scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleAssignment {
    pub scope_info: ScopeInfo,
    pub role: UserRoleType,
}

impl UserRoleAssignment {
    pub fn new(scope_info: ScopeInfo, role: UserRoleType) -> Self {
        Self { scope_info, role }
    }

    pub fn is_at(&self, scope_type: ScopeType) -> bool {
        self.scope_info.scope_type == scope_type
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// All scoped role assignments of this user.
    #[serde(rename = "roleList")]
    pub role_list: Vec<UserRoleAssignment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
}
