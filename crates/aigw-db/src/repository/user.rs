//! SurrealDB implementation of [`UserRepository`].
//!
//! Role assignments live in the `role_assignment` table. Their record id
//! is derived from `(user, scope, role)`, so granting the same role twice
//! upserts one record instead of failing or duplicating it.

use aigw_core::error::GatewayResult;
use aigw_core::models::scope::ScopeInfo;
use aigw_core::models::user::{CreateUser, UpdateUser, User, UserRoleAssignment, UserRoleType};
use aigw_core::repository::UserRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::row::{parse_scope, parse_uuid};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    username: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct RoleAssignmentRow {
    scope_type: String,
    scope_id: String,
    role: String,
}

#[derive(Debug, SurrealValue)]
struct HolderRow {
    user_id: String,
}

fn parse_role(s: &str) -> Result<UserRoleType, DbError> {
    match s {
        "super_admin" => Ok(UserRoleType::SuperAdmin),
        "admin" => Ok(UserRoleType::Admin),
        "maintainer" => Ok(UserRoleType::Maintainer),
        "member" => Ok(UserRoleType::Member),
        other => Err(DbError::Corrupt(format!("unknown role: {other}"))),
    }
}

impl RoleAssignmentRow {
    fn try_into_assignment(self) -> Result<UserRoleAssignment, DbError> {
        Ok(UserRoleAssignment {
            scope_info: parse_scope(&self.scope_type, self.scope_id)?,
            role: parse_role(&self.role)?,
        })
    }
}

fn assignment_record_id(user_id: Uuid, assignment: &UserRoleAssignment) -> String {
    format!(
        "{user_id}|{}|{}",
        assignment.scope_info.key(),
        assignment.role.as_str()
    )
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn load_roles(&self, user_id: Uuid) -> Result<Vec<UserRoleAssignment>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT scope_type, scope_id, role, created_at \
                 FROM role_assignment \
                 WHERE user_id = $user_id \
                 ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await?;

        let rows: Vec<RoleAssignmentRow> = result.take(0)?;
        rows.into_iter()
            .map(RoleAssignmentRow::try_into_assignment)
            .collect()
    }

    async fn hydrate(&self, id: Uuid, row: UserRow) -> Result<User, DbError> {
        Ok(User {
            id,
            username: row.username,
            email: row.email,
            role_list: self.load_roles(id).await?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> GatewayResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, email = $email",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("email", input.email))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(User {
            id,
            username: row.username,
            email: row.email,
            role_list: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> GatewayResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(self.hydrate(id, row).await?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> GatewayResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.username.is_some() {
            sets.push("username = $username");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(username) = input.username {
            builder = builder.bind(("username", username));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(self.hydrate(id, row).await?)
    }

    async fn delete(&self, id: Uuid) -> GatewayResult<()> {
        self.db
            .query(
                "DELETE type::record('user', $id); \
                 DELETE role_assignment WHERE user_id = $id; \
                 DELETE oauth_account WHERE user_id = $id;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }

    async fn assign_role(
        &self,
        user_id: Uuid,
        assignment: UserRoleAssignment,
    ) -> GatewayResult<()> {
        // No assignments for unknown users.
        self.get_by_id(user_id).await?;

        let record_id = assignment_record_id(user_id, &assignment);
        let scope = assignment.scope_info;

        self.db
            .query(
                "UPSERT type::record('role_assignment', $record_id) SET \
                 user_id = $user_id, scope_type = $scope_type, \
                 scope_id = $scope_id, scope_key = $scope_key, role = $role",
            )
            .bind(("record_id", record_id))
            .bind(("user_id", user_id.to_string()))
            .bind(("scope_type", scope.scope_type.as_str()))
            .bind(("scope_key", scope.key()))
            .bind(("scope_id", scope.scope_id))
            .bind(("role", assignment.role.as_str()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }

    async fn unassign_role(
        &self,
        user_id: Uuid,
        assignment: UserRoleAssignment,
    ) -> GatewayResult<()> {
        self.db
            .query("DELETE type::record('role_assignment', $record_id)")
            .bind(("record_id", assignment_record_id(user_id, &assignment)))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_scope(&self, scope: &ScopeInfo) -> GatewayResult<Vec<User>> {
        let mut result = self
            .db
            .query(
                "SELECT user_id, created_at FROM role_assignment \
                 WHERE scope_key = $scope_key \
                 ORDER BY created_at ASC",
            )
            .bind(("scope_key", scope.key()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HolderRow> = result.take(0).map_err(DbError::from)?;

        // One user may hold several roles at the same scope.
        let mut seen = std::collections::HashSet::new();
        let mut users = Vec::new();
        for row in rows {
            if seen.insert(row.user_id.clone()) {
                let id = parse_uuid("user", &row.user_id)?;
                users.push(self.get_by_id(id).await?);
            }
        }

        Ok(users)
    }
}
