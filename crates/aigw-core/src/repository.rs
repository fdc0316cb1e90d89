//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Scoped entity repositories are
//! queried by scope so that callers can assemble the chain of scopes an
//! admin sees (e.g. a division plus its organization) and resolve
//! overrides on top.

use uuid::Uuid;

use crate::error::GatewayResult;
use crate::models::{
    oauth_account::{CreateOAuthAccount, OAuthAccount},
    scope::{CreateScopeLabel, ScopeInfo, ScopeLabel, ScopedEntity},
    user::{CreateUser, UpdateUser, User, UserRoleAssignment},
};

// ---------------------------------------------------------------------------
// Users & role assignments
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = GatewayResult<User>> + Send;
    /// Fetch a user together with its full role list.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = GatewayResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = GatewayResult<User>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Grant a role at a scope. Granting an existing assignment is a no-op.
    fn assign_role(
        &self,
        user_id: Uuid,
        assignment: UserRoleAssignment,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Revoke a role at a scope.
    fn unassign_role(
        &self,
        user_id: Uuid,
        assignment: UserRoleAssignment,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    /// All users holding at least one role exactly at `scope`.
    fn list_by_scope(
        &self,
        scope: &ScopeInfo,
    ) -> impl Future<Output = GatewayResult<Vec<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Scope labels & hierarchy
// ---------------------------------------------------------------------------

pub trait ScopeLabelRepository: Send + Sync {
    /// Register a scope instance, or relabel/reparent an existing one.
    fn upsert(
        &self,
        input: CreateScopeLabel,
    ) -> impl Future<Output = GatewayResult<ScopeLabel>> + Send;
    fn get(&self, scope: &ScopeInfo) -> impl Future<Output = GatewayResult<ScopeLabel>> + Send;
    fn list(&self) -> impl Future<Output = GatewayResult<Vec<ScopeLabel>>> + Send;
    fn delete(&self, scope: &ScopeInfo) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Enclosing scopes of `scope`, nearest first (walking up the parents).
    fn ancestors(
        &self,
        scope: &ScopeInfo,
    ) -> impl Future<Output = GatewayResult<Vec<ScopeInfo>>> + Send;
}

// ---------------------------------------------------------------------------
// Scoped entities (AI providers, AI models, API key definitions)
// ---------------------------------------------------------------------------

pub trait ScopedEntityRepository: Send + Sync {
    type Entity: ScopedEntity;

    fn create(
        &self,
        input: <Self::Entity as ScopedEntity>::Create,
    ) -> impl Future<Output = GatewayResult<Self::Entity>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = GatewayResult<Self::Entity>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: <Self::Entity as ScopedEntity>::Update,
    ) -> impl Future<Output = GatewayResult<Self::Entity>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Every entity defined at any of `scopes`, in creation order.
    fn list_by_scopes(
        &self,
        scopes: &[ScopeInfo],
    ) -> impl Future<Output = GatewayResult<Vec<Self::Entity>>> + Send;
}

// ---------------------------------------------------------------------------
// OAuth accounts
// ---------------------------------------------------------------------------

pub trait OAuthAccountRepository: Send + Sync {
    fn connect(
        &self,
        input: CreateOAuthAccount,
    ) -> impl Future<Output = GatewayResult<OAuthAccount>> + Send;
    /// The user's connected account at `provider`, if any.
    fn find(
        &self,
        user_id: Uuid,
        provider: &str,
    ) -> impl Future<Output = GatewayResult<Option<OAuthAccount>>> + Send;
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = GatewayResult<Vec<OAuthAccount>>> + Send;
    fn disconnect(
        &self,
        user_id: Uuid,
        provider: &str,
    ) -> impl Future<Output = GatewayResult<()>> + Send;
}
