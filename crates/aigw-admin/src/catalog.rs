//! Scoped catalog management: AI providers, AI models and API key
//! definitions as seen from the selected admin scope.
//!
//! The catalog at a scope is every entity defined at that scope or one of
//! its ancestors, reduced by [`effective_items`] so each name shows its most
//! specific definition. Edits always land at the selected scope: editing an
//! inherited entity creates an override instead of touching the original.

use aigw_auth::{AuthConfig, Permissions};
use aigw_core::effective_items;
use aigw_core::error::{GatewayError, GatewayResult};
use aigw_core::models::scope::{ScopeInfo, ScopedEntity, ScopedInput, ScopedItem};
use aigw_core::models::user::User;
use aigw_core::repository::{ScopeLabelRepository, ScopedEntityRepository};
use tracing::{info, warn};
use uuid::Uuid;

use crate::scope_state::SelectedScope;

type Entity<R> = <R as ScopedEntityRepository>::Entity;

pub struct ScopedCatalog<L, R> {
    labels: L,
    repo: R,
    selected: SelectedScope,
    auth: AuthConfig,
}

impl<L: ScopeLabelRepository, R: ScopedEntityRepository> ScopedCatalog<L, R> {
    pub fn new(labels: L, repo: R, selected: SelectedScope, auth: AuthConfig) -> Self {
        Self {
            labels,
            repo,
            selected,
            auth,
        }
    }

    /// The effective catalog at the selected scope.
    pub async fn list_effective(&self) -> GatewayResult<Vec<Entity<R>>> {
        let scope = self.selected_scope()?;
        let scopes = self.visible_scopes(&scope).await;
        effective_items(self.repo.list_by_scopes(&scopes).await?)
    }

    /// Entities defined at exactly the selected scope.
    pub async fn list_own(&self) -> GatewayResult<Vec<Entity<R>>> {
        let scope = self.selected_scope()?;
        self.repo.list_by_scopes(std::slice::from_ref(&scope)).await
    }

    /// Creates an entity at the selected scope, whatever scope `input`
    /// names.
    pub async fn create(
        &self,
        actor: &User,
        input: <Entity<R> as ScopedEntity>::Create,
    ) -> GatewayResult<Entity<R>> {
        let scope = self.selected_scope()?;
        self.require_edit(actor, &scope, "create")?;

        let created = self.repo.create(input.with_scope(scope)).await?;
        info!(
            entity = <Entity<R>>::ENTITY,
            id = %created.id(),
            name = created.name(),
            scope = %created.scope_info(),
            "Created scoped entity"
        );
        Ok(created)
    }

    /// Updates an entity owned by the selected scope, or overrides an
    /// inherited one there.
    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        patch: <Entity<R> as ScopedEntity>::Update,
    ) -> GatewayResult<Entity<R>> {
        let scope = self.selected_scope()?;
        self.require_edit(actor, &scope, "update")?;

        let existing = self.repo.get_by_id(id).await?;
        if existing.scope_info() == &scope {
            return self.repo.update(id, patch).await;
        }

        if !self.visible_scopes(&scope).await.contains(existing.scope_info()) {
            return Err(not_found::<R>(id));
        }

        // Edit the override when the selected scope already has one.
        let own = self.repo.list_by_scopes(std::slice::from_ref(&scope)).await?;
        if let Some(current) = own.iter().find(|e| e.name() == existing.name()) {
            return self.repo.update(current.id(), patch).await;
        }

        let created = self.repo.create(existing.override_at(scope, patch)).await?;
        info!(
            entity = <Entity<R>>::ENTITY,
            name = created.name(),
            from = %existing.scope_info(),
            to = %created.scope_info(),
            "Overrode inherited entity"
        );
        Ok(created)
    }

    /// Deletes an entity owned by the selected scope. Deleting an override
    /// makes the inherited definition effective again.
    pub async fn delete(&self, actor: &User, id: Uuid) -> GatewayResult<()> {
        let scope = self.selected_scope()?;
        self.require_edit(actor, &scope, "delete")?;

        let existing = self.repo.get_by_id(id).await?;
        if existing.scope_info() != &scope {
            return Err(GatewayError::AuthorizationDenied {
                reason: format!(
                    "{} {id} belongs to {} and cannot be deleted from {scope}",
                    <Entity<R>>::ENTITY,
                    existing.scope_info()
                ),
            });
        }

        self.repo.delete(id).await?;
        info!(entity = <Entity<R>>::ENTITY, %id, scope = %scope, "Deleted scoped entity");
        Ok(())
    }

    fn selected_scope(&self) -> GatewayResult<ScopeInfo> {
        self.selected
            .current()
            .ok_or_else(|| GatewayError::InvalidScope("no admin scope selected".into()))
    }

    fn require_edit(&self, actor: &User, scope: &ScopeInfo, verb: &str) -> GatewayResult<()> {
        let action = format!("{verb} {}", <Entity<R>>::ENTITY.replace('_', " "));
        Permissions::new(Some(actor), &self.auth).require_edit(scope, &action)?;
        Ok(())
    }

    /// `scope` followed by its ancestors, nearest first. If the hierarchy
    /// cannot be loaded only `scope` itself is visible.
    async fn visible_scopes(&self, scope: &ScopeInfo) -> Vec<ScopeInfo> {
        let mut scopes = vec![scope.clone()];
        match self.labels.ancestors(scope).await {
            Ok(ancestors) => scopes.extend(ancestors),
            Err(e) => warn!(scope = %scope, error = %e, "Failed to load scope ancestors"),
        }
        scopes
    }
}

fn not_found<R: ScopedEntityRepository>(id: Uuid) -> GatewayError {
    GatewayError::NotFound {
        entity: <Entity<R>>::ENTITY.into(),
        id: id.to_string(),
    }
}
