//! SurrealDB implementation of [`ScopeLabelRepository`].

use std::collections::HashSet;

use aigw_core::error::{GatewayError, GatewayResult};
use aigw_core::models::scope::{CreateScopeLabel, ScopeInfo, ScopeLabel};
use aigw_core::repository::ScopeLabelRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::warn;

use crate::error::DbError;
use crate::row::parse_scope;

#[derive(Debug, SurrealValue)]
struct ScopeLabelRow {
    scope_type: String,
    scope_id: String,
    label: String,
    parent_type: Option<String>,
    parent_id: Option<String>,
}

impl ScopeLabelRow {
    fn try_into_label(self) -> Result<ScopeLabel, DbError> {
        let parent = match (self.parent_type, self.parent_id) {
            (Some(parent_type), Some(parent_id)) => Some(parse_scope(&parent_type, parent_id)?),
            _ => None,
        };
        Ok(ScopeLabel {
            scope: parse_scope(&self.scope_type, self.scope_id)?,
            label: self.label,
            parent,
        })
    }
}

/// SurrealDB implementation of the scope label repository.
#[derive(Clone)]
pub struct SurrealScopeLabelRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealScopeLabelRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ScopeLabelRepository for SurrealScopeLabelRepository<C> {
    async fn upsert(&self, input: CreateScopeLabel) -> GatewayResult<ScopeLabel> {
        let key = input.scope.key();
        let (parent_type, parent_id) = match input.parent {
            Some(parent) => (Some(parent.scope_type.to_string()), Some(parent.scope_id)),
            None => (None, None),
        };

        let result = self
            .db
            .query(
                "UPSERT type::record('scope_label', $key) SET \
                 scope_type = $scope_type, scope_id = $scope_id, \
                 label = $label, parent_type = $parent_type, \
                 parent_id = $parent_id, updated_at = time::now()",
            )
            .bind(("key", key.clone()))
            .bind(("scope_type", input.scope.scope_type.as_str()))
            .bind(("scope_id", input.scope.scope_id))
            .bind(("label", input.label))
            .bind(("parent_type", parent_type))
            .bind(("parent_id", parent_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ScopeLabelRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "scope_label".into(),
            id: key,
        })?;

        Ok(row.try_into_label()?)
    }

    async fn get(&self, scope: &ScopeInfo) -> GatewayResult<ScopeLabel> {
        let key = scope.key();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('scope_label', $key)")
            .bind(("key", key.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ScopeLabelRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "scope_label".into(),
            id: key,
        })?;

        Ok(row.try_into_label()?)
    }

    async fn list(&self) -> GatewayResult<Vec<ScopeLabel>> {
        let mut result = self
            .db
            .query("SELECT * FROM scope_label ORDER BY created_at ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ScopeLabelRow> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(ScopeLabelRow::try_into_label)
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn delete(&self, scope: &ScopeInfo) -> GatewayResult<()> {
        self.db
            .query("DELETE type::record('scope_label', $key)")
            .bind(("key", scope.key()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn ancestors(&self, scope: &ScopeInfo) -> GatewayResult<Vec<ScopeInfo>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([scope.clone()]);
        let mut current = scope.clone();

        loop {
            let parent = match self.get(&current).await {
                Ok(label) => label.parent,
                // Unlabelled scopes are roots.
                Err(GatewayError::NotFound { .. }) => None,
                Err(e) => return Err(e),
            };

            let Some(parent) = parent else {
                break;
            };
            if !visited.insert(parent.clone()) {
                warn!(scope = %scope, parent = %parent, "Cycle in scope hierarchy");
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }

        Ok(chain)
    }
}
