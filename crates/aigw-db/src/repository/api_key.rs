//! SurrealDB implementation of [`ScopedEntityRepository`] for API key
//! definitions.

use aigw_core::error::GatewayResult;
use aigw_core::models::api_key::{
    ApiKeyDefinition, CreateApiKeyDefinition, UpdateApiKeyDefinition,
};
use aigw_core::models::scope::ScopeInfo;
use aigw_core::repository::ScopedEntityRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::row::{parse_scope, parse_uuid, scope_keys};

#[derive(Debug, SurrealValue)]
struct ApiKeyRow {
    name: String,
    label: String,
    description: String,
    header_name: String,
    enabled: bool,
    scope_type: String,
    scope_id: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ApiKeyRowWithId {
    record_id: String,
    name: String,
    label: String,
    description: String,
    header_name: String,
    enabled: bool,
    scope_type: String,
    scope_id: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApiKeyRow {
    fn into_definition(self, id: Uuid) -> Result<ApiKeyDefinition, DbError> {
        Ok(ApiKeyDefinition {
            id,
            name: self.name,
            label: self.label,
            description: self.description,
            header_name: self.header_name,
            enabled: self.enabled,
            scope_info: parse_scope(&self.scope_type, self.scope_id)?,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ApiKeyRowWithId {
    fn try_into_definition(self) -> Result<ApiKeyDefinition, DbError> {
        let id = parse_uuid("api_key", &self.record_id)?;
        Ok(ApiKeyDefinition {
            id,
            name: self.name,
            label: self.label,
            description: self.description,
            header_name: self.header_name,
            enabled: self.enabled,
            scope_info: parse_scope(&self.scope_type, self.scope_id)?,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the API key definition repository.
#[derive(Clone)]
pub struct SurrealApiKeyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealApiKeyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ScopedEntityRepository for SurrealApiKeyRepository<C> {
    type Entity = ApiKeyDefinition;

    async fn create(&self, input: CreateApiKeyDefinition) -> GatewayResult<ApiKeyDefinition> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));
        let scope = input.scope_info;
        let entity = format!("api_key '{}' at {scope}", input.name);

        let result = self
            .db
            .query(
                "CREATE type::record('api_key', $id) SET \
                 name = $name, label = $label, \
                 description = $description, header_name = $header_name, \
                 enabled = $enabled, scope_type = $scope_type, \
                 scope_id = $scope_id, scope_key = $scope_key, \
                 metadata = $metadata",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("label", input.label))
            .bind(("description", input.description))
            .bind(("header_name", input.header_name))
            .bind(("enabled", input.enabled))
            .bind(("scope_type", scope.scope_type.as_str()))
            .bind(("scope_key", scope.key()))
            .bind(("scope_id", scope.scope_id))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::on_write(entity, e.to_string()))?;

        let rows: Vec<ApiKeyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "api_key".into(),
            id: id_str,
        })?;

        Ok(row.into_definition(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> GatewayResult<ApiKeyDefinition> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('api_key', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApiKeyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "api_key".into(),
            id: id_str,
        })?;

        Ok(row.into_definition(id)?)
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdateApiKeyDefinition,
    ) -> GatewayResult<ApiKeyDefinition> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.label.is_some() {
            sets.push("label = $label");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.header_name.is_some() {
            sets.push("header_name = $header_name");
        }
        if input.enabled.is_some() {
            sets.push("enabled = $enabled");
        }
        if input.metadata.is_some() {
            sets.push("metadata = $metadata");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('api_key', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(label) = input.label {
            builder = builder.bind(("label", label));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(header_name) = input.header_name {
            builder = builder.bind(("header_name", header_name));
        }
        if let Some(enabled) = input.enabled {
            builder = builder.bind(("enabled", enabled));
        }
        if let Some(metadata) = input.metadata {
            builder = builder.bind(("metadata", metadata));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ApiKeyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "api_key".into(),
            id: id_str,
        })?;

        Ok(row.into_definition(id)?)
    }

    async fn delete(&self, id: Uuid) -> GatewayResult<()> {
        self.db
            .query("DELETE type::record('api_key', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_scopes(&self, scopes: &[ScopeInfo]) -> GatewayResult<Vec<ApiKeyDefinition>> {
        if scopes.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM api_key \
                 WHERE scope_key IN $scope_keys \
                 ORDER BY created_at ASC",
            )
            .bind(("scope_keys", scope_keys(scopes)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApiKeyRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(ApiKeyRowWithId::try_into_definition)
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }
}
