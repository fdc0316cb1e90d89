//! SurrealDB implementation of [`ScopedEntityRepository`] for AI models.

use aigw_core::error::GatewayResult;
use aigw_core::models::ai_model::{AiModel, CreateAiModel, UpdateAiModel};
use aigw_core::models::scope::ScopeInfo;
use aigw_core::repository::ScopedEntityRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::row::{parse_scope, parse_uuid, scope_keys};

#[derive(Debug, SurrealValue)]
struct AiModelRow {
    name: String,
    provider_name: String,
    label: String,
    max_tokens: Option<u32>,
    enabled: bool,
    scope_type: String,
    scope_id: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AiModelRowWithId {
    record_id: String,
    name: String,
    provider_name: String,
    label: String,
    max_tokens: Option<u32>,
    enabled: bool,
    scope_type: String,
    scope_id: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AiModelRow {
    fn into_model(self, id: Uuid) -> Result<AiModel, DbError> {
        Ok(AiModel {
            id,
            name: self.name,
            provider_name: self.provider_name,
            label: self.label,
            max_tokens: self.max_tokens,
            enabled: self.enabled,
            scope_info: parse_scope(&self.scope_type, self.scope_id)?,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AiModelRowWithId {
    fn try_into_model(self) -> Result<AiModel, DbError> {
        let id = parse_uuid("ai_model", &self.record_id)?;
        Ok(AiModel {
            id,
            name: self.name,
            provider_name: self.provider_name,
            label: self.label,
            max_tokens: self.max_tokens,
            enabled: self.enabled,
            scope_info: parse_scope(&self.scope_type, self.scope_id)?,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the AI model repository.
#[derive(Clone)]
pub struct SurrealAiModelRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAiModelRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ScopedEntityRepository for SurrealAiModelRepository<C> {
    type Entity = AiModel;

    async fn create(&self, input: CreateAiModel) -> GatewayResult<AiModel> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));
        let scope = input.scope_info;
        let entity = format!("ai_model '{}' at {scope}", input.name);

        let result = self
            .db
            .query(
                "CREATE type::record('ai_model', $id) SET \
                 name = $name, provider_name = $provider_name, \
                 label = $label, max_tokens = $max_tokens, \
                 enabled = $enabled, scope_type = $scope_type, \
                 scope_id = $scope_id, scope_key = $scope_key, \
                 metadata = $metadata",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("provider_name", input.provider_name))
            .bind(("label", input.label))
            .bind(("max_tokens", input.max_tokens))
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

        let rows: Vec<AiModelRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ai_model".into(),
            id: id_str,
        })?;

        Ok(row.into_model(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> GatewayResult<AiModel> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('ai_model', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AiModelRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ai_model".into(),
            id: id_str,
        })?;

        Ok(row.into_model(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateAiModel) -> GatewayResult<AiModel> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.provider_name.is_some() {
            sets.push("provider_name = $provider_name");
        }
        if input.label.is_some() {
            sets.push("label = $label");
        }
        if input.max_tokens.is_some() {
            sets.push("max_tokens = $max_tokens");
        }
        if input.enabled.is_some() {
            sets.push("enabled = $enabled");
        }
        if input.metadata.is_some() {
            sets.push("metadata = $metadata");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('ai_model', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(provider_name) = input.provider_name {
            builder = builder.bind(("provider_name", provider_name));
        }
        if let Some(label) = input.label {
            builder = builder.bind(("label", label));
        }
        if let Some(max_tokens) = input.max_tokens {
            builder = builder.bind(("max_tokens", max_tokens));
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

        let rows: Vec<AiModelRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ai_model".into(),
            id: id_str,
        })?;

        Ok(row.into_model(id)?)
    }

    async fn delete(&self, id: Uuid) -> GatewayResult<()> {
        self.db
            .query("DELETE type::record('ai_model', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_scopes(&self, scopes: &[ScopeInfo]) -> GatewayResult<Vec<AiModel>> {
        if scopes.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM ai_model \
                 WHERE scope_key IN $scope_keys \
                 ORDER BY created_at ASC",
            )
            .bind(("scope_keys", scope_keys(scopes)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AiModelRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(AiModelRowWithId::try_into_model)
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }
}
