//! API key definition domain model.
//!
//! A definition describes how an external integration expects its API key
//! (which header, what it is for). The key material itself is supplied by
//! each user and never stored here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scope::{ScopeInfo, ScopedEntity, ScopedInput, ScopedItem};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyDefinition {
    pub id: Uuid,
    /// Logical key shared by a definition and its overrides.
    pub name: String,
    pub label: String,
    pub description: String,
    /// HTTP header the key is sent in (e.g. `Authorization`).
    pub header_name: String,
    pub enabled: bool,
    pub scope_info: ScopeInfo,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKeyDefinition {
    pub name: String,
    pub label: String,
    pub description: String,
    pub header_name: String,
    pub enabled: bool,
    pub scope_info: ScopeInfo,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateApiKeyDefinition {
    pub label: Option<String>,
    pub description: Option<String>,
    pub header_name: Option<String>,
    pub enabled: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

impl ScopedItem for ApiKeyDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn scope_info(&self) -> &ScopeInfo {
        &self.scope_info
    }
}

impl ScopedInput for CreateApiKeyDefinition {
    fn with_scope(self, scope: ScopeInfo) -> Self {
        Self {
            scope_info: scope,
            ..self
        }
    }
}

impl ScopedEntity for ApiKeyDefinition {
    type Create = CreateApiKeyDefinition;
    type Update = UpdateApiKeyDefinition;

    const ENTITY: &'static str = "api_key";

    fn id(&self) -> Uuid {
        self.id
    }

    fn override_at(
        &self,
        scope: ScopeInfo,
        patch: UpdateApiKeyDefinition,
    ) -> CreateApiKeyDefinition {
        CreateApiKeyDefinition {
            name: self.name.clone(),
            label: patch.label.unwrap_or_else(|| self.label.clone()),
            description: patch
                .description
                .unwrap_or_else(|| self.description.clone()),
            header_name: patch
                .header_name
                .unwrap_or_else(|| self.header_name.clone()),
            enabled: patch.enabled.unwrap_or(self.enabled),
            scope_info: scope,
            metadata: Some(patch.metadata.unwrap_or_else(|| self.metadata.clone())),
        }
    }
}
