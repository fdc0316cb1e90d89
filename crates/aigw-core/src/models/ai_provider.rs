//! AI provider domain model.
//!
//! A provider is a connection to an upstream AI vendor (OpenAI, Anthropic,
//! an Azure deployment, ...). Providers are usually defined once for the
//! organization and overridden per division, e.g. to point a division at
//! its own endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scope::{ScopeInfo, ScopedEntity, ScopedInput, ScopedItem};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiProvider {
    pub id: Uuid,
    /// Logical key shared by a definition and all of its overrides
    /// (e.g. `openai`).
    pub name: String,
    /// Human-readable name.
    pub label: String,
    /// Wire protocol spoken by the upstream (e.g. `openai`, `anthropic`).
    pub provider_type: String,
    pub base_url: String,
    pub enabled: bool,
    pub scope_info: ScopeInfo,
    /// Arbitrary key-value metadata.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAiProvider {
    pub name: String,
    pub label: String,
    pub provider_type: String,
    pub base_url: String,
    pub enabled: bool,
    pub scope_info: ScopeInfo,
    pub metadata: Option<serde_json::Value>,
}

/// Fields that can be updated on an existing provider.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAiProvider {
    pub label: Option<String>,
    pub provider_type: Option<String>,
    pub base_url: Option<String>,
    pub enabled: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

impl ScopedItem for AiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn scope_info(&self) -> &ScopeInfo {
        &self.scope_info
    }
}

impl ScopedInput for CreateAiProvider {
    fn with_scope(self, scope: ScopeInfo) -> Self {
        Self {
            scope_info: scope,
            ..self
        }
    }
}

impl ScopedEntity for AiProvider {
    type Create = CreateAiProvider;
    type Update = UpdateAiProvider;

    const ENTITY: &'static str = "ai_provider";

    fn id(&self) -> Uuid {
        self.id
    }

    fn override_at(&self, scope: ScopeInfo, patch: UpdateAiProvider) -> CreateAiProvider {
        CreateAiProvider {
            name: self.name.clone(),
            label: patch.label.unwrap_or_else(|| self.label.clone()),
            provider_type: patch
                .provider_type
                .unwrap_or_else(|| self.provider_type.clone()),
            base_url: patch.base_url.unwrap_or_else(|| self.base_url.clone()),
            enabled: patch.enabled.unwrap_or(self.enabled),
            scope_info: scope,
            metadata: Some(patch.metadata.unwrap_or_else(|| self.metadata.clone())),
        }
    }
}
