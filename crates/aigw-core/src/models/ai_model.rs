//! AI model domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scope::{ScopeInfo, ScopedEntity, ScopedInput, ScopedItem};

/// A model offered through a provider (e.g. `gpt-4o` on `openai`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiModel {
    pub id: Uuid,
    /// Logical key shared by a definition and its overrides.
    pub name: String,
    /// Logical name of the provider serving this model.
    pub provider_name: String,
    pub label: String,
    /// Upper bound on output tokens, if the deployment caps it.
    pub max_tokens: Option<u32>,
    pub enabled: bool,
    pub scope_info: ScopeInfo,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAiModel {
    pub name: String,
    pub provider_name: String,
    pub label: String,
    pub max_tokens: Option<u32>,
    pub enabled: bool,
    pub scope_info: ScopeInfo,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAiModel {
    pub provider_name: Option<String>,
    pub label: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub max_tokens: Option<Option<u32>>,
    pub enabled: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

impl ScopedItem for AiModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn scope_info(&self) -> &ScopeInfo {
        &self.scope_info
    }
}

impl ScopedInput for CreateAiModel {
    fn with_scope(self, scope: ScopeInfo) -> Self {
        Self {
            scope_info: scope,
            ..self
        }
    }
}

impl ScopedEntity for AiModel {
    type Create = CreateAiModel;
    type Update = UpdateAiModel;

    const ENTITY: &'static str = "ai_model";

    fn id(&self) -> Uuid {
        self.id
    }

    fn override_at(&self, scope: ScopeInfo, patch: UpdateAiModel) -> CreateAiModel {
        CreateAiModel {
            name: self.name.clone(),
            provider_name: patch
                .provider_name
                .unwrap_or_else(|| self.provider_name.clone()),
            label: patch.label.unwrap_or_else(|| self.label.clone()),
            max_tokens: patch.max_tokens.unwrap_or(self.max_tokens),
            enabled: patch.enabled.unwrap_or(self.enabled),
            scope_info: scope,
            metadata: Some(patch.metadata.unwrap_or_else(|| self.metadata.clone())),
        }
    }
}
