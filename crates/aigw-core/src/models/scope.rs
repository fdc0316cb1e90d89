//! Scope domain model.
//!
//! Every administrative entity and every role assignment is attached to a
//! scope. Scopes nest from the narrowest (`User`) to the broadest
//! (`Global`); the numeric priority table below is the single source of
//! truth for that ordering.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GatewayError;

/// The kind of administrative boundary a scope represents.
///
/// Variants are declared narrowest first, so the derived `Ord` agrees with
/// [`ScopeType::priority`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    User,
    Project,
    Team,
    Division,
    Organization,
    Global,
}

impl ScopeType {
    pub const ALL: [ScopeType; 6] = [
        ScopeType::User,
        ScopeType::Project,
        ScopeType::Team,
        ScopeType::Division,
        ScopeType::Organization,
        ScopeType::Global,
    ];

    /// Numeric priority: lower is narrower.
    pub fn priority(self) -> u8 {
        match self {
            ScopeType::User => 10,
            ScopeType::Project => 20,
            ScopeType::Team => 30,
            ScopeType::Division => 40,
            ScopeType::Organization => 50,
            ScopeType::Global => 60,
        }
    }

    /// Whether an entity at `self` overrides one at `other`.
    ///
    /// The narrower scope wins, i.e. the lower priority value.
    pub fn is_more_specific_than(self, other: ScopeType) -> bool {
        self.priority() < other.priority()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScopeType::User => "user",
            ScopeType::Project => "project",
            ScopeType::Team => "team",
            ScopeType::Division => "division",
            ScopeType::Organization => "organization",
            ScopeType::Global => "global",
        }
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScopeType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScopeType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GatewayError::InvalidScope(format!("unknown scope type: {s}")))
    }
}

/// Identifies one scope instance, e.g. Division `div1`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ScopeInfo {
    pub scope_type: ScopeType,
    pub scope_id: String,
}

impl ScopeInfo {
    pub fn new(scope_type: ScopeType, scope_id: impl Into<String>) -> Self {
        Self {
            scope_type,
            scope_id: scope_id.into(),
        }
    }

    pub fn organization(id: impl Into<String>) -> Self {
        Self::new(ScopeType::Organization, id)
    }

    pub fn division(id: impl Into<String>) -> Self {
        Self::new(ScopeType::Division, id)
    }

    /// Stable textual key (`type:id`), used for storage lookups and
    /// URL tokens.
    pub fn key(&self) -> String {
        format!("{}:{}", self.scope_type, self.scope_id)
    }
}

impl fmt::Display for ScopeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope_type, self.scope_id)
    }
}

impl FromStr for ScopeInfo {
    type Err = GatewayError;

    /// Parses a `type:id` token. Both halves must be non-empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scope_type, scope_id) = s
            .split_once(':')
            .ok_or_else(|| GatewayError::InvalidScope(format!("malformed scope token: {s}")))?;
        let scope_id = scope_id.trim();
        if scope_id.is_empty() {
            return Err(GatewayError::InvalidScope(format!(
                "scope token has no id: {s}"
            )));
        }
        Ok(Self::new(scope_type.parse()?, scope_id))
    }
}

/// Anything attached to a scope under a logical name.
///
/// The name correlates an Organization-level definition with its
/// narrower overrides.
pub trait ScopedItem {
    fn name(&self) -> &str;
    fn scope_info(&self) -> &ScopeInfo;
}

/// A persisted scoped record that can be overridden at a narrower scope.
///
/// Overrides replace the inherited record wholesale: the narrower copy
/// starts from every field of the inherited one, with `patch` applied on
/// top.
pub trait ScopedEntity: ScopedItem + Clone + Send + Sync {
    type Create: ScopedInput + Send;
    type Update: Send;

    /// Entity name used in errors and logs.
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;

    fn override_at(&self, scope: ScopeInfo, patch: Self::Update) -> Self::Create;
}

/// Create-input of a scoped entity.
pub trait ScopedInput {
    /// Re-targets the input at `scope`.
    fn with_scope(self, scope: ScopeInfo) -> Self;
}

/// Human-readable label of a scope instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeLabel {
    pub scope: ScopeInfo,
    pub label: String,
    /// Enclosing scope, e.g. the Organization of a Division.
    pub parent: Option<ScopeInfo>,
}

/// Fields required to register (or relabel) a scope instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScopeLabel {
    pub scope: ScopeInfo,
    pub label: String,
    pub parent: Option<ScopeInfo>,
}

/// One `{id, label}` pair of the scope-label map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeLabelEntry {
    pub id: String,
    pub label: String,
}

/// Scope labels grouped by scope type, the shape admin screens consume.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ScopeLabels(pub HashMap<ScopeType, Vec<ScopeLabelEntry>>);

impl ScopeLabels {
    pub fn from_labels(labels: impl IntoIterator<Item = ScopeLabel>) -> Self {
        let mut map: HashMap<ScopeType, Vec<ScopeLabelEntry>> = HashMap::new();
        for label in labels {
            map.entry(label.scope.scope_type)
                .or_default()
                .push(ScopeLabelEntry {
                    id: label.scope.scope_id,
                    label: label.label,
                });
        }
        Self(map)
    }

    pub fn label_for(&self, scope: &ScopeInfo) -> Option<&str> {
        self.0
            .get(&scope.scope_type)?
            .iter()
            .find(|entry| entry.id == scope.scope_id)
            .map(|entry| entry.label.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_table_is_strictly_increasing() {
        for window in ScopeType::ALL.windows(2) {
            assert!(window[0].priority() < window[1].priority());
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn division_is_more_specific_than_organization() {
        assert!(ScopeType::Division.is_more_specific_than(ScopeType::Organization));
        assert!(!ScopeType::Organization.is_more_specific_than(ScopeType::Division));
        assert!(!ScopeType::Team.is_more_specific_than(ScopeType::Team));
    }

    #[test]
    fn parse_scope_type_is_case_insensitive() {
        assert_eq!("Division".parse::<ScopeType>().unwrap(), ScopeType::Division);
        assert_eq!("global".parse::<ScopeType>().unwrap(), ScopeType::Global);
        assert!("tenant".parse::<ScopeType>().is_err());
    }

    #[test]
    fn parse_scope_token() {
        let scope: ScopeInfo = "division:div1".parse().unwrap();
        assert_eq!(scope, ScopeInfo::division("div1"));
        assert_eq!(scope.to_string(), "division:div1");

        assert!("bogus".parse::<ScopeInfo>().is_err());
        assert!("division:".parse::<ScopeInfo>().is_err());
        assert!("planet:earth".parse::<ScopeInfo>().is_err());
    }

    #[test]
    fn scope_info_uses_camel_case_on_the_wire() {
        let json = serde_json::to_value(ScopeInfo::organization("org1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "scopeType": "organization", "scopeId": "org1" })
        );
    }

    #[test]
    fn scope_labels_lookup() {
        let labels = ScopeLabels::from_labels(vec![
            ScopeLabel {
                scope: ScopeInfo::organization("org1"),
                label: "Acme".into(),
                parent: None,
            },
            ScopeLabel {
                scope: ScopeInfo::division("div1"),
                label: "Research".into(),
                parent: Some(ScopeInfo::organization("org1")),
            },
        ]);

        assert_eq!(labels.label_for(&ScopeInfo::division("div1")), Some("Research"));
        assert_eq!(labels.label_for(&ScopeInfo::division("div2")), None);
        assert!(!labels.is_empty());
        assert!(ScopeLabels::default().is_empty());
    }
}
