//! Admin console configuration.

use aigw_core::models::scope::ScopeType;

#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Path prefix of every admin route.
    pub admin_prefix: String,
    /// Where users without any admin scope are sent.
    pub home_path: String,
    /// Scope types the console can be opened at.
    pub admin_scope_types: Vec<ScopeType>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            admin_prefix: "/admin".into(),
            home_path: "/home".into(),
            admin_scope_types: vec![ScopeType::Organization, ScopeType::Division],
        }
    }
}
