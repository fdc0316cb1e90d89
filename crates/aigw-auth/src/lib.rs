//! aigw auth: scope-based permission predicates over a user's role list,
//! and the configuration of external OAuth2 providers.

pub mod config;
pub mod error;
pub mod permission;

pub use config::{AuthConfig, OAuthProviderConfig};
pub use error::AuthError;
pub use permission::{Decision, Permissions, RoleTier, ScopeRequirement, authorize};
