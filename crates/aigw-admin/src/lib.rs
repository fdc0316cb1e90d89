//! aigw admin: the admin console's scope plumbing.
//!
//! - [`scope_state`]: the selected-scope store every admin screen reads
//! - [`route`]: `/admin/<scopeType>/<scopeId>/<section>` parsing and rewriting
//! - [`scopes`]: which scopes a user may open the console at
//! - [`guard`]: the admin scope guard and the OAuth2 connection guard
//! - [`switcher`]: the explicit "switch scope" action
//! - [`catalog`], [`roles`], [`divisions`]: management actions that act on
//!   the selected scope and enforce the permission predicates

pub mod catalog;
pub mod config;
pub mod divisions;
pub mod guard;
pub mod roles;
pub mod route;
pub mod scope_state;
pub mod scopes;
pub mod switcher;

pub use catalog::ScopedCatalog;
pub use config::AdminConfig;
pub use divisions::DivisionService;
pub use guard::{
    AdminScopeGuard, ExternalNavigator, GuardDecision, OAuthGuard, UserInfoFetcher,
};
pub use roles::UserRoleService;
pub use route::AdminRoute;
pub use scope_state::{
    ScopeSelector, SelectedScope, restore_scope_from_url, scope_to_url_param, selected_scope,
};
pub use scopes::{AdminScope, AdminScopes, available_admin_scopes};
pub use switcher::ScopeSwitcher;
