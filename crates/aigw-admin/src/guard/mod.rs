//! Route guards.
//!
//! A guard runs before a navigation completes and answers with a
//! [`GuardDecision`]. Guards finish every state change they make before
//! returning, so a caller acting on the decision sees consistent state.

mod oauth_guard;
mod scope_guard;

pub use oauth_guard::{ExternalNavigator, OAuthGuard, UserInfoFetcher};
pub use scope_guard::AdminScopeGuard;

/// Outcome of a guarded navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Deny,
    /// Navigate to `to` instead. With `replace_url` the current history
    /// entry is replaced rather than pushed.
    Redirect { to: String, replace_url: bool },
}
