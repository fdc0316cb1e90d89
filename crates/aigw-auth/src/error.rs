//! Authorization error types.

use aigw_core::error::GatewayError;
use aigw_core::models::scope::ScopeInfo;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no permission to {action}")]
    PermissionDenied { action: String },

    #[error("no permission to {action} at {scope}")]
    ScopePermissionDenied { action: String, scope: ScopeInfo },
}

impl From<AuthError> for GatewayError {
    fn from(err: AuthError) -> Self {
        GatewayError::AuthorizationDenied {
            reason: err.to_string(),
        }
    }
}
