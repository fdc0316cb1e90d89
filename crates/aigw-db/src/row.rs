//! Conversions shared by the row structs of all repositories.

use aigw_core::models::scope::{ScopeInfo, ScopeType};
use uuid::Uuid;

use crate::error::DbError;

pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Corrupt(format!("invalid {field} UUID: {e}")))
}

pub(crate) fn parse_scope(scope_type: &str, scope_id: String) -> Result<ScopeInfo, DbError> {
    let scope_type: ScopeType = scope_type
        .parse()
        .map_err(|_| DbError::Corrupt(format!("unknown scope type: {scope_type}")))?;
    Ok(ScopeInfo::new(scope_type, scope_id))
}

pub(crate) fn scope_keys(scopes: &[ScopeInfo]) -> Vec<String> {
    scopes.iter().map(ScopeInfo::key).collect()
}
