//! Database-specific error types and conversions.

use aigw_core::error::GatewayError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },
}

impl DbError {
    /// Classifies a failed write. Unique index violations become
    /// [`DbError::AlreadyExists`] naming `entity`.
    pub(crate) fn on_write(entity: impl Into<String>, message: String) -> Self {
        if message.contains("already contains") {
            DbError::AlreadyExists {
                entity: entity.into(),
            }
        } else {
            DbError::Migration(message)
        }
    }
}

impl From<DbError> for GatewayError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => GatewayError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => GatewayError::AlreadyExists { entity },
            other => GatewayError::Database(other.to_string()),
        }
    }
}
