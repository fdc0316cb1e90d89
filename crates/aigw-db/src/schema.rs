//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Scoped records carry both the
//! split scope (`scope_type`, `scope_id`) and the joined `scope_key`
//! (`type:id`) used for lookups.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Role assignments (user -> role at a scope)
-- =======================================================================
DEFINE TABLE role_assignment SCHEMAFULL;
DEFINE FIELD user_id ON TABLE role_assignment TYPE string;
DEFINE FIELD scope_type ON TABLE role_assignment TYPE string \
    ASSERT $value IN ['user', 'project', 'team', 'division', \
    'organization', 'global'];
DEFINE FIELD scope_id ON TABLE role_assignment TYPE string;
DEFINE FIELD scope_key ON TABLE role_assignment TYPE string;
DEFINE FIELD role ON TABLE role_assignment TYPE string \
    ASSERT $value IN ['super_admin', 'admin', 'maintainer', 'member'];
DEFINE FIELD created_at ON TABLE role_assignment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_assignment_user ON TABLE role_assignment \
    COLUMNS user_id;
DEFINE INDEX idx_role_assignment_scope ON TABLE role_assignment \
    COLUMNS scope_key;

-- =======================================================================
-- Scope labels (record id = scope key)
-- =======================================================================
DEFINE TABLE scope_label SCHEMAFULL;
DEFINE FIELD scope_type ON TABLE scope_label TYPE string \
    ASSERT $value IN ['user', 'project', 'team', 'division', \
    'organization', 'global'];
DEFINE FIELD scope_id ON TABLE scope_label TYPE string;
DEFINE FIELD label ON TABLE scope_label TYPE string;
DEFINE FIELD parent_type ON TABLE scope_label TYPE option<string>;
DEFINE FIELD parent_id ON TABLE scope_label TYPE option<string>;
DEFINE FIELD created_at ON TABLE scope_label TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE scope_label TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- AI providers (scoped)
-- =======================================================================
DEFINE TABLE ai_provider SCHEMAFULL;
DEFINE FIELD name ON TABLE ai_provider TYPE string;
DEFINE FIELD label ON TABLE ai_provider TYPE string;
DEFINE FIELD provider_type ON TABLE ai_provider TYPE string;
DEFINE FIELD base_url ON TABLE ai_provider TYPE string;
DEFINE FIELD enabled ON TABLE ai_provider TYPE bool DEFAULT true;
DEFINE FIELD scope_type ON TABLE ai_provider TYPE string;
DEFINE FIELD scope_id ON TABLE ai_provider TYPE string;
DEFINE FIELD scope_key ON TABLE ai_provider TYPE string;
DEFINE FIELD metadata ON TABLE ai_provider TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE ai_provider TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE ai_provider TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_ai_provider_name_scope ON TABLE ai_provider \
    COLUMNS name, scope_key UNIQUE;

-- =======================================================================
-- AI models (scoped)
-- =======================================================================
DEFINE TABLE ai_model SCHEMAFULL;
DEFINE FIELD name ON TABLE ai_model TYPE string;
DEFINE FIELD provider_name ON TABLE ai_model TYPE string;
DEFINE FIELD label ON TABLE ai_model TYPE string;
DEFINE FIELD max_tokens ON TABLE ai_model TYPE option<int>;
DEFINE FIELD enabled ON TABLE ai_model TYPE bool DEFAULT true;
DEFINE FIELD scope_type ON TABLE ai_model TYPE string;
DEFINE FIELD scope_id ON TABLE ai_model TYPE string;
DEFINE FIELD scope_key ON TABLE ai_model TYPE string;
DEFINE FIELD metadata ON TABLE ai_model TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE ai_model TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE ai_model TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_ai_model_name_scope ON TABLE ai_model \
    COLUMNS name, scope_key UNIQUE;

-- =======================================================================
-- API key definitions (scoped)
-- =======================================================================
DEFINE TABLE api_key SCHEMAFULL;
DEFINE FIELD name ON TABLE api_key TYPE string;
DEFINE FIELD label ON TABLE api_key TYPE string;
DEFINE FIELD description ON TABLE api_key TYPE string;
DEFINE FIELD header_name ON TABLE api_key TYPE string;
DEFINE FIELD enabled ON TABLE api_key TYPE bool DEFAULT true;
DEFINE FIELD scope_type ON TABLE api_key TYPE string;
DEFINE FIELD scope_id ON TABLE api_key TYPE string;
DEFINE FIELD scope_key ON TABLE api_key TYPE string;
DEFINE FIELD metadata ON TABLE api_key TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE api_key TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE api_key TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_api_key_name_scope ON TABLE api_key \
    COLUMNS name, scope_key UNIQUE;

-- =======================================================================
-- Connected OAuth2 accounts
-- =======================================================================
DEFINE TABLE oauth_account SCHEMAFULL;
DEFINE FIELD user_id ON TABLE oauth_account TYPE string;
DEFINE FIELD provider ON TABLE oauth_account TYPE string;
DEFINE FIELD external_user_id ON TABLE oauth_account \
    TYPE option<string>;
DEFINE FIELD connected_at ON TABLE oauth_account TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_oauth_account_user_provider ON TABLE oauth_account \
    COLUMNS user_id, provider UNIQUE;
";

/// Run all pending migrations against the database.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_defines_every_table() {
        for table in [
            "user",
            "role_assignment",
            "scope_label",
            "ai_provider",
            "ai_model",
            "api_key",
            "oauth_account",
        ] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
