//! SurrealDB connection management.

use std::env;

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

/// Where the gateway's admin data lives.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address, `host:port`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials.
    pub username: String,
    pub password: String,
}

impl DbConfig {
    /// Defaults overridden by `AIGW_DB_URL`, `AIGW_DB_NAMESPACE`,
    /// `AIGW_DB_DATABASE`, `AIGW_DB_USERNAME` and `AIGW_DB_PASSWORD`.
    /// Unset or empty variables keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let fields = [
            ("AIGW_DB_URL", &mut config.url),
            ("AIGW_DB_NAMESPACE", &mut config.namespace),
            ("AIGW_DB_DATABASE", &mut config.database),
            ("AIGW_DB_USERNAME", &mut config.username),
            ("AIGW_DB_PASSWORD", &mut config.password),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
        config
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "aigw".into(),
            database: "admin".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// A signed-in connection to the admin database.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to admin database"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        Ok(Self { db })
    }

    /// Brings the schema up to date. Safe to run on every start.
    pub async fn migrate(&self) -> Result<(), DbError> {
        run_migrations(&self.db).await?;
        info!("Admin schema is up to date");
        Ok(())
    }

    /// Client for building repositories.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_without_environment() {
        let config = DbConfig::from_lookup(|_| None);
        assert_eq!(config.url, "127.0.0.1:8000");
        assert_eq!(config.namespace, "aigw");
        assert_eq!(config.database, "admin");
    }

    #[test]
    fn environment_overrides_defaults() {
        let vars = HashMap::from([
            ("AIGW_DB_URL", "db.internal:8000"),
            ("AIGW_DB_DATABASE", "staging"),
            ("AIGW_DB_PASSWORD", ""),
        ]);
        let config = DbConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.url, "db.internal:8000");
        assert_eq!(config.database, "staging");
        assert_eq!(config.namespace, "aigw");
        // Empty values are ignored.
        assert_eq!(config.password, "root");
    }
}
