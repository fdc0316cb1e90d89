//! SurrealDB implementation of [`OAuthAccountRepository`].

use aigw_core::error::GatewayResult;
use aigw_core::models::oauth_account::{CreateOAuthAccount, OAuthAccount};
use aigw_core::repository::OAuthAccountRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::row::parse_uuid;

#[derive(Debug, SurrealValue)]
struct OAuthAccountRowWithId {
    record_id: String,
    user_id: String,
    provider: String,
    external_user_id: Option<String>,
    connected_at: DateTime<Utc>,
}

impl OAuthAccountRowWithId {
    fn try_into_account(self) -> Result<OAuthAccount, DbError> {
        Ok(OAuthAccount {
            id: parse_uuid("oauth_account", &self.record_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            provider: self.provider,
            external_user_id: self.external_user_id,
            connected_at: self.connected_at,
        })
    }
}

/// SurrealDB implementation of the OAuth account repository.
#[derive(Clone)]
pub struct SurrealOAuthAccountRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOAuthAccountRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OAuthAccountRepository for SurrealOAuthAccountRepository<C> {
    /// Connecting an already connected provider replaces the stored
    /// external account id.
    async fn connect(&self, input: CreateOAuthAccount) -> GatewayResult<OAuthAccount> {
        if let Some(existing) = self.find(input.user_id, &input.provider).await? {
            self.db
                .query(
                    "UPDATE type::record('oauth_account', $id) SET \
                     external_user_id = $external_user_id, \
                     connected_at = time::now()",
                )
                .bind(("id", existing.id.to_string()))
                .bind(("external_user_id", input.external_user_id))
                .await
                .map_err(DbError::from)?
                .check()
                .map_err(|e| DbError::Migration(e.to_string()))?;
        } else {
            self.db
                .query(
                    "CREATE type::record('oauth_account', $id) SET \
                     user_id = $user_id, provider = $provider, \
                     external_user_id = $external_user_id",
                )
                .bind(("id", Uuid::new_v4().to_string()))
                .bind(("user_id", input.user_id.to_string()))
                .bind(("provider", input.provider.clone()))
                .bind(("external_user_id", input.external_user_id))
                .await
                .map_err(DbError::from)?
                .check()
                .map_err(|e| DbError::Migration(e.to_string()))?;
        }

        self.find(input.user_id, &input.provider)
            .await?
            .ok_or_else(|| {
                DbError::NotFound {
                    entity: "oauth_account".into(),
                    id: format!("{}/{}", input.user_id, input.provider),
                }
                .into()
            })
    }

    async fn find(&self, user_id: Uuid, provider: &str) -> GatewayResult<Option<OAuthAccount>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM oauth_account \
                 WHERE user_id = $user_id AND provider = $provider",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("provider", provider.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OAuthAccountRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .next()
            .map(OAuthAccountRowWithId::try_into_account)
            .transpose()?)
    }

    async fn list_by_user(&self, user_id: Uuid) -> GatewayResult<Vec<OAuthAccount>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM oauth_account \
                 WHERE user_id = $user_id \
                 ORDER BY connected_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OAuthAccountRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(OAuthAccountRowWithId::try_into_account)
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn disconnect(&self, user_id: Uuid, provider: &str) -> GatewayResult<()> {
        self.db
            .query(
                "DELETE oauth_account \
                 WHERE user_id = $user_id AND provider = $provider",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("provider", provider.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
