//! Connected OAuth2 account domain model.
//!
//! Chat integrations with external services (Git, Box, Mattermost) require
//! the user to have connected an account at that provider first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Provider name as configured (e.g. `box`, `mattermost`).
    pub provider: String,
    /// Account id at the provider, once user info has been fetched.
    pub external_user_id: Option<String>,
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOAuthAccount {
    pub user_id: Uuid,
    pub provider: String,
    pub external_user_id: Option<String>,
}
