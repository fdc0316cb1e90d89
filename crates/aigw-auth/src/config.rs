//! Authorization configuration.

/// An external service users connect through OAuth2.
#[derive(Debug, Clone)]
pub struct OAuthProviderConfig {
    /// Provider key used in routes and account records (e.g. `box`).
    pub name: String,
    /// Human-readable name.
    pub label: String,
    /// Backend endpoint that starts the provider's login flow. Users are
    /// sent here with a full-page redirect.
    pub login_url: String,
}

impl OAuthProviderConfig {
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            login_url: format!("/api/oauth2/{name}/login"),
        }
    }
}

/// Configuration for authorization checks.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// External OAuth2 providers users can connect.
    pub oauth_providers: Vec<OAuthProviderConfig>,
    /// Division ids that mean "a division that does not exist yet".
    /// Editing such a division is a division creation.
    pub new_division_ids: Vec<String>,
}

impl AuthConfig {
    pub fn provider(&self, name: &str) -> Option<&OAuthProviderConfig> {
        self.oauth_providers.iter().find(|p| p.name == name)
    }

    pub fn is_new_division_id(&self, scope_id: &str) -> bool {
        self.new_division_ids.iter().any(|id| id == scope_id)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            oauth_providers: vec![
                OAuthProviderConfig::new("git", "Git"),
                OAuthProviderConfig::new("box", "Box"),
                OAuthProviderConfig::new("mattermost", "Mattermost"),
            ],
            new_division_ids: vec![String::new(), "new".into()],
        }
    }
}
