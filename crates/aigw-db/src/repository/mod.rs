//! SurrealDB repository implementations.

mod ai_model;
mod ai_provider;
mod api_key;
mod oauth_account;
mod scope_label;
mod user;

pub use ai_model::SurrealAiModelRepository;
pub use ai_provider::SurrealAiProviderRepository;
pub use api_key::SurrealApiKeyRepository;
pub use oauth_account::SurrealOAuthAccountRepository;
pub use scope_label::SurrealScopeLabelRepository;
pub use user::SurrealUserRepository;
