//! aigw core: scope model, effective-item resolution, and the repository
//! traits implemented by the storage layer.

pub mod effective;
pub mod error;
pub mod models;
pub mod repository;

pub use effective::effective_items;
pub use error::{GatewayError, GatewayResult};
pub use models::scope::{ScopeInfo, ScopeType, ScopedEntity, ScopedInput, ScopedItem};
