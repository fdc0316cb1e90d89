//! Domain models for the gateway admin layer.
//!
//! These are the core types shared across all crates.

pub mod ai_model;
pub mod ai_provider;
pub mod api_key;
pub mod oauth_account;
pub mod scope;
pub mod user;
