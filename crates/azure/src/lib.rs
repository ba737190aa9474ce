//! Azure integration for kvfetch
//!
//! This crate provides Azure service integrations for kvfetch.
//! Currently supports:
//! - Azure Key Vault secrets via the [`secrets`] module

pub mod secrets;

// Re-export main types for convenience
pub use secrets::{AzureConnector, AzureKeyVaultFetcher};
