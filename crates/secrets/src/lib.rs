//! Secret fetching for kvfetch
//!
//! Provides the narrow interfaces the pipeline talks to a vault through,
//! plus the sequential fetch loop that turns a name mapping into a
//! [`SecretBundle`].
//!
//! ```ignore
//! use kvfetch_secrets::{VaultConnector, fetch_bundle};
//!
//! let fetcher = connector.connect("https://example.vault.azure.net/").await?;
//! let bundle = fetch_bundle(fetcher.as_ref(), &secret_map).await;
//! ```
//!
//! Provider implementations live in separate crates:
//! - kvfetch-azure: `AzureConnector`, `AzureKeyVaultFetcher`

mod fetch;
mod types;

pub use fetch::fetch_bundle;
pub use types::{SecretBundle, SecureSecret};

use async_trait::async_trait;
use thiserror::Error;

/// Error types for vault access
#[derive(Debug, Error)]
pub enum SecretError {
    /// The vault answered but the secret carries no value
    #[error("Secret '{name}' has no value")]
    EmptyValue {
        /// Remote secret name
        name: String,
    },

    /// Fetching a single secret failed
    #[error("Failed to fetch secret '{name}': {message}")]
    FetchFailed {
        /// Remote secret name
        name: String,
        /// Error message from the provider
        message: String,
    },

    /// Ambient credentials could not be resolved
    #[error("Failed to get credential: {message}")]
    Authentication {
        /// Error message from the identity provider
        message: String,
    },

    /// The vault client could not be built for the given URL
    #[error("Failed to create vault client for '{vault_url}': {message}")]
    ClientConstruction {
        /// Vault URL the client was built for
        vault_url: String,
        /// Error message from the SDK
        message: String,
    },
}

impl SecretError {
    /// Whether this error happened while setting up vault access rather than
    /// while fetching one secret.
    #[must_use]
    pub const fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::ClientConstruction { .. }
        )
    }
}

/// Fetches current secret values by name from one vault.
#[async_trait]
pub trait SecretFetcher: Send + Sync {
    /// Fetch the current value of `name`.
    async fn fetch(&self, name: &str) -> Result<SecureSecret, SecretError>;

    /// Get the provider name for this fetcher, e.g. `"azure"`.
    fn provider_name(&self) -> &'static str;
}

/// Produces an authenticated [`SecretFetcher`] for a vault location.
///
/// Credentials are discovered from the ambient environment; nothing is
/// passed in explicitly.
#[async_trait]
pub trait VaultConnector: Send + Sync {
    /// Authenticate and build a fetcher for `vault_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Authentication`] or
    /// [`SecretError::ClientConstruction`] when setup fails.
    async fn connect(&self, vault_url: &str) -> Result<Box<dyn SecretFetcher>, SecretError>;
}
