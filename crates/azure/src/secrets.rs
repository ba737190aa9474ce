//! Azure Key Vault secret fetcher using ambient credential discovery

use async_trait::async_trait;
use azure_identity::DefaultAzureCredential;
use azure_security_keyvault_secrets::SecretClient;
use kvfetch_secrets::{SecretError, SecretFetcher, SecureSecret, VaultConnector};

/// Version argument that selects the current version of a secret
const LATEST_VERSION: &str = "";

/// Builds [`AzureKeyVaultFetcher`]s for a vault URL.
///
/// Credentials come from `DefaultAzureCredential`, which tries in order:
/// - Environment variables (`AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`)
/// - Workload identity
/// - Managed identity (when running in Azure)
/// - Azure CLI / Azure Developer CLI credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureConnector;

impl AzureConnector {
    /// Create a new connector
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VaultConnector for AzureConnector {
    async fn connect(&self, vault_url: &str) -> Result<Box<dyn SecretFetcher>, SecretError> {
        let fetcher = AzureKeyVaultFetcher::new(vault_url)?;
        Ok(Box::new(fetcher))
    }
}

/// Fetches secrets from one Azure Key Vault
pub struct AzureKeyVaultFetcher {
    client: SecretClient,
    vault_url: String,
}

impl std::fmt::Debug for AzureKeyVaultFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureKeyVaultFetcher")
            .field("vault_url", &self.vault_url)
            .finish_non_exhaustive()
    }
}

impl AzureKeyVaultFetcher {
    /// Authenticate with ambient credentials and build a client for `vault_url`.
    ///
    /// # Errors
    /// Returns [`SecretError::Authentication`] if no credential chain can be
    /// built, or [`SecretError::ClientConstruction`] if the client rejects the URL.
    pub fn new(vault_url: &str) -> Result<Self, SecretError> {
        let vault_url = vault_url.trim();
        tracing::debug!(vault_url, "Creating Azure Key Vault client");

        let credential =
            DefaultAzureCredential::new().map_err(|e| SecretError::Authentication {
                message: e.to_string(),
            })?;

        let client = SecretClient::new(vault_url, credential, None).map_err(|e| {
            SecretError::ClientConstruction {
                vault_url: vault_url.to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            client,
            vault_url: vault_url.to_string(),
        })
    }

    /// The vault URL this fetcher talks to
    #[must_use]
    pub fn vault_url(&self) -> &str {
        &self.vault_url
    }
}

#[async_trait]
impl SecretFetcher for AzureKeyVaultFetcher {
    fn provider_name(&self) -> &'static str {
        "azure"
    }

    async fn fetch(&self, name: &str) -> Result<SecureSecret, SecretError> {
        let response = self
            .client
            .get_secret(name, LATEST_VERSION, None)
            .await
            .map_err(|e| fetch_failed(name, &e))?;

        let secret = response
            .into_body()
            .await
            .map_err(|e| fetch_failed(name, &e))?;

        secret
            .value
            .map(SecureSecret::new)
            .ok_or_else(|| SecretError::EmptyValue {
                name: name.to_string(),
            })
    }
}

fn fetch_failed(name: &str, err: &impl std::fmt::Display) -> SecretError {
    SecretError::FetchFailed {
        name: name.to_string(),
        message: format!("Azure Key Vault error: {err}"),
    }
}
