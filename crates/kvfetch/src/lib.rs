//! kvfetch: export Azure Key Vault secrets to a YAML file
//!
//! One run is a straight pipeline:
//!
//! 1. [`config::Config::load`] reads the vault URL and secret map from a
//!    YAML file, or from `KEYVAULT_URL` / `SECRET_MAP` when the file is absent
//! 2. a [`VaultConnector`] authenticates and builds a fetcher
//! 3. [`fetch_bundle`] fetches every mapped secret, skipping failures
//! 4. [`output::write_bundle`] writes the result as YAML
//!
//! Any failure in steps 1, 2 or 4 aborts the run. Failures of individual
//! secrets in step 3 are logged and never abort it.

pub mod cli;
pub mod config;
pub mod logging;
pub mod output;

use cli::{Cli, CliError};
use config::Config;
use kvfetch_secrets::{VaultConnector, fetch_bundle};
use std::path::PathBuf;

/// Run the pipeline once with the paths from `cli`.
///
/// Returns the path of the written file.
///
/// # Errors
/// Returns a [`CliError`] for configuration, vault setup, or output failures.
pub async fn run<C>(cli: &Cli, connector: &C) -> Result<PathBuf, CliError>
where
    C: VaultConnector + ?Sized,
{
    let config = Config::load(&cli.config)?;
    tracing::info!(
        source = %config.source,
        vault_url = %config.vault_url,
        secrets = config.secret_map.len(),
        "Loaded configuration"
    );

    let fetcher = connector.connect(&config.vault_url).await?;

    let bundle = fetch_bundle(fetcher.as_ref(), &config.secret_map).await;

    output::write_bundle(&bundle, &cli.output)?;

    Ok(cli.output.clone())
}
