//! Configuration loading: a YAML file, or environment variables when the
//! file is absent.

use miette::Diagnostic;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Environment variable holding the vault URL
pub const KEYVAULT_URL_ENV: &str = "KEYVAULT_URL";

/// Environment variable holding the JSON-encoded secret map
pub const SECRET_MAP_ENV: &str = "SECRET_MAP";

/// Errors that can occur while loading configuration.
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    #[diagnostic(
        code(kvfetch::config::read),
        help("Check that the file is readable by the current user")
    )]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML or has the wrong shape.
    #[error("failed to unmarshal config {}: {source}", .path.display())]
    #[diagnostic(
        code(kvfetch::config::parse),
        help("Expected a `keyVaultURL` string and a `secretMap` mapping of secret name to output key")
    )]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration file has an empty `keyVaultURL`.
    #[error("keyVaultURL is empty in config file {}", .path.display())]
    #[diagnostic(
        code(kvfetch::config::missing_vault_url),
        help("Set `keyVaultURL` to the vault URI, e.g. https://my-vault.vault.azure.net/")
    )]
    MissingVaultUrl {
        /// Path to the configuration file.
        path: PathBuf,
    },

    /// A required environment variable is unset or empty.
    #[error("{var} environment variable is not set")]
    #[diagnostic(
        code(kvfetch::config::missing_env),
        help("Without a config file, both KEYVAULT_URL and SECRET_MAP must be set")
    )]
    MissingEnv {
        /// Name of the environment variable.
        var: &'static str,
    },

    /// `SECRET_MAP` is not a JSON object of strings.
    #[error("failed to unmarshal SECRET_MAP environment variable: {source}")]
    #[diagnostic(
        code(kvfetch::config::invalid_secret_map),
        help("SECRET_MAP must be a JSON object of secret name to output key")
    )]
    InvalidSecretMap {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Where a [`Config`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A YAML configuration file
    File(PathBuf),
    /// `KEYVAULT_URL` and `SECRET_MAP`
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Environment => f.write_str("environment"),
        }
    }
}

/// On-disk shape of the configuration file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "keyVaultURL")]
    key_vault_url: String,
    #[serde(rename = "secretMap", default)]
    secret_map: BTreeMap<String, String>,
}

/// Vault location plus the mapping of remote secret names to output keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Vault URI, e.g. `https://my-vault.vault.azure.net/`
    pub vault_url: String,
    /// Remote secret name -> output key
    pub secret_map: BTreeMap<String, String>,
    /// Where this configuration came from
    pub source: ConfigSource,
}

impl Config {
    /// Load configuration from `path` if it exists, otherwise from the
    /// environment. The two sources are never merged.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when the chosen source is unreadable,
    /// malformed, or missing a required value.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                path = %path.display(),
                "Config file not found, falling back to environment"
            );
            Self::from_env()
        }
    }

    /// Read and parse a YAML configuration file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`], [`ConfigError::Parse`] or
    /// [`ConfigError::MissingVaultUrl`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file: ConfigFile =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if file.key_vault_url.trim().is_empty() {
            return Err(ConfigError::MissingVaultUrl {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            vault_url: file.key_vault_url,
            secret_map: file.secret_map,
            source: ConfigSource::File(path.to_path_buf()),
        })
    }

    /// Read configuration from `KEYVAULT_URL` and `SECRET_MAP`.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingEnv`] or [`ConfigError::InvalidSecretMap`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_vars(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingEnv`] or [`ConfigError::InvalidSecretMap`].
    pub fn from_env_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &'static str| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingEnv { var })
        };

        let vault_url = non_empty(KEYVAULT_URL_ENV)?;
        let raw_map = non_empty(SECRET_MAP_ENV)?;

        let secret_map = serde_json::from_str(&raw_map)
            .map_err(|source| ConfigError::InvalidSecretMap { source })?;

        Ok(Self {
            vault_url,
            secret_map,
            source: ConfigSource::Environment,
        })
    }
}
