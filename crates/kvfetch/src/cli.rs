use crate::config::{ConfigError, DEFAULT_CONFIG_FILE};
use crate::logging::{LogFormat, LogLevel};
use crate::output::{DEFAULT_OUTPUT_FILE, OutputError};
use clap::Parser;
use kvfetch_secrets::SecretError;
use miette::{Diagnostic, Report};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Configuration error exit code
pub const EXIT_CONFIG: i32 = 2;
/// Vault setup or output error exit code
pub const EXIT_RUNTIME: i32 = 3;

/// Fetch secrets from Azure Key Vault and write them to a YAML file.
///
/// Configuration is read from the config file when it exists; otherwise
/// from the KEYVAULT_URL and SECRET_MAP environment variables.
#[derive(Parser, Debug, Clone)]
#[command(name = "kvfetch", version, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Path of the YAML file to write
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, value_enum, default_value_t = LogLevel::default())]
    pub log_level: LogLevel,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::default())]
    pub log_format: LogFormat,
}

/// Parse command-line arguments, exiting with usage on error
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// Configuration error (exit code 2)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(kvfetch::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Authentication or vault client error (exit code 3)
    #[error("Vault error: {message}")]
    #[diagnostic(code(kvfetch::cli::vault))]
    Vault {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Output serialization or write error (exit code 3)
    #[error("Output error: {message}")]
    #[diagnostic(code(kvfetch::cli::output))]
    Output {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new vault error
    #[must_use]
    pub fn vault(message: impl Into<String>) -> Self {
        Self::Vault {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new output error
    #[must_use]
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
            help: None,
        }
    }

    /// Add help text to an existing error, returning a new error with the help text set.
    #[must_use]
    pub fn with_help(self, help_text: impl Into<String>) -> Self {
        let help = Some(help_text.into());
        match self {
            Self::Config { message, .. } => Self::Config { message, help },
            Self::Vault { message, .. } => Self::Vault { message, help },
            Self::Output { message, .. } => Self::Output { message, help },
        }
    }
}

/// Carry over the diagnostic help of a stage error, if it has one.
fn from_diagnostic(err: CliError, source: &dyn Diagnostic) -> CliError {
    match source.help() {
        Some(help) => err.with_help(help.to_string()),
        None => err,
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        from_diagnostic(Self::config(err.to_string()), &err)
    }
}

impl From<OutputError> for CliError {
    fn from(err: OutputError) -> Self {
        from_diagnostic(Self::output(err.to_string()), &err)
    }
}

/// Setup errors point at credentials; anything else is reported as-is.
impl From<SecretError> for CliError {
    fn from(err: SecretError) -> Self {
        match err {
            SecretError::Authentication { .. } => Self::vault(err.to_string()).with_help(
                "Set AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET, use a managed identity, or run `az login`",
            ),
            SecretError::ClientConstruction { .. } => Self::vault(err.to_string())
                .with_help("Check that the vault URL looks like https://<name>.vault.azure.net/"),
            SecretError::EmptyValue { .. } | SecretError::FetchFailed { .. } => {
                Self::vault(err.to_string())
            }
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CONFIG,
        CliError::Vault { .. } | CliError::Output { .. } => EXIT_RUNTIME,
    }
}

/// Render a fatal error to stderr
#[allow(clippy::print_stderr)]
pub fn render_error(err: &CliError) {
    let report = Report::new(err.clone());
    eprintln!("{report:?}");
    // Ensure output is flushed before process exit
    let _ = io::stderr().flush();
}
