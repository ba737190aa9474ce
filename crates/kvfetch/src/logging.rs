//! Tracing subscriber setup. Logs always go to stderr so stdout carries
//! only the final status line.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Minimum level of log lines to emit
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Everything, including per-request SDK chatter
    Trace,
    /// Per-secret progress
    Debug,
    /// Summary lines
    #[default]
    Info,
    /// Skipped secrets and overwritten keys
    Warn,
    /// Errors only
    Error,
}

impl LogLevel {
    /// Directive understood by [`EnvFilter`]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log line format
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Pick the filter directive: a non-empty `RUST_LOG` wins over `level`.
#[must_use]
pub fn filter_directive(level: LogLevel, rust_log: Option<&str>) -> String {
    match rust_log.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive.to_string(),
        _ => level.as_str().to_string(),
    }
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(level: LogLevel, format: LogFormat) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(level, rust_log.as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
