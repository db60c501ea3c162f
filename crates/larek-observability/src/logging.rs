//! Subscriber installation and logging configuration.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Crates whose events the default filter lets through.
const LAREK_TARGETS: &[&str] = &[
    "larek_core",
    "larek_events",
    "larek_gateway",
    "larek_storefront",
    "larek_cli",
];

/// Errors from logging setup.
#[derive(Error, Debug)]
pub enum ObservabilityError {
    #[error("Invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("A global subscriber is already installed")]
    AlreadyInitialized,
}

/// Minimum level for Larek crates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format (for terminals).
    #[default]
    Human,
    /// JSON format (for log aggregation).
    Json,
}

/// Logging configuration, usually read from the `[logging]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for Larek crates.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Set the level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Filter directive used when `RUST_LOG` is unset.
    ///
    /// Other crates are held at `warn` so HTTP internals stay quiet.
    pub fn default_directive(&self) -> String {
        let mut directives = vec!["warn".to_string()];
        directives.extend(
            LAREK_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, self.level)),
        );
        directives.join(",")
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr so command output on stdout stays clean.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ObservabilityError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = config.default_directive();
            EnvFilter::try_new(&directive).map_err(|e| ObservabilityError::InvalidFilter {
                filter: directive.clone(),
                message: e.to_string(),
            })?
        }
    };

    let json = config.format == LogFormat::Json;
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|_| ObservabilityError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn test_default_directive_scopes_larek_crates() {
        let directive = LoggingConfig::default()
            .with_level(LogLevel::Debug)
            .default_directive();
        assert!(directive.starts_with("warn,"));
        assert!(directive.contains("larek_storefront=debug"));
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let config: LoggingConfig = toml::from_str("level = \"warn\"\nformat = \"json\"").unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Json);

        let partial: LoggingConfig = toml::from_str("level = \"trace\"").unwrap();
        assert_eq!(partial.format, LogFormat::Human);
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Error);
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }
}
