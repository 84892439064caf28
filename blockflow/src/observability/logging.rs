//! Process-wide logging setup.

use crate::errors::BlockflowError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable single-line output.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging section of the engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set (e.g. `info` or `blockflow=debug`).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Builds the filter, preferring `RUST_LOG` over the configured level.
    ///
    /// # Errors
    ///
    /// Returns [`BlockflowError::Config`] if the configured level does not
    /// parse as a filter directive.
    pub fn env_filter(&self) -> Result<EnvFilter, BlockflowError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.level)
            .map_err(|e| BlockflowError::Config(format!("invalid log level '{}': {e}", self.level)))
    }
}

/// Installs the global `tracing` subscriber.
///
/// Uses the `RUST_LOG` env var if set, otherwise falls back to the
/// configured level.
///
/// # Errors
///
/// Returns [`BlockflowError::Config`] if the level is invalid or a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), BlockflowError> {
    let env_filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| BlockflowError::Config(format!("failed to install logger: {e}")))
}
