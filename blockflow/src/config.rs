//! Engine configuration.
//!
//! The configuration is read once at startup and passed down explicitly:
//! logging settings for [`init_logging`](crate::observability::init_logging)
//! and named retry policies that become [`RetryStrategy`] values for
//! [`TransientFaultHandlingBuilder`](crate::retry::TransientFaultHandlingBuilder).
//!
//! ```json
//! {
//!   "logging": { "level": "info", "format": "json" },
//!   "retry_policies": [
//!     { "kind": "exponential", "name": "GatewayRetryer", "max_attempts": 4,
//!       "min_backoff_ms": 100, "max_backoff_ms": 2000, "delta_backoff_ms": 200 }
//!   ]
//! }
//! ```

use crate::errors::BlockflowError;
use crate::observability::LoggingConfig;
use crate::retry::{ExponentialBackoff, FixedInterval, Incremental, RetryStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A named retry policy as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RetryPolicyConfig {
    /// Exponential backoff with jitter.
    Exponential {
        /// Policy name.
        name: String,
        /// Total attempts, including the first call.
        max_attempts: u32,
        /// Lower delay bound in milliseconds.
        min_backoff_ms: u64,
        /// Upper delay bound in milliseconds.
        max_backoff_ms: u64,
        /// Growth increment in milliseconds.
        delta_backoff_ms: u64,
        /// Whether the first retry is immediate.
        #[serde(default)]
        fast_first_retry: bool,
        /// Jitter ratio override.
        #[serde(default)]
        jitter_ratio: Option<f64>,
    },
    /// Constant delay.
    Fixed {
        /// Policy name.
        name: String,
        /// Total attempts, including the first call.
        max_attempts: u32,
        /// Delay in milliseconds.
        interval_ms: u64,
        /// Whether the first retry is immediate.
        #[serde(default)]
        fast_first_retry: bool,
    },
    /// Linearly growing delay.
    Incremental {
        /// Policy name.
        name: String,
        /// Total attempts, including the first call.
        max_attempts: u32,
        /// First delay in milliseconds.
        initial_interval_ms: u64,
        /// Added per retry, in milliseconds.
        increment_ms: u64,
        /// Whether the first retry is immediate.
        #[serde(default)]
        fast_first_retry: bool,
    },
}

impl RetryPolicyConfig {
    /// Returns the policy name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Exponential { name, .. }
            | Self::Fixed { name, .. }
            | Self::Incremental { name, .. } => name,
        }
    }

    /// Builds the strategy this entry describes.
    #[must_use]
    pub fn to_strategy(&self) -> Arc<dyn RetryStrategy> {
        match self {
            Self::Exponential {
                name,
                max_attempts,
                min_backoff_ms,
                max_backoff_ms,
                delta_backoff_ms,
                fast_first_retry,
                jitter_ratio,
            } => {
                let mut strategy = ExponentialBackoff::new(
                    name.clone(),
                    *max_attempts,
                    Duration::from_millis(*min_backoff_ms),
                    Duration::from_millis(*max_backoff_ms),
                    Duration::from_millis(*delta_backoff_ms),
                    *fast_first_retry,
                );
                if let Some(ratio) = jitter_ratio {
                    strategy = strategy.with_jitter_ratio(*ratio);
                }
                Arc::new(strategy)
            }
            Self::Fixed {
                name,
                max_attempts,
                interval_ms,
                fast_first_retry,
            } => {
                let mut strategy =
                    FixedInterval::new(name.clone(), *max_attempts, Duration::from_millis(*interval_ms));
                strategy.fast_first_retry = *fast_first_retry;
                Arc::new(strategy)
            }
            Self::Incremental {
                name,
                max_attempts,
                initial_interval_ms,
                increment_ms,
                fast_first_retry,
            } => {
                let mut strategy = Incremental::new(
                    name.clone(),
                    *max_attempts,
                    Duration::from_millis(*initial_interval_ms),
                    Duration::from_millis(*increment_ms),
                );
                strategy.fast_first_retry = *fast_first_retry;
                Arc::new(strategy)
            }
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Named retry policies.
    pub retry_policies: Vec<RetryPolicyConfig>,
}

impl EngineConfig {
    /// Parses a JSON configuration string.
    ///
    /// # Errors
    ///
    /// Returns [`BlockflowError::Serialization`] for malformed JSON and
    /// [`BlockflowError::Config`] if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, BlockflowError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`BlockflowError::Io`] if the file cannot be read, otherwise
    /// the errors of [`from_json_str`](Self::from_json_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BlockflowError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Checks the configuration, reporting every problem at once.
    ///
    /// # Errors
    ///
    /// Returns [`BlockflowError::Config`] listing all validation failures.
    pub fn validate(&self) -> Result<(), BlockflowError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        if self.logging.level.trim().is_empty() {
            errors.push("logging.level must not be empty".to_string());
        }

        for (i, policy) in self.retry_policies.iter().enumerate() {
            let name = policy.name();
            if name.trim().is_empty() {
                errors.push(format!("Retry policy {i} has an empty name"));
                continue;
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                errors.push(format!("Retry policy '{name}' is defined more than once"));
            }
            if let Err(reason) = policy.to_strategy().validate() {
                errors.push(format!("Retry policy '{name}': {reason}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(BlockflowError::Config(errors.join("; ")))
        }
    }

    /// Builds a strategy for every configured retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`BlockflowError::Config`] if the configuration is invalid.
    pub fn retry_strategies(&self) -> Result<Vec<Arc<dyn RetryStrategy>>, BlockflowError> {
        self.validate()?;
        Ok(self
            .retry_policies
            .iter()
            .map(RetryPolicyConfig::to_strategy)
            .collect())
    }

    /// Builds the strategy for the policy named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BlockflowError::Config`] if no policy has that name.
    pub fn retry_strategy(&self, name: &str) -> Result<Arc<dyn RetryStrategy>, BlockflowError> {
        self.retry_policies
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .map(RetryPolicyConfig::to_strategy)
            .ok_or_else(|| BlockflowError::Config(format!("Retry policy '{name}' is not defined")))
    }
}
