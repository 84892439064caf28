//! Error types for the blockflow engine.
//!
//! Configuration problems (unknown anchors, missing retryers, bad retry
//! policies) are reported when pipelines and registries are built. Runtime
//! failures are either converted into a context abort by the block that hit
//! them, or surface from the executor as [`BlockflowError::BlockFailed`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for blockflow operations.
#[derive(Debug, Error)]
pub enum BlockflowError {
    /// A pipeline failed validation while being composed.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// A block asked for a retryer that was never registered.
    #[error("Retryer with name '{name}' is not registered")]
    RetryerNotRegistered {
        /// The requested retryer name.
        name: String,
    },

    /// A retry policy or retryer registration is invalid.
    #[error("Invalid retry configuration for '{name}': {reason}")]
    RetryConfiguration {
        /// The retryer or strategy name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No pipeline was configured for the requested contract.
    #[error("Pipeline '{0}' is not configured")]
    PipelineNotConfigured(String),

    /// A block raised an error the executor does not handle.
    #[error("Block '{block}' in pipeline '{pipeline}' failed: {source}")]
    BlockFailed {
        /// The pipeline being executed.
        pipeline: String,
        /// The failing block.
        block: String,
        /// The underlying block error.
        #[source]
        source: BlockError,
    },

    /// Engine configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlockflowError {
    /// Returns true for errors that must stop the process from serving.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::RetryerNotRegistered { .. }
                | Self::RetryConfiguration { .. }
                | Self::PipelineNotConfigured(_)
                | Self::Config(_)
        )
    }
}

/// Error raised from a block body.
///
/// Expected business failures should not use this type; blocks report those
/// by aborting the context with a diagnostic message instead.
#[derive(Debug, Error)]
pub enum BlockError {
    /// The block failed with a plain message.
    #[error("{0}")]
    Failed(String),

    /// The block hit an unexpected fault.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl BlockError {
    /// Creates a failure with a message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Metadata about a composition error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "PIPELINE-ANCHOR-MISSING").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when pipeline composition fails validation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The pipeline being composed.
    pub pipeline: Option<String>,
    /// The blocks involved in the error.
    pub blocks: Vec<String>,
    /// Optional contract error info.
    pub error_info: Option<ContractErrorInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            pipeline: None,
            blocks: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the pipeline name.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: impl Into<String>) -> Self {
        self.pipeline = Some(pipeline.into());
        self
    }

    /// Sets the blocks involved.
    #[must_use]
    pub fn with_blocks(mut self, blocks: Vec<String>) -> Self {
        self.blocks = blocks;
        self
    }

    /// Sets the contract error info.
    #[must_use]
    pub fn with_error_info(mut self, info: ContractErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }

    /// Returns the error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error_info.as_ref().map(|info| info.code.as_str())
    }
}
