//! Transient fault handling.
//!
//! This module provides:
//! - Backoff strategies (exponential with jitter, fixed, incremental)
//! - Transient error classifiers
//! - Named retryers and the registry they are resolved from

mod classifier;
mod registry;
mod retryer;
mod strategy;

pub use classifier::{TransientErrorClassifier, CONNECTIVITY_IO_KINDS};
pub use registry::{RetryerRegistry, TransientFaultHandlingBuilder};
pub use retryer::{RetryError, Retryer};
pub use strategy::{
    ExponentialBackoff, FixedInterval, Incremental, RetryStrategy, DEFAULT_JITTER_RATIO,
};
