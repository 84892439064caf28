//! Per-run execution context.
//!
//! This module provides:
//! - The run identity used to correlate logs and events
//! - Case-insensitive headers carrying the active policy keys
//! - A typed policy map
//! - Diagnostic messages and the abort flag

#[cfg(test)]
mod context_tests;
mod execution;
mod headers;
mod identity;
mod messages;
mod policies;

pub use execution::PipelineExecutionContext;
pub use headers::{HeaderBag, PolicyKey, POLICY_KEYS_HEADER};
pub use identity::RunIdentity;
pub use messages::{CommandMessage, MessageSeverity};
pub use policies::{Policy, PolicySet};
