//! # Blockflow
//!
//! Named, composable block pipelines with transient-fault-handling retryers.
//!
//! Blockflow provides:
//!
//! - **Blocks**: async units of work over a typed argument, skippable by policy keys
//! - **Composition**: pipelines assembled at startup, with anchored insertion
//! - **Execution context**: headers, typed policies, diagnostics and abort state per run
//! - **Retry coordination**: named retryers with exponential, fixed and incremental backoff
//! - **Sample blocks**: a payment gateway block and environment initialization
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use blockflow::prelude::*;
//!
//! struct GetGreeting;
//! impl PipelineContract for GetGreeting {
//!     type Arg = String;
//!     const NAME: &'static str = "GetGreeting";
//! }
//!
//! let registry = PipelineConfiguration::new()
//!     .configure_pipeline::<GetGreeting>(|pipeline| {
//!         pipeline.add(HeaderAppendBlock::new("AppendLanguage", "Language"));
//!     })
//!     .build()?;
//!
//! let mut ctx = PipelineExecutionContext::default().with_header("Language", "en");
//! let greeting = registry.run::<GetGreeting>("hello".to_string(), &mut ctx).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod blocks;
pub mod cancellation;
pub mod config;
pub mod context;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod retry;
pub mod testing;

#[cfg(feature = "environment")]
pub mod environment;
#[cfg(feature = "payments")]
pub mod payments;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::blocks::{AsyncFnBlock, Chain, FnBlock, PipelineBlock, PipelineBlockExt};
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{EngineConfig, RetryPolicyConfig};
    pub use crate::context::{
        HeaderBag, MessageSeverity, PipelineExecutionContext, Policy, PolicyKey, RunIdentity,
    };
    pub use crate::errors::{BlockError, BlockflowError, PipelineValidationError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::observability::{init_logging, LoggingConfig};
    pub use crate::pipeline::{
        Pipeline, PipelineBuilder, PipelineConfiguration, PipelineContract, PipelineRegistry,
        PipelineRun, RunStatus,
    };
    pub use crate::retry::{
        ExponentialBackoff, FixedInterval, Incremental, RetryError, RetryStrategy, Retryer,
        RetryerRegistry, TransientErrorClassifier, TransientFaultHandlingBuilder,
    };
}
