//! Pipeline composition and execution.
//!
//! This module provides:
//! - A builder with `after` placement resolved when the pipeline is built
//! - Contract-keyed startup configuration
//! - The sequential executor and its run result
//! - A registry resolving pipelines by contract

mod builder;
mod configuration;
mod executor;
mod registry;

pub use builder::{PipelineBuilder, Placement};
pub use configuration::{PipelineConfiguration, PipelineContract};
pub use executor::{Pipeline, PipelineRun, RunStatus};
pub use registry::PipelineRegistry;
