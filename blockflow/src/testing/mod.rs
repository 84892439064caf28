//! Testing utilities for blockflow pipelines.
//!
//! This module provides:
//! - Mock blocks that record, abort, fail or stall
//! - A context builder wired to a collecting event sink
//! - Assertions over pipeline runs
//! - A scripted payment gateway (with the `payments` feature)

mod assertions;
mod fixtures;
#[cfg(feature = "payments")]
mod gateway;
mod mocks;

pub use assertions::{
    assert_aborted, assert_completed, assert_executed, assert_has_message, assert_skipped,
};
pub use fixtures::TestContext;
#[cfg(feature = "payments")]
pub use gateway::ScriptedGateway;
pub use mocks::{AbortingBlock, FailingBlock, HeaderAppendBlock, RecordingBlock, SlowBlock};
