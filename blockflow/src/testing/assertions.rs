//! Test assertions for pipeline runs.

use crate::context::PipelineExecutionContext;
use crate::pipeline::{PipelineRun, RunStatus};

/// Asserts that the run completed without an abort.
pub fn assert_completed<A>(run: &PipelineRun<A>) {
    assert_eq!(
        run.status,
        RunStatus::Completed,
        "Expected completed run, executed: {:?}",
        run.executed
    );
}

/// Asserts that the run was aborted.
pub fn assert_aborted<A>(run: &PipelineRun<A>) {
    assert_eq!(
        run.status,
        RunStatus::Aborted,
        "Expected aborted run, executed: {:?}",
        run.executed
    );
}

/// Asserts the exact sequence of blocks whose body ran.
pub fn assert_executed<A>(run: &PipelineRun<A>, expected: &[&str]) {
    let actual: Vec<&str> = run.executed.iter().map(String::as_str).collect();
    assert_eq!(actual, expected, "Unexpected executed blocks");
}

/// Asserts the exact sequence of skipped blocks.
pub fn assert_skipped<A>(run: &PipelineRun<A>, expected: &[&str]) {
    let actual: Vec<&str> = run.skipped.iter().map(String::as_str).collect();
    assert_eq!(actual, expected, "Unexpected skipped blocks");
}

/// Asserts that the context recorded a message with `term_key`.
pub fn assert_has_message(ctx: &PipelineExecutionContext, term_key: &str) {
    assert!(
        ctx.has_message(term_key),
        "Expected message '{}', got: {:?}",
        term_key,
        ctx.messages().iter().map(|m| m.term_key.as_str()).collect::<Vec<_>>()
    );
}
