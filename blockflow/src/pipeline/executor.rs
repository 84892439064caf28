//! Sequential pipeline execution.

use crate::blocks::PipelineBlock;
use crate::context::PipelineExecutionContext;
use crate::errors::BlockflowError;
use crate::events::EventKind;
use crate::observability::SpanTimer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Terminal state of a run that did not fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every block ran or was skipped.
    Completed,
    /// A block aborted the context.
    Aborted,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Result of executing a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineRun<A> {
    /// The argument as returned by the last block that ran.
    pub value: A,
    /// How the run ended.
    pub status: RunStatus,
    /// Blocks whose body ran, in order.
    pub executed: Vec<String>,
    /// Blocks skipped by their run predicate, in order.
    pub skipped: Vec<String>,
    /// Total execution time in milliseconds.
    pub duration_ms: f64,
}

impl<A> PipelineRun<A> {
    /// Returns true if the run was aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.status == RunStatus::Aborted
    }

    /// Consumes the run and returns the argument.
    #[must_use]
    pub fn into_value(self) -> A {
        self.value
    }
}

/// A named, frozen sequence of blocks.
///
/// Pipelines are immutable and can be run concurrently; each run brings
/// its own context.
pub struct Pipeline<A> {
    name: String,
    blocks: Vec<Arc<dyn PipelineBlock<A>>>,
}

impl<A> Clone for Pipeline<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            blocks: self.blocks.clone(),
        }
    }
}

impl<A: Send + 'static> fmt::Debug for Pipeline<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.blocks.iter().map(|b| b.name()).collect();
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("blocks", &names)
            .finish()
    }
}

impl<A: Send + 'static> Pipeline<A> {
    pub(crate) fn new(name: String, blocks: Vec<Arc<dyn PipelineBlock<A>>>) -> Self {
        Self { name, blocks }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if the pipeline has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns the block names in execution order.
    #[must_use]
    pub fn block_names(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.name()).collect()
    }

    /// Runs the blocks in order against `ctx`.
    ///
    /// Blocks whose run predicate declines are skipped with the argument
    /// unchanged. The run stops as soon as the context is aborted and
    /// returns the argument as of the aborting block.
    ///
    /// # Errors
    ///
    /// Returns [`BlockflowError::BlockFailed`] if a block raises an error.
    pub async fn execute(
        &self,
        arg: A,
        ctx: &mut PipelineExecutionContext,
    ) -> Result<PipelineRun<A>, BlockflowError> {
        let timer = SpanTimer::start(&self.name);
        let correlation_id = ctx.identity().correlation_id;
        let mut executed = Vec::new();
        let mut skipped = Vec::new();
        let mut value = arg;

        debug!(
            pipeline = %self.name,
            correlation_id = %correlation_id,
            blocks = self.blocks.len(),
            "Pipeline started"
        );
        ctx.try_emit_event(EventKind::PipelineStarted, &self.name, None, None);

        for block in &self.blocks {
            if ctx.is_aborted() {
                break;
            }

            let block_name = block.name();
            if !block.should_run(ctx) {
                debug!(pipeline = %self.name, block = %block_name, "Block skipped");
                ctx.try_emit_event(EventKind::BlockSkipped, &self.name, Some(block_name), None);
                skipped.push(block_name.to_string());
                continue;
            }

            value = match block.run(value, ctx).await {
                Ok(next) => next,
                Err(source) => {
                    error!(
                        pipeline = %self.name,
                        block = %block_name,
                        correlation_id = %correlation_id,
                        error = %source,
                        "Block failed"
                    );
                    ctx.try_emit_event(
                        EventKind::PipelineFaulted,
                        &self.name,
                        Some(block_name),
                        Some(serde_json::json!({ "error": source.to_string() })),
                    );
                    return Err(BlockflowError::BlockFailed {
                        pipeline: self.name.clone(),
                        block: block_name.to_string(),
                        source,
                    });
                }
            };
            executed.push(block_name.to_string());
            ctx.try_emit_event(EventKind::BlockCompleted, &self.name, Some(block_name), None);
        }

        let duration_ms = timer.finish();
        let status = if ctx.is_aborted() {
            info!(
                pipeline = %self.name,
                correlation_id = %correlation_id,
                reason = ctx.abort_reason().unwrap_or_default(),
                duration_ms,
                "Pipeline aborted"
            );
            ctx.try_emit_event(
                EventKind::PipelineAborted,
                &self.name,
                executed.last().map(String::as_str),
                ctx.abort_reason()
                    .map(|reason| serde_json::json!({ "reason": reason })),
            );
            RunStatus::Aborted
        } else {
            debug!(
                pipeline = %self.name,
                correlation_id = %correlation_id,
                executed = executed.len(),
                skipped = skipped.len(),
                duration_ms,
                "Pipeline completed"
            );
            ctx.try_emit_event(EventKind::PipelineCompleted, &self.name, None, None);
            RunStatus::Completed
        };

        Ok(PipelineRun {
            value,
            status,
            executed,
            skipped,
            duration_ms,
        })
    }

    /// Runs the pipeline and returns only the final argument.
    ///
    /// # Errors
    ///
    /// Returns [`BlockflowError::BlockFailed`] if a block raises an error.
    pub async fn run(
        &self,
        arg: A,
        ctx: &mut PipelineExecutionContext,
    ) -> Result<A, BlockflowError> {
        self.execute(arg, ctx).await.map(PipelineRun::into_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::FnBlock;
    use crate::errors::BlockError;
    use crate::events::CollectingEventSink;
    use crate::pipeline::PipelineBuilder;

    fn add(name: &'static str, n: u32) -> FnBlock<u32, u32, impl Fn(u32, &mut PipelineExecutionContext) -> Result<u32, BlockError> + Send + Sync> {
        FnBlock::new(name, move |v: u32, _ctx: &mut PipelineExecutionContext| Ok(v + n))
    }

    #[tokio::test]
    async fn test_threads_argument_through_blocks() {
        let mut builder = PipelineBuilder::new("sum");
        builder.add(add("one", 1));
        builder.add(add("ten", 10));
        let pipeline = builder.build().unwrap();
        let mut ctx = PipelineExecutionContext::default();

        let run = pipeline.execute(5, &mut ctx).await.unwrap();
        assert_eq!(run.value, 16);
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.executed, vec!["one", "ten"]);
        assert!(run.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_abort_stops_the_run() {
        let mut builder = PipelineBuilder::new("abort");
        builder.add(add("one", 1));
        builder.add(FnBlock::new("stop", |v: u32, ctx: &mut PipelineExecutionContext| {
            ctx.abort("enough");
            Ok(v * 2)
        }));
        builder.add(add("never", 100));
        let pipeline = builder.build().unwrap();
        let sink = Arc::new(CollectingEventSink::new());
        let mut ctx = PipelineExecutionContext::default().with_event_sink(sink.clone());

        let run = pipeline.execute(1, &mut ctx).await.unwrap();
        assert_eq!(run.value, 4);
        assert!(run.is_aborted());
        assert_eq!(run.executed, vec!["one", "stop"]);
        assert_eq!(
            sink.kinds(),
            vec![
                "pipeline.started",
                "block.completed",
                "block.completed",
                "pipeline.aborted"
            ]
        );
    }

    #[tokio::test]
    async fn test_block_error_faults_the_run() {
        let mut builder = PipelineBuilder::new("faulty");
        builder.add(FnBlock::new("boom", |_v: u32, _ctx: &mut PipelineExecutionContext| {
            Err(BlockError::failed("boom"))
        }));
        builder.add(add("never", 1));
        let pipeline = builder.build().unwrap();
        let mut ctx = PipelineExecutionContext::default();

        let err = pipeline.run(0, &mut ctx).await.unwrap_err();
        match err {
            BlockflowError::BlockFailed { pipeline, block, .. } => {
                assert_eq!(pipeline, "faulty");
                assert_eq!(block, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_pre_aborted_context_runs_nothing() {
        let mut builder = PipelineBuilder::new("idle");
        builder.add(add("one", 1));
        let pipeline = builder.build().unwrap();
        let mut ctx = PipelineExecutionContext::default();
        ctx.abort("earlier");

        let run = pipeline.execute(3, &mut ctx).await.unwrap();
        assert_eq!(run.value, 3);
        assert!(run.is_aborted());
        assert!(run.executed.is_empty());
    }

    #[test]
    fn test_run_status_display() {
        assert_eq!(RunStatus::Completed.to_string(), "completed");
        assert_eq!(RunStatus::Aborted.to_string(), "aborted");
    }
}
