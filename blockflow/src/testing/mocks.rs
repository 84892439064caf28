//! Mock blocks for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::time::Duration;

use crate::blocks::PipelineBlock;
use crate::context::{PipelineExecutionContext, PolicyKey};
use crate::errors::BlockError;

/// A block that records every argument it sees and passes it on unchanged.
#[derive(Debug)]
pub struct RecordingBlock<A> {
    name: String,
    trigger: Option<PolicyKey>,
    seen: Mutex<Vec<A>>,
}

impl<A> RecordingBlock<A> {
    /// Creates a new recording block.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trigger: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Skips the block while `key` is active.
    #[must_use]
    pub fn with_skip_trigger(mut self, key: impl Into<PolicyKey>) -> Self {
        self.trigger = Some(key.into());
        self
    }

    /// Returns the number of times the block ran.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.seen.lock().len()
    }

    /// Clears recorded arguments.
    pub fn clear(&self) {
        self.seen.lock().clear();
    }
}

impl<A: Clone> RecordingBlock<A> {
    /// Returns the recorded arguments in call order.
    #[must_use]
    pub fn recorded(&self) -> Vec<A> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl<A> PipelineBlock<A> for RecordingBlock<A>
where
    A: Clone + Debug + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn skip_trigger(&self) -> Option<&PolicyKey> {
        self.trigger.as_ref()
    }

    async fn run(&self, arg: A, _ctx: &mut PipelineExecutionContext) -> Result<A, BlockError> {
        self.seen.lock().push(arg.clone());
        Ok(arg)
    }
}

/// Appends `:<header value>` to a string argument.
///
/// A missing header appends nothing.
#[derive(Debug, Clone)]
pub struct HeaderAppendBlock {
    name: String,
    header: String,
}

impl HeaderAppendBlock {
    /// Creates a block reading `header`.
    #[must_use]
    pub fn new(name: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: header.into(),
        }
    }
}

#[async_trait]
impl PipelineBlock<String> for HeaderAppendBlock {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        mut arg: String,
        ctx: &mut PipelineExecutionContext,
    ) -> Result<String, BlockError> {
        if let Some(value) = ctx.header(&self.header) {
            arg.push(':');
            arg.push_str(value);
        }
        Ok(arg)
    }
}

/// A block that aborts the context and passes its argument through.
#[derive(Debug, Clone)]
pub struct AbortingBlock {
    name: String,
    reason: String,
}

impl AbortingBlock {
    /// Creates a block aborting with `reason`.
    #[must_use]
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl<A: Send + 'static> PipelineBlock<A> for AbortingBlock {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, arg: A, ctx: &mut PipelineExecutionContext) -> Result<A, BlockError> {
        ctx.abort(self.reason.clone());
        Ok(arg)
    }
}

/// A block that always raises an error.
#[derive(Debug, Clone)]
pub struct FailingBlock {
    name: String,
    error: String,
}

impl FailingBlock {
    /// Creates a failing block.
    #[must_use]
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
        }
    }
}

#[async_trait]
impl<A: Send + 'static> PipelineBlock<A> for FailingBlock {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _arg: A, _ctx: &mut PipelineExecutionContext) -> Result<A, BlockError> {
        Err(BlockError::failed(self.error.clone()))
    }
}

/// A block that waits before passing its argument through.
///
/// The wait ends early when the run is cancelled.
#[derive(Debug, Clone)]
pub struct SlowBlock {
    name: String,
    delay: Duration,
}

impl SlowBlock {
    /// Creates a new slow block.
    #[must_use]
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
        }
    }

    /// Creates a slow block with delay in milliseconds.
    #[must_use]
    pub fn with_delay_ms(name: impl Into<String>, ms: u64) -> Self {
        Self::new(name, Duration::from_millis(ms))
    }
}

#[async_trait]
impl<A: Send + 'static> PipelineBlock<A> for SlowBlock {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, arg: A, ctx: &mut PipelineExecutionContext) -> Result<A, BlockError> {
        let token = ctx.cancellation().clone();
        tokio::select! {
            () = tokio::time::sleep(self.delay) => Ok(arg),
            () = token.cancelled() => Err(BlockError::failed(format!("{} cancelled", self.name))),
        }
    }
}
