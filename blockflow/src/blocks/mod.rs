//! Block trait and implementations.
//!
//! Blocks are the units of work a pipeline runs in order. Each receives the
//! current argument and the run's context and returns the argument handed
//! to the next block.

mod chain;
mod function;

pub use chain::Chain;
pub use function::{AsyncFnBlock, FnBlock};

use crate::context::{PipelineExecutionContext, PolicyKey};
use crate::errors::BlockError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for pipeline blocks.
///
/// A block is built once, shared behind `Arc` and reused across runs. It
/// keeps no state between calls other than its injected collaborators.
#[async_trait]
pub trait PipelineBlock<I, O = I>: Send + Sync + Debug
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Returns the name of the block.
    ///
    /// Names are used in logs and as anchors for `after` placement.
    fn name(&self) -> &str;

    /// Returns the policy key that, when active, skips this block.
    fn skip_trigger(&self) -> Option<&PolicyKey> {
        None
    }

    /// Decides whether the block runs for this context.
    ///
    /// The default skips the block when its trigger is an active policy key.
    fn should_run(&self, ctx: &PipelineExecutionContext) -> bool {
        self.skip_trigger()
            .map_or(true, |trigger| !ctx.has_policy_key(trigger))
    }

    /// Runs the block.
    ///
    /// # Errors
    ///
    /// Returns a [`BlockError`] for faults the block does not turn into a
    /// context abort. The executor reports them as a faulted run.
    async fn run(&self, arg: I, ctx: &mut PipelineExecutionContext) -> Result<O, BlockError>;
}

/// Extension methods for composing blocks.
pub trait PipelineBlockExt<I, M>: PipelineBlock<I, M> + Sized
where
    I: Send + 'static,
    M: Send + 'static,
{
    /// Feeds this block's output into `next`.
    fn then<B, O>(self, next: B) -> Chain<Self, B, M>
    where
        B: PipelineBlock<M, O>,
        O: Send + 'static,
        M: Into<O>,
    {
        Chain::<Self, B, M>::new::<I, O>(self, next)
    }
}

impl<T, I, M> PipelineBlockExt<I, M> for T
where
    T: PipelineBlock<I, M>,
    I: Send + 'static,
    M: Send + 'static,
{
}

/// A block that returns its argument unchanged.
#[derive(Debug, Clone)]
pub struct NoOpBlock {
    name: String,
}

impl NoOpBlock {
    /// Creates a new no-op block.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl<A: Send + 'static> PipelineBlock<A> for NoOpBlock {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, arg: A, _ctx: &mut PipelineExecutionContext) -> Result<A, BlockError> {
        Ok(arg)
    }
}
