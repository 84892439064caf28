//! Composition of blocks whose argument types differ.

use super::PipelineBlock;
use crate::context::{PipelineExecutionContext, PolicyKey};
use crate::errors::BlockError;
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::marker::PhantomData;

/// Two blocks run back to back as one.
///
/// `second` only runs if `first` did not abort the context and its own
/// run predicate allows it. Otherwise the intermediate value is converted
/// with `Into` and returned.
pub struct Chain<A, B, M> {
    name: String,
    first: A,
    second: B,
    _mid: PhantomData<fn() -> M>,
}

impl<A, B, M> Chain<A, B, M> {
    /// Chains `first` into `second`.
    pub fn new<I, O>(first: A, second: B) -> Self
    where
        A: PipelineBlock<I, M>,
        B: PipelineBlock<M, O>,
        I: Send + 'static,
        M: Send + 'static,
        O: Send + 'static,
    {
        let name = format!("{}>{}", first.name(), second.name());
        Self {
            name,
            first,
            second,
            _mid: PhantomData,
        }
    }

    /// Overrides the composed name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<A: Debug, B: Debug, M> Debug for Chain<A, B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("name", &self.name)
            .field("first", &self.first)
            .field("second", &self.second)
            .finish()
    }
}

#[async_trait]
impl<I, M, O, A, B> PipelineBlock<I, O> for Chain<A, B, M>
where
    I: Send + 'static,
    M: Send + Into<O> + 'static,
    O: Send + 'static,
    A: PipelineBlock<I, M>,
    B: PipelineBlock<M, O>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn skip_trigger(&self) -> Option<&PolicyKey> {
        self.first.skip_trigger()
    }

    fn should_run(&self, ctx: &PipelineExecutionContext) -> bool {
        self.first.should_run(ctx)
    }

    async fn run(&self, arg: I, ctx: &mut PipelineExecutionContext) -> Result<O, BlockError> {
        let mid = self.first.run(arg, ctx).await?;
        if ctx.is_aborted() || !self.second.should_run(ctx) {
            return Ok(mid.into());
        }
        self.second.run(mid, ctx).await
    }
}
