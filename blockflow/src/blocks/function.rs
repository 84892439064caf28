//! Closure-backed blocks.

use super::PipelineBlock;
use crate::context::{PipelineExecutionContext, PolicyKey};
use crate::errors::BlockError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt::{self, Debug};
use std::marker::PhantomData;

/// A block backed by a synchronous function.
pub struct FnBlock<I, O, F> {
    name: String,
    trigger: Option<PolicyKey>,
    func: F,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O, F> FnBlock<I, O, F>
where
    F: Fn(I, &mut PipelineExecutionContext) -> Result<O, BlockError> + Send + Sync,
{
    /// Creates a new function-based block.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            trigger: None,
            func,
            _types: PhantomData,
        }
    }

    /// Skips the block while `key` is an active policy key.
    #[must_use]
    pub fn with_skip_trigger(mut self, key: impl Into<PolicyKey>) -> Self {
        self.trigger = Some(key.into());
        self
    }
}

impl<I, O, F> Debug for FnBlock<I, O, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnBlock")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .finish()
    }
}

#[async_trait]
impl<I, O, F> PipelineBlock<I, O> for FnBlock<I, O, F>
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(I, &mut PipelineExecutionContext) -> Result<O, BlockError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn skip_trigger(&self) -> Option<&PolicyKey> {
        self.trigger.as_ref()
    }

    async fn run(&self, arg: I, ctx: &mut PipelineExecutionContext) -> Result<O, BlockError> {
        (self.func)(arg, ctx)
    }
}

/// A block backed by an async function.
///
/// The function returns a boxed future borrowing the context:
///
/// ```
/// use blockflow::blocks::AsyncFnBlock;
///
/// let block = AsyncFnBlock::new("double", |n: u32, _ctx| Box::pin(async move { Ok(n * 2) }));
/// ```
pub struct AsyncFnBlock<I, O, F> {
    name: String,
    trigger: Option<PolicyKey>,
    func: F,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O, F> AsyncFnBlock<I, O, F>
where
    F: for<'a> Fn(I, &'a mut PipelineExecutionContext) -> BoxFuture<'a, Result<O, BlockError>>
        + Send
        + Sync,
{
    /// Creates a new async function-based block.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            trigger: None,
            func,
            _types: PhantomData,
        }
    }

    /// Skips the block while `key` is an active policy key.
    #[must_use]
    pub fn with_skip_trigger(mut self, key: impl Into<PolicyKey>) -> Self {
        self.trigger = Some(key.into());
        self
    }
}

impl<I, O, F> Debug for AsyncFnBlock<I, O, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFnBlock")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .finish()
    }
}

#[async_trait]
impl<I, O, F> PipelineBlock<I, O> for AsyncFnBlock<I, O, F>
where
    I: Send + 'static,
    O: Send + 'static,
    F: for<'a> Fn(I, &'a mut PipelineExecutionContext) -> BoxFuture<'a, Result<O, BlockError>>
        + Send
        + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn skip_trigger(&self) -> Option<&PolicyKey> {
        self.trigger.as_ref()
    }

    async fn run(&self, arg: I, ctx: &mut PipelineExecutionContext) -> Result<O, BlockError> {
        (self.func)(arg, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_block() {
        let block = FnBlock::new("upper", |s: String, _ctx: &mut PipelineExecutionContext| {
            Ok(s.to_uppercase())
        });
        let mut ctx = PipelineExecutionContext::default();

        assert_eq!(block.name(), "upper");
        assert_eq!(block.run("abc".to_string(), &mut ctx).await.unwrap(), "ABC");
    }

    #[tokio::test]
    async fn test_async_fn_block_writes_context() {
        let block = AsyncFnBlock::new("mark", |n: u32, ctx: &mut PipelineExecutionContext| {
            Box::pin(async move {
                ctx.set_header("seen", n.to_string());
                Ok(n + 1)
            })
        });
        let mut ctx = PipelineExecutionContext::default();

        assert_eq!(block.run(1, &mut ctx).await.unwrap(), 2);
        assert_eq!(ctx.header("seen"), Some("1"));
    }

    #[test]
    fn test_skip_trigger_is_case_insensitive() {
        let block = FnBlock::new("b", |n: u32, _ctx: &mut PipelineExecutionContext| Ok(n))
            .with_skip_trigger("SkipMe");
        let mut ctx = PipelineExecutionContext::default();
        assert!(block.should_run(&ctx));

        ctx.add_policy_keys(["skipme"]);
        assert!(!block.should_run(&ctx));
    }
}
