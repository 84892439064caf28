//! Frozen pipelines resolved by contract.

use super::{Pipeline, PipelineContract, PipelineRun};
use crate::context::PipelineExecutionContext;
use crate::errors::BlockflowError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Immutable set of validated pipelines.
///
/// Built once by [`super::PipelineConfiguration::build`]; lookups need no
/// locking.
#[derive(Default, Clone)]
pub struct PipelineRegistry {
    pipelines: HashMap<TypeId, (&'static str, Arc<dyn Any + Send + Sync>)>,
}

impl fmt::Debug for PipelineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineRegistry")
            .field("pipelines", &self.names())
            .finish()
    }
}

impl PipelineRegistry {
    pub(crate) fn insert(
        &mut self,
        id: TypeId,
        name: &'static str,
        pipeline: Arc<dyn Any + Send + Sync>,
    ) {
        self.pipelines.insert(id, (name, pipeline));
    }

    /// Returns the pipeline for contract `P`.
    ///
    /// # Errors
    ///
    /// Returns [`BlockflowError::PipelineNotConfigured`] if `P` was never
    /// configured.
    pub fn pipeline<P: PipelineContract>(&self) -> Result<Arc<Pipeline<P::Arg>>, BlockflowError> {
        self.pipelines
            .get(&TypeId::of::<P>())
            .and_then(|(_, pipeline)| Arc::clone(pipeline).downcast::<Pipeline<P::Arg>>().ok())
            .ok_or_else(|| BlockflowError::PipelineNotConfigured(P::NAME.to_string()))
    }

    /// Resolves and executes the pipeline for contract `P`.
    ///
    /// # Errors
    ///
    /// Returns an error if `P` is not configured or a block fails.
    pub async fn execute<P: PipelineContract>(
        &self,
        arg: P::Arg,
        ctx: &mut PipelineExecutionContext,
    ) -> Result<PipelineRun<P::Arg>, BlockflowError> {
        let pipeline = self.pipeline::<P>()?;
        pipeline.execute(arg, ctx).await
    }

    /// Resolves and runs the pipeline for contract `P`, returning the
    /// final argument.
    ///
    /// # Errors
    ///
    /// Returns an error if `P` is not configured or a block fails.
    pub async fn run<P: PipelineContract>(
        &self,
        arg: P::Arg,
        ctx: &mut PipelineExecutionContext,
    ) -> Result<P::Arg, BlockflowError> {
        let pipeline = self.pipeline::<P>()?;
        pipeline.run(arg, ctx).await
    }

    /// Returns the configured pipeline names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.pipelines.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of pipelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Returns true if no pipelines are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::NoOpBlock;
    use crate::pipeline::PipelineConfiguration;

    struct Known;

    impl PipelineContract for Known {
        type Arg = u8;
        const NAME: &'static str = "Known";
    }

    struct Unknown;

    impl PipelineContract for Unknown {
        type Arg = u8;
        const NAME: &'static str = "Unknown";
    }

    #[tokio::test]
    async fn test_run_by_contract() {
        let registry = PipelineConfiguration::new()
            .configure_pipeline::<Known>(|b| {
                b.add(NoOpBlock::new("noop"));
            })
            .build()
            .unwrap();
        let mut ctx = PipelineExecutionContext::default();

        assert_eq!(registry.names(), vec!["Known"]);
        assert_eq!(registry.run::<Known>(9, &mut ctx).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_unknown_contract() {
        let registry = PipelineRegistry::default();
        let mut ctx = PipelineExecutionContext::default();

        let err = registry.run::<Unknown>(1, &mut ctx).await.unwrap_err();
        assert!(matches!(err, BlockflowError::PipelineNotConfigured(name) if name == "Unknown"));
        assert!(registry.is_empty());
    }
}
