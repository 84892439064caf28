//! Startup registration of pipelines by contract.

use super::{PipelineBuilder, PipelineRegistry};
use crate::errors::{BlockflowError, PipelineValidationError};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Names a pipeline and fixes its argument type.
///
/// Contracts are marker types; extension modules refer to the same contract
/// to add blocks to a pipeline defined elsewhere.
///
/// ```
/// use blockflow::pipeline::PipelineContract;
///
/// struct CreateOrderPipeline;
///
/// impl PipelineContract for CreateOrderPipeline {
///     type Arg = String;
///     const NAME: &'static str = "CreateOrder";
/// }
/// ```
pub trait PipelineContract: 'static {
    /// The argument threaded through the pipeline.
    type Arg: Send + 'static;

    /// The pipeline name used in logs and errors.
    const NAME: &'static str;
}

/// A builder whose argument type has been erased.
trait ErasedBuilder: Send {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn block_count(&self) -> usize;

    fn freeze(self: Box<Self>) -> Result<Arc<dyn Any + Send + Sync>, PipelineValidationError>;
}

impl<A: Send + 'static> ErasedBuilder for PipelineBuilder<A> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn block_count(&self) -> usize {
        PipelineBuilder::block_count(self)
    }

    fn freeze(self: Box<Self>) -> Result<Arc<dyn Any + Send + Sync>, PipelineValidationError> {
        let pipeline = (*self).build()?;
        Ok(Arc::new(pipeline))
    }
}

/// Accumulates pipeline registrations at startup.
///
/// Calls for the same contract extend the same builder, in call order.
#[derive(Default)]
pub struct PipelineConfiguration {
    builders: HashMap<TypeId, (&'static str, Box<dyn ErasedBuilder>)>,
    /// Contract registration order, for deterministic validation.
    order: Vec<TypeId>,
}

impl fmt::Debug for PipelineConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pipelines: Vec<(&str, usize)> = self
            .order
            .iter()
            .filter_map(|id| self.builders.get(id))
            .map(|(name, builder)| (*name, builder.block_count()))
            .collect();
        f.debug_struct("PipelineConfiguration")
            .field("pipelines", &pipelines)
            .finish()
    }
}

impl PipelineConfiguration {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or extends the pipeline for contract `P`.
    #[must_use]
    pub fn configure_pipeline<P: PipelineContract>(
        mut self,
        configure: impl FnOnce(&mut PipelineBuilder<P::Arg>),
    ) -> Self {
        let id = TypeId::of::<P>();
        if !self.builders.contains_key(&id) {
            self.order.push(id);
        }
        let (_, builder) = self.builders.entry(id).or_insert_with(|| {
            let builder: Box<dyn ErasedBuilder> =
                Box::new(PipelineBuilder::<P::Arg>::new(P::NAME));
            (P::NAME, builder)
        });
        if let Some(builder) = builder.as_any_mut().downcast_mut::<PipelineBuilder<P::Arg>>() {
            configure(builder);
        }
        self
    }

    /// Returns true if contract `P` has been configured.
    #[must_use]
    pub fn is_configured<P: PipelineContract>(&self) -> bool {
        self.builders.contains_key(&TypeId::of::<P>())
    }

    /// Returns the number of configured pipelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    /// Returns true if nothing was configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Validates every pipeline and freezes them into a registry.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, in contract registration order.
    pub fn build(mut self) -> Result<PipelineRegistry, BlockflowError> {
        let mut registry = PipelineRegistry::default();
        for id in self.order {
            let Some((name, builder)) = self.builders.remove(&id) else {
                continue;
            };
            let blocks = builder.block_count();
            let pipeline = builder.freeze()?;
            debug!(pipeline = name, blocks, "Pipeline configured");
            registry.insert(id, name, pipeline);
        }
        Ok(registry)
    }
}
