//! Pipeline builder with anchor validation.

use super::Pipeline;
use crate::blocks::PipelineBlock;
use crate::errors::{ContractErrorInfo, PipelineValidationError};
use std::fmt;
use std::sync::Arc;

/// A registered block and where it should go.
struct BlockEntry<A> {
    block: Arc<dyn PipelineBlock<A>>,
    anchor: Option<String>,
}

impl<A> Clone for BlockEntry<A> {
    fn clone(&self) -> Self {
        Self {
            block: Arc::clone(&self.block),
            anchor: self.anchor.clone(),
        }
    }
}

/// Builder for composing an ordered pipeline.
///
/// Registration is declarative: `after` anchors are only resolved when
/// [`PipelineBuilder::build`] runs, in registration order.
pub struct PipelineBuilder<A> {
    /// The pipeline name.
    name: String,
    /// Registered blocks, in registration order.
    entries: Vec<BlockEntry<A>>,
}

impl<A> Clone for PipelineBuilder<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl<A: Send + 'static> fmt::Debug for PipelineBuilder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<(&str, Option<&str>)> = self
            .entries
            .iter()
            .map(|e| (e.block.name(), e.anchor.as_deref()))
            .collect();
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("entries", &entries)
            .finish()
    }
}

/// Placement of a block that was just added.
///
/// Dropping it leaves the block appended at the end.
pub struct Placement<'a, A> {
    entry: &'a mut BlockEntry<A>,
}

impl<A> Placement<'_, A> {
    /// Places the block immediately after the first block named `anchor`,
    /// behind any blocks already placed after that anchor or after one of
    /// those blocks.
    pub fn after(self, anchor: impl Into<String>) {
        self.entry.anchor = Some(anchor.into());
    }
}

impl<A: Send + 'static> PipelineBuilder<A> {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Adds a block at the end of the pipeline.
    pub fn add<B>(&mut self, block: B) -> Placement<'_, A>
    where
        B: PipelineBlock<A> + 'static,
    {
        self.add_shared(Arc::new(block))
    }

    /// Adds an already shared block at the end of the pipeline.
    pub fn add_shared(&mut self, block: Arc<dyn PipelineBlock<A>>) -> Placement<'_, A> {
        self.entries.push(BlockEntry {
            block,
            anchor: None,
        });
        let idx = self.entries.len() - 1;
        Placement {
            entry: &mut self.entries[idx],
        }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of registered blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.entries.len()
    }

    /// Resolves anchors and freezes the block order.
    ///
    /// # Errors
    ///
    /// Returns an error if a block has an empty name or an anchor names a
    /// block that was not registered before it.
    pub fn build(self) -> Result<Pipeline<A>, PipelineValidationError> {
        // (block, anchor it was placed after)
        let mut ordered: Vec<(Arc<dyn PipelineBlock<A>>, Option<String>)> =
            Vec::with_capacity(self.entries.len());

        for entry in self.entries {
            let block_name = entry.block.name().to_string();
            if block_name.trim().is_empty() {
                return Err(PipelineValidationError::new(format!(
                    "Pipeline '{}' contains a block without a name",
                    self.name
                ))
                .with_pipeline(&self.name)
                .with_error_info(
                    ContractErrorInfo::new("PIPELINE-BLOCK-UNNAMED", "Blocks must be named")
                        .with_fix_hint("Return a non-empty name from PipelineBlock::name."),
                ));
            }

            let Some(anchor) = entry.anchor else {
                ordered.push((entry.block, None));
                continue;
            };

            let Some(anchor_idx) = ordered.iter().position(|(b, _)| b.name() == anchor) else {
                return Err(PipelineValidationError::new(format!(
                    "Block '{}' in pipeline '{}' is placed after unknown block '{}'",
                    block_name, self.name, anchor
                ))
                .with_pipeline(&self.name)
                .with_blocks(vec![block_name, anchor.clone()])
                .with_error_info(
                    ContractErrorInfo::new(
                        "PIPELINE-ANCHOR-MISSING",
                        format!("Anchor block '{anchor}' not found"),
                    )
                    .with_fix_hint(
                        "Register the anchor block before any block placed after it.",
                    )
                    .with_context_entry("anchor", anchor),
                ));
            };

            // Skip the group already hanging off the anchor, including
            // blocks anchored to members of that group.
            let mut group = vec![anchor.as_str()];
            let mut insert_at = anchor_idx + 1;
            while let Some((block, Some(placed_after))) = ordered.get(insert_at) {
                if !group.contains(&placed_after.as_str()) {
                    break;
                }
                group.push(block.name());
                insert_at += 1;
            }
            ordered.insert(insert_at, (entry.block, Some(anchor)));
        }

        let blocks = ordered.into_iter().map(|(block, _)| block).collect();
        Ok(Pipeline::new(self.name, blocks))
    }
}
