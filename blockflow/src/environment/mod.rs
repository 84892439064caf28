//! Environment initialization blocks.

mod artifact_set;
mod policy;

pub use artifact_set::{
    ArtifactSetArgument, InitializeArtifactSetBlock, ARTIFACT_SET_PERSIST_ABORTED_TERM_KEY,
};
pub use policy::{EnvironmentInitializationPolicy, IGNORE_LOCALIZE_ENTITY, IGNORE_SAMPLE_DATA};
