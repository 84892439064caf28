//! Block that initializes one artifact set for an environment.

use super::policy::{EnvironmentInitializationPolicy, IGNORE_SAMPLE_DATA};
use crate::blocks::PipelineBlock;
use crate::context::{MessageSeverity, PipelineExecutionContext, PolicyKey};
use crate::errors::BlockError;
use crate::pipeline::Pipeline;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Term key recorded when the clean-context persistence run aborts.
pub const ARTIFACT_SET_PERSIST_ABORTED_TERM_KEY: &str = "ArtifactSetPersistAborted";

/// Argument of the import and persist pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSetArgument {
    /// Environment being initialized.
    pub environment: String,
    /// Artifact set being imported.
    pub artifact_set: String,
    /// Entities produced so far.
    #[serde(default)]
    pub entities: Vec<String>,
}

/// Imports an artifact set when the environment subscribes to it.
///
/// The block is skipped while `IgnoreSampleData` is active. The import
/// pipeline runs on the caller's context with the scoped policy keys added
/// for its duration. The optional persist pipeline runs on a clean fork so
/// that none of those keys leak into it.
pub struct InitializeArtifactSetBlock {
    name: String,
    artifact_set: String,
    trigger: PolicyKey,
    scoped_keys: Vec<PolicyKey>,
    import: Arc<Pipeline<ArtifactSetArgument>>,
    persist: Option<Arc<Pipeline<ArtifactSetArgument>>>,
}

impl fmt::Debug for InitializeArtifactSetBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitializeArtifactSetBlock")
            .field("name", &self.name)
            .field("artifact_set", &self.artifact_set)
            .field("scoped_keys", &self.scoped_keys)
            .field("import", &self.import.name())
            .field("persist", &self.persist.as_ref().map(|p| p.name()))
            .finish()
    }
}

impl InitializeArtifactSetBlock {
    /// Creates a block importing `artifact_set` with `import`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        artifact_set: impl Into<String>,
        import: Arc<Pipeline<ArtifactSetArgument>>,
    ) -> Self {
        Self {
            name: name.into(),
            artifact_set: artifact_set.into(),
            trigger: PolicyKey::new(IGNORE_SAMPLE_DATA),
            scoped_keys: Vec::new(),
            import,
            persist: None,
        }
    }

    /// Activates `keys` while the import pipeline runs.
    #[must_use]
    pub fn with_scoped_policy_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<PolicyKey>,
    {
        self.scoped_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Persists the imported entities with `persist` on a clean context.
    #[must_use]
    pub fn with_persist(mut self, persist: Arc<Pipeline<ArtifactSetArgument>>) -> Self {
        self.persist = Some(persist);
        self
    }

    /// Returns the artifact set this block imports.
    #[must_use]
    pub fn artifact_set(&self) -> &str {
        &self.artifact_set
    }
}

#[async_trait]
impl PipelineBlock<String> for InitializeArtifactSetBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn skip_trigger(&self) -> Option<&PolicyKey> {
        Some(&self.trigger)
    }

    async fn run(
        &self,
        environment: String,
        ctx: &mut PipelineExecutionContext,
    ) -> Result<String, BlockError> {
        if !ctx
            .get_policy::<EnvironmentInitializationPolicy>()
            .subscribes_to(&self.artifact_set)
        {
            return Ok(environment);
        }

        info!(
            block = %self.name,
            artifact_set = %self.artifact_set,
            environment = %environment,
            "Initializing artifact set"
        );

        let argument = ArtifactSetArgument {
            environment: environment.clone(),
            artifact_set: self.artifact_set.clone(),
            entities: Vec::new(),
        };

        ctx.add_policy_keys(self.scoped_keys.iter().cloned());
        let imported = self.import.run(argument, ctx).await;
        ctx.remove_policy_keys(self.scoped_keys.iter().cloned());
        let imported = imported.map_err(|e| BlockError::Unexpected(e.into()))?;

        if ctx.is_aborted() {
            return Ok(environment);
        }

        if let Some(persist) = &self.persist {
            let mut clean = ctx.fork_clean();
            let run = persist
                .execute(imported, &mut clean)
                .await
                .map_err(|e| BlockError::Unexpected(e.into()))?;
            if run.is_aborted() {
                let reason = clean.abort_reason().unwrap_or_default().to_string();
                warn!(
                    block = %self.name,
                    artifact_set = %self.artifact_set,
                    reason = %reason,
                    "Artifact set persistence aborted"
                );
                ctx.add_message(
                    MessageSeverity::Warning,
                    ARTIFACT_SET_PERSIST_ABORTED_TERM_KEY,
                    vec![serde_json::json!(self.artifact_set), serde_json::json!(reason)],
                    format!("{}: persisting artifact set '{}' was aborted.", self.name, self.artifact_set),
                );
            }
        }

        Ok(environment)
    }
}
