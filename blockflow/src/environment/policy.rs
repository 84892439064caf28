//! Environment initialization policy and well-known policy keys.

use crate::context::Policy;
use serde::{Deserialize, Serialize};

/// Policy key that turns off sample data initialization.
pub const IGNORE_SAMPLE_DATA: &str = "IgnoreSampleData";

/// Policy key that turns off entity localization while importing.
pub const IGNORE_LOCALIZE_ENTITY: &str = "IgnoreLocalizeEntity";

/// Which artifact sets an environment initializes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInitializationPolicy {
    /// Subscribed artifact sets (e.g. "Environment.Shops.Catalog-1.0").
    #[serde(default)]
    pub initial_artifact_sets: Vec<String>,
}

impl Policy for EnvironmentInitializationPolicy {
    fn policy_name() -> &'static str {
        "EnvironmentInitializationPolicy"
    }
}

impl EnvironmentInitializationPolicy {
    /// Creates a policy subscribing to `sets`.
    #[must_use]
    pub fn new<I, S>(sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            initial_artifact_sets: sets.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the environment subscribed to `artifact_set`.
    #[must_use]
    pub fn subscribes_to(&self, artifact_set: &str) -> bool {
        self.initial_artifact_sets.iter().any(|s| s == artifact_set)
    }
}
