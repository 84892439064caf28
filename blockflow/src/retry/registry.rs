//! Named retryer registration and lookup.

use super::{RetryStrategy, Retryer, TransientErrorClassifier};
use crate::errors::BlockflowError;
use std::collections::HashMap;
use std::sync::Arc;

/// Collects retryer registrations at startup.
///
/// Registrations are checked in order by [`build`](Self::build), which
/// stops at the first duplicate name or unusable strategy.
#[derive(Debug, Default)]
pub struct TransientFaultHandlingBuilder {
    retryers: Vec<Retryer>,
}

impl TransientFaultHandlingBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a retryer under `name`.
    #[must_use]
    pub fn add_retryer(
        mut self,
        name: impl Into<String>,
        classifier: TransientErrorClassifier,
        strategy: impl RetryStrategy + 'static,
    ) -> Self {
        self.retryers
            .push(Retryer::new(name, classifier, Arc::new(strategy)));
        self
    }

    /// Registers a retryer with a shared strategy.
    #[must_use]
    pub fn add_shared_retryer(
        mut self,
        name: impl Into<String>,
        classifier: TransientErrorClassifier,
        strategy: Arc<dyn RetryStrategy>,
    ) -> Self {
        self.retryers.push(Retryer::new(name, classifier, strategy));
        self
    }

    /// Returns the number of registrations so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.retryers.len()
    }

    /// Returns true if nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.retryers.is_empty()
    }

    /// Validates the registrations and freezes them into a registry.
    ///
    /// # Errors
    ///
    /// Returns [`BlockflowError::RetryConfiguration`] for a duplicate name or
    /// a strategy that fails validation.
    pub fn build(self) -> Result<RetryerRegistry, BlockflowError> {
        let mut retryers = HashMap::with_capacity(self.retryers.len());

        for retryer in self.retryers {
            let name = retryer.name().to_string();
            if name.trim().is_empty() {
                return Err(BlockflowError::RetryConfiguration {
                    name,
                    reason: "retryer name cannot be empty".to_string(),
                });
            }
            retryer
                .strategy()
                .validate()
                .map_err(|reason| BlockflowError::RetryConfiguration {
                    name: name.clone(),
                    reason,
                })?;
            if retryers.contains_key(&name) {
                return Err(BlockflowError::RetryConfiguration {
                    name,
                    reason: "a retryer with this name is already registered".to_string(),
                });
            }
            tracing::debug!(
                retryer = %name,
                strategy = %retryer.strategy().name(),
                max_attempts = retryer.strategy().max_attempts(),
                "Registered retryer"
            );
            retryers.insert(name, Arc::new(retryer));
        }

        Ok(RetryerRegistry { retryers })
    }
}

/// Immutable lookup of retryers by name.
///
/// Built once at startup; lookups need no locking.
#[derive(Debug, Clone, Default)]
pub struct RetryerRegistry {
    retryers: HashMap<String, Arc<Retryer>>,
}

impl RetryerRegistry {
    /// Looks up a retryer by name.
    #[must_use]
    pub fn try_get(&self, name: &str) -> Option<Arc<Retryer>> {
        self.retryers.get(name).cloned()
    }

    /// Looks up a retryer by name, failing if it is not registered.
    ///
    /// # Errors
    ///
    /// Returns [`BlockflowError::RetryerNotRegistered`].
    pub fn get(&self, name: &str) -> Result<Arc<Retryer>, BlockflowError> {
        self.try_get(name)
            .ok_or_else(|| BlockflowError::RetryerNotRegistered {
                name: name.to_string(),
            })
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.retryers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered retryers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.retryers.len()
    }

    /// Returns true if no retryer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.retryers.is_empty()
    }
}
