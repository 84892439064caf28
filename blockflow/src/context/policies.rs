//! Typed policy storage.
//!
//! Policies are plain configuration objects looked up by type. A context
//! holds at most one instance per policy type; asking for a policy that was
//! never set yields its default.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Marker for types that can be stored in a [`PolicySet`].
pub trait Policy: Any + Send + Sync + Default + Clone {
    /// Returns the policy name used in diagnostics.
    fn policy_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A type-tagged map of policies.
///
/// Cloning is shallow: policy instances are shared behind `Arc`.
#[derive(Clone, Default)]
pub struct PolicySet {
    policies: HashMap<TypeId, (&'static str, Arc<dyn Any + Send + Sync>)>,
}

impl PolicySet {
    /// Creates an empty policy set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a policy, replacing any previous instance of the same type.
    pub fn set<P: Policy>(&mut self, policy: P) {
        self.policies
            .insert(TypeId::of::<P>(), (P::policy_name(), Arc::new(policy)));
    }

    /// Returns the policy of type `P`, if set.
    #[must_use]
    pub fn try_get<P: Policy>(&self) -> Option<&P> {
        self.policies
            .get(&TypeId::of::<P>())
            .and_then(|(_, policy)| policy.downcast_ref::<P>())
    }

    /// Returns the policy of type `P`, or its default.
    #[must_use]
    pub fn get<P: Policy>(&self) -> P {
        self.try_get::<P>().cloned().unwrap_or_default()
    }

    /// Returns true if a policy of type `P` is set.
    #[must_use]
    pub fn contains<P: Policy>(&self) -> bool {
        self.policies.contains_key(&TypeId::of::<P>())
    }

    /// Removes the policy of type `P`.
    pub fn remove<P: Policy>(&mut self) -> bool {
        self.policies.remove(&TypeId::of::<P>()).is_some()
    }

    /// Returns the number of policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns true if no policies are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl fmt::Debug for PolicySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.policies.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        f.debug_struct("PolicySet").field("policies", &names).finish()
    }
}
