//! Test fixtures for pipeline testing.

use std::sync::Arc;

use crate::cancellation::CancellationToken;
use crate::context::{PipelineExecutionContext, Policy, PolicyKey, RunIdentity};
use crate::events::CollectingEventSink;

/// Builds execution contexts for tests.
///
/// Every context built here reports its events to a
/// [`CollectingEventSink`] that the test can inspect afterwards.
#[derive(Debug)]
pub struct TestContext {
    ctx: PipelineExecutionContext,
    policy_keys: Vec<PolicyKey>,
    events: Arc<CollectingEventSink>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Creates a new test context.
    #[must_use]
    pub fn new() -> Self {
        let events = Arc::new(CollectingEventSink::new());
        Self {
            ctx: PipelineExecutionContext::new(RunIdentity::new())
                .with_event_sink(events.clone()),
            policy_keys: Vec::new(),
            events,
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.ctx = self.ctx.with_header(name, value);
        self
    }

    /// Activates a policy key.
    #[must_use]
    pub fn with_policy_key(mut self, key: impl Into<PolicyKey>) -> Self {
        self.policy_keys.push(key.into());
        self
    }

    /// Stores a policy.
    #[must_use]
    pub fn with_policy<P: Policy>(mut self, policy: P) -> Self {
        self.ctx = self.ctx.with_policy(policy);
        self
    }

    /// Uses `token` for cancellation.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.ctx = self.ctx.with_cancellation(token);
        self
    }

    /// Returns the sink that will collect events.
    #[must_use]
    pub fn events(&self) -> Arc<CollectingEventSink> {
        self.events.clone()
    }

    /// Builds the execution context.
    #[must_use]
    pub fn build(self) -> PipelineExecutionContext {
        self.build_with_events().0
    }

    /// Builds the execution context along with its event sink.
    #[must_use]
    pub fn build_with_events(self) -> (PipelineExecutionContext, Arc<CollectingEventSink>) {
        let mut ctx = self.ctx;
        if !self.policy_keys.is_empty() {
            ctx.add_policy_keys(self.policy_keys);
        }
        (ctx, self.events)
    }
}
