//! The mutable per-run execution context.

use super::{CommandMessage, HeaderBag, MessageSeverity, Policy, PolicyKey, PolicySet, RunIdentity};
use crate::cancellation::CancellationToken;
use crate::events::{EventKind, EventSink, NoOpEventSink, PipelineEvent};
use std::fmt;
use std::sync::Arc;

/// State carried through one pipeline run.
///
/// A context belongs to exactly one run and is handed to blocks as
/// `&mut`. Blocks communicate with the executor through it: adding
/// messages, toggling policy keys and aborting the run.
pub struct PipelineExecutionContext {
    identity: RunIdentity,
    headers: HeaderBag,
    policies: PolicySet,
    messages: Vec<CommandMessage>,
    aborted: bool,
    abort_reason: Option<String>,
    cancellation: CancellationToken,
    event_sink: Arc<dyn EventSink>,
}

impl Default for PipelineExecutionContext {
    fn default() -> Self {
        Self::new(RunIdentity::new())
    }
}

impl PipelineExecutionContext {
    /// Creates a new context for the given run identity.
    #[must_use]
    pub fn new(identity: RunIdentity) -> Self {
        Self {
            identity,
            headers: HeaderBag::new(),
            policies: PolicySet::new(),
            messages: Vec::new(),
            aborted: false,
            abort_reason: None,
            cancellation: CancellationToken::none(),
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Sets the cancellation token handed to retrying operations.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Sets a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets a policy.
    #[must_use]
    pub fn with_policy<P: Policy>(mut self, policy: P) -> Self {
        self.policies.set(policy);
        self
    }

    /// Builds a context for nested work.
    ///
    /// Headers and policies are copied, the policy-keys header is stripped,
    /// and the new context starts with a child identity, no messages and no
    /// abort. The event sink and cancellation token are shared.
    #[must_use]
    pub fn fork_clean(&self) -> Self {
        let mut headers = self.headers.clone();
        headers.remove(super::POLICY_KEYS_HEADER);
        Self {
            identity: self.identity.child(),
            headers,
            policies: self.policies.clone(),
            messages: Vec::new(),
            aborted: false,
            abort_reason: None,
            cancellation: self.cancellation.clone(),
            event_sink: Arc::clone(&self.event_sink),
        }
    }

    /// Returns the run identity.
    #[must_use]
    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderBag {
        &self.headers
    }

    /// Returns the headers mutably.
    pub fn headers_mut(&mut self) -> &mut HeaderBag {
        &mut self.headers
    }

    /// Gets a header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Sets a header, replacing any previous value.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    /// Removes a header.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(name)
    }

    /// Returns the policy of type `P`, or its default when none was set.
    #[must_use]
    pub fn get_policy<P: Policy>(&self) -> P {
        self.policies.get::<P>()
    }

    /// Returns the policy of type `P`, if set.
    #[must_use]
    pub fn try_get_policy<P: Policy>(&self) -> Option<&P> {
        self.policies.try_get::<P>()
    }

    /// Sets a policy, replacing any previous instance of the same type.
    pub fn set_policy<P: Policy>(&mut self, policy: P) {
        self.policies.set(policy);
    }

    /// Returns the policy set.
    #[must_use]
    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }

    /// Activates policy keys.
    pub fn add_policy_keys<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<PolicyKey>,
    {
        self.headers.add_policy_keys(keys);
    }

    /// Deactivates policy keys.
    pub fn remove_policy_keys<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<PolicyKey>,
    {
        self.headers.remove_policy_keys(keys);
    }

    /// Returns true if `key` is active.
    #[must_use]
    pub fn has_policy_key(&self, key: &PolicyKey) -> bool {
        self.headers.has_policy_key(key)
    }

    /// Records a diagnostic and returns its text.
    pub fn add_message(
        &mut self,
        severity: MessageSeverity,
        term_key: impl Into<String>,
        args: Vec<serde_json::Value>,
        text: impl Into<String>,
    ) -> String {
        let message = CommandMessage::new(severity, term_key, args, text);
        let text = message.text.clone();
        tracing::debug!(
            correlation_id = %self.identity.correlation_id,
            severity = %message.severity,
            term_key = %message.term_key,
            "{}",
            text
        );
        self.messages.push(message);
        text
    }

    /// Returns the recorded diagnostics in order.
    #[must_use]
    pub fn messages(&self) -> &[CommandMessage] {
        &self.messages
    }

    /// Returns true if any recorded diagnostic has the given term key.
    #[must_use]
    pub fn has_message(&self, term_key: &str) -> bool {
        self.messages.iter().any(|m| m.term_key == term_key)
    }

    /// Aborts the run. The first reason is kept.
    pub fn abort(&mut self, reason: impl Into<String>) {
        if !self.aborted {
            self.aborted = true;
            self.abort_reason = Some(reason.into());
        }
    }

    /// Returns true if the run was aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Returns the abort reason, if any.
    #[must_use]
    pub fn abort_reason(&self) -> Option<&str> {
        self.abort_reason.as_deref()
    }

    /// Returns the cancellation token.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns the event sink.
    #[must_use]
    pub fn event_sink(&self) -> &Arc<dyn EventSink> {
        &self.event_sink
    }

    /// Emits a lifecycle event for this run.
    pub fn try_emit_event(
        &self,
        kind: EventKind,
        pipeline: &str,
        block: Option<&str>,
        data: Option<serde_json::Value>,
    ) {
        let mut event = PipelineEvent::new(kind, pipeline, self.identity.correlation_id);
        if let Some(block) = block {
            event = event.with_block(block);
        }
        if let Some(data) = data {
            event = event.with_data(data);
        }
        self.event_sink.emit(&event);
    }
}

impl fmt::Debug for PipelineExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineExecutionContext")
            .field("identity", &self.identity)
            .field("headers", &self.headers)
            .field("policies", &self.policies)
            .field("messages", &self.messages.len())
            .field("aborted", &self.aborted)
            .field("abort_reason", &self.abort_reason)
            .finish_non_exhaustive()
    }
}
