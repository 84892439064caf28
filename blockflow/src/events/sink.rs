//! Event sink trait and implementations.

use super::PipelineEvent;
use parking_lot::RwLock;
use tracing::{debug, info, Level};

/// Receives lifecycle events from pipeline runs.
///
/// Implementations must not fail or block; a sink that cannot deliver an
/// event should drop it.
pub trait EventSink: Send + Sync {
    /// Records an event.
    fn emit(&self, event: &PipelineEvent);
}

/// A no-op event sink that discards all events.
///
/// Used as the default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event: &PipelineEvent) {}
}

/// An event sink that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a new logging event sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl EventSink for LoggingEventSink {
    fn emit(&self, event: &PipelineEvent) {
        let kind = event.kind.as_str();
        if self.level == Level::DEBUG {
            debug!(
                event_type = %kind,
                pipeline = %event.pipeline,
                block = ?event.block,
                correlation_id = %event.correlation_id,
                event_data = ?event.data,
                "Event: {}", kind
            );
        } else {
            info!(
                event_type = %kind,
                pipeline = %event.pipeline,
                block = ?event.block,
                correlation_id = %event.correlation_id,
                event_data = ?event.data,
                "Event: {}", kind
            );
        }
    }
}

/// A collecting event sink for tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<PipelineEvent>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.read().clone()
    }

    /// Returns the collected event type names in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.read().iter().map(|e| e.kind.as_str()).collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events whose type starts with `type_prefix`.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<PipelineEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.kind.as_str().starts_with(type_prefix))
            .cloned()
            .collect()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: &PipelineEvent) {
        self.events.write().push(event.clone());
    }
}
