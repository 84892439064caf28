//! Pipeline lifecycle events.
//!
//! The executor reports run and block transitions to the [`EventSink`]
//! carried by the execution context. Sinks are injected per context; there
//! is no process-wide sink.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A pipeline run started.
    PipelineStarted,
    /// A block finished without error.
    BlockCompleted,
    /// A block was skipped by its run predicate.
    BlockSkipped,
    /// A block aborted the run.
    PipelineAborted,
    /// Every block ran.
    PipelineCompleted,
    /// A block raised an error.
    PipelineFaulted,
}

impl EventKind {
    /// Returns the dotted event type name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PipelineStarted => "pipeline.started",
            Self::BlockCompleted => "block.completed",
            Self::BlockSkipped => "block.skipped",
            Self::PipelineAborted => "pipeline.aborted",
            Self::PipelineCompleted => "pipeline.completed",
            Self::PipelineFaulted => "pipeline.faulted",
        }
    }
}

/// A lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// Event kind.
    pub kind: EventKind,
    /// Pipeline name.
    pub pipeline: String,
    /// Block name, for block events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    /// Correlation ID of the run.
    pub correlation_id: Uuid,
    /// Extra data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
}

impl PipelineEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(kind: EventKind, pipeline: impl Into<String>, correlation_id: Uuid) -> Self {
        Self {
            kind,
            pipeline: pipeline.into(),
            block: None,
            correlation_id,
            data: None,
            timestamp: Utc::now(),
        }
    }

    /// Sets the block name.
    #[must_use]
    pub fn with_block(mut self, block: impl Into<String>) -> Self {
        self.block = Some(block.into());
        self
    }

    /// Sets extra data.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = PipelineEvent::new(EventKind::PipelineAborted, "checkout", Uuid::new_v4())
            .with_block("payment")
            .with_data(serde_json::json!({"reason": "declined"}));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "PipelineAborted");
        assert_eq!(json["block"], "payment");
        assert_eq!(json["data"]["reason"], "declined");
    }
}
