//! Observability utilities.
//!
//! Logging goes through `tracing`; [`init_logging`] installs the process
//! subscriber. Lifecycle events are delivered separately through the
//! [`EventSink`](crate::events::EventSink) attached to each context.

mod logging;
mod timing;

pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use timing::SpanTimer;
