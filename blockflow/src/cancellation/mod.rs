//! Cooperative cancellation for retry waits and long-running blocks.

mod token;

pub use token::{CancelCallback, CancellationToken};
