//! Wall-clock timing for pipeline runs and retry attempts.

use std::time::{Duration, Instant};

/// Measures the duration of a named unit of work.
#[derive(Debug, Clone)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the timer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops the timer and returns the duration in milliseconds.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_measures_sleep() {
        let timer = SpanTimer::start("checkout");
        std::thread::sleep(Duration::from_millis(10));

        assert_eq!(timer.name(), "checkout");
        assert!(timer.elapsed() >= Duration::from_millis(10));
        assert!(timer.finish() >= 10.0);
    }
}
