//! Backoff strategies for retryers.
//!
//! A strategy answers two questions for a retryer: how many attempts an
//! operation gets in total, and how long to wait before retry number `n`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

/// Default jitter ratio applied to the growing part of an exponential delay.
pub const DEFAULT_JITTER_RATIO: f64 = 0.2;

/// A named retry schedule.
pub trait RetryStrategy: Send + Sync + Debug {
    /// Returns the strategy name.
    fn name(&self) -> &str;

    /// Returns the total number of attempts, including the first call.
    fn max_attempts(&self) -> u32;

    /// Returns the delay before retry number `retry` (1-based).
    fn delay(&self, retry: u32) -> Duration;

    /// Checks the strategy parameters.
    ///
    /// # Errors
    ///
    /// Returns a human readable reason when the parameters are unusable.
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts() == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Exponential backoff with a bounded, jittered delay.
///
/// The delay before retry `i` is
/// `min(max_backoff, min_backoff + delta_backoff * jitter * (2^i - 1))`
/// where `jitter` is drawn from `[1 - ratio, 1 + ratio]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExponentialBackoff {
    /// Strategy name.
    pub name: String,
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    /// Lower bound for every delay.
    pub min_backoff: Duration,
    /// Upper bound for every delay.
    pub max_backoff: Duration,
    /// Increment that drives the exponential growth.
    pub delta_backoff: Duration,
    /// Whether the first retry happens without waiting.
    pub fast_first_retry: bool,
    /// Jitter ratio applied to the growing part of the delay.
    #[serde(default = "default_jitter_ratio")]
    pub jitter_ratio: f64,
}

fn default_jitter_ratio() -> f64 {
    DEFAULT_JITTER_RATIO
}

impl ExponentialBackoff {
    /// Creates a new exponential backoff strategy.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        max_attempts: u32,
        min_backoff: Duration,
        max_backoff: Duration,
        delta_backoff: Duration,
        fast_first_retry: bool,
    ) -> Self {
        Self {
            name: name.into(),
            max_attempts,
            min_backoff,
            max_backoff,
            delta_backoff,
            fast_first_retry,
            jitter_ratio: DEFAULT_JITTER_RATIO,
        }
    }

    /// Sets the jitter ratio, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_jitter_ratio(mut self, ratio: f64) -> Self {
        self.jitter_ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
        self
    }

    /// Disables jitter.
    #[must_use]
    pub fn without_jitter(self) -> Self {
        self.with_jitter_ratio(0.0)
    }

    /// Computes the delay with an explicit jitter factor.
    fn delay_with_factor(&self, retry: u32, factor: f64) -> Duration {
        if self.delta_backoff.is_zero() {
            return self.min_backoff.min(self.max_backoff);
        }

        let span = self.max_backoff.saturating_sub(self.min_backoff).as_secs_f64();
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let growth = 2f64.powi(exponent) - 1.0;
        let raw = self.delta_backoff.as_secs_f64() * factor * growth;
        let grown = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, span) };

        (self.min_backoff + Duration::from_secs_f64(grown))
            .clamp(self.min_backoff, self.max_backoff.max(self.min_backoff))
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay(&self, retry: u32) -> Duration {
        if retry <= 1 && self.fast_first_retry {
            return Duration::ZERO;
        }

        let ratio = if self.jitter_ratio.is_finite() {
            self.jitter_ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let factor = if ratio > 0.0 {
            rand::thread_rng().gen_range(1.0 - ratio..=1.0 + ratio)
        } else {
            1.0
        };

        self.delay_with_factor(retry.max(1), factor)
    }

    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.min_backoff > self.max_backoff {
            return Err(format!(
                "min_backoff ({:?}) exceeds max_backoff ({:?})",
                self.min_backoff, self.max_backoff
            ));
        }
        Ok(())
    }
}

/// A constant delay between attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedInterval {
    /// Strategy name.
    pub name: String,
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub interval: Duration,
    /// Whether the first retry happens without waiting.
    pub fast_first_retry: bool,
}

impl FixedInterval {
    /// Creates a new fixed interval strategy.
    #[must_use]
    pub fn new(name: impl Into<String>, max_attempts: u32, interval: Duration) -> Self {
        Self {
            name: name.into(),
            max_attempts,
            interval,
            fast_first_retry: false,
        }
    }

    /// Makes the first retry immediate.
    #[must_use]
    pub fn with_fast_first_retry(mut self) -> Self {
        self.fast_first_retry = true;
        self
    }
}

impl RetryStrategy for FixedInterval {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay(&self, retry: u32) -> Duration {
        if retry <= 1 && self.fast_first_retry {
            Duration::ZERO
        } else {
            self.interval
        }
    }
}

/// A delay that grows linearly: `initial + increment * (retry - 1)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incremental {
    /// Strategy name.
    pub name: String,
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_interval: Duration,
    /// Added for every further retry.
    pub increment: Duration,
    /// Whether the first retry happens without waiting.
    pub fast_first_retry: bool,
}

impl Incremental {
    /// Creates a new incremental strategy.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        max_attempts: u32,
        initial_interval: Duration,
        increment: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            max_attempts,
            initial_interval,
            increment,
            fast_first_retry: false,
        }
    }
}

impl RetryStrategy for Incremental {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay(&self, retry: u32) -> Duration {
        if retry <= 1 && self.fast_first_retry {
            return Duration::ZERO;
        }
        self.initial_interval
            .saturating_add(self.increment.saturating_mul(retry.saturating_sub(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn backoff() -> ExponentialBackoff {
        ExponentialBackoff::new(
            "test",
            5,
            Duration::from_millis(50),
            Duration::from_secs(30),
            Duration::from_millis(100),
            false,
        )
        .without_jitter()
    }

    #[test]
    fn test_exponential_growth_without_jitter() {
        let strategy = backoff();

        // min + delta * (2^i - 1)
        assert_eq!(strategy.delay(1), Duration::from_millis(150));
        assert_eq!(strategy.delay(2), Duration::from_millis(350));
        assert_eq!(strategy.delay(3), Duration::from_millis(750));
    }

    #[test]
    fn test_exponential_capped_at_max() {
        let strategy = backoff();
        assert_eq!(strategy.delay(30), Duration::from_secs(30));
        assert_eq!(strategy.delay(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn test_fast_first_retry() {
        let mut strategy = backoff();
        strategy.fast_first_retry = true;

        assert_eq!(strategy.delay(1), Duration::ZERO);
        assert_eq!(strategy.delay(2), Duration::from_millis(350));
    }

    #[test]
    fn test_zero_delta_uses_min() {
        let strategy = ExponentialBackoff::new(
            "flat",
            3,
            Duration::from_millis(20),
            Duration::from_millis(40),
            Duration::ZERO,
            false,
        );
        assert_eq!(strategy.delay(7), Duration::from_millis(20));
    }

    #[test]
    fn test_jitter_ratio_clamped() {
        assert_eq!(backoff().with_jitter_ratio(4.0).jitter_ratio, 1.0);
        assert_eq!(backoff().with_jitter_ratio(f64::NAN).jitter_ratio, 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(backoff().validate().is_ok());

        let mut inverted = backoff();
        inverted.min_backoff = Duration::from_secs(60);
        assert!(inverted.validate().unwrap_err().contains("min_backoff"));

        let mut no_attempts = backoff();
        no_attempts.max_attempts = 0;
        assert!(no_attempts.validate().is_err());
    }

    #[test]
    fn test_fixed_interval() {
        let strategy = FixedInterval::new("fixed", 3, Duration::from_millis(10));
        assert_eq!(strategy.delay(1), Duration::from_millis(10));
        assert_eq!(strategy.delay(9), Duration::from_millis(10));

        let fast = strategy.with_fast_first_retry();
        assert_eq!(fast.delay(1), Duration::ZERO);
    }

    #[test]
    fn test_incremental() {
        let strategy = Incremental::new(
            "inc",
            4,
            Duration::from_millis(100),
            Duration::from_millis(50),
        );
        assert_eq!(strategy.delay(1), Duration::from_millis(100));
        assert_eq!(strategy.delay(3), Duration::from_millis(200));
    }

    proptest! {
        #[test]
        fn exponential_delay_stays_within_bounds(
            min_ms in 0u64..10_000,
            span_ms in 0u64..600_000,
            delta_ms in 0u64..60_000,
            jitter in 0.0f64..1.0,
            retry in 1u32..200,
        ) {
            let strategy = ExponentialBackoff::new(
                "prop",
                10,
                Duration::from_millis(min_ms),
                Duration::from_millis(min_ms + span_ms),
                Duration::from_millis(delta_ms),
                false,
            )
            .with_jitter_ratio(jitter);

            let delay = strategy.delay(retry);
            prop_assert!(delay >= strategy.min_backoff);
            prop_assert!(delay <= strategy.max_backoff);
        }
    }
}
