//! Classifier-gated retry execution.

use super::{RetryStrategy, TransientErrorClassifier};
use crate::cancellation::CancellationToken;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Why a retried operation did not produce a value.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Cancellation was requested before the operation succeeded.
    Cancelled {
        /// Attempts made before cancellation was observed.
        attempts: u32,
    },
    /// The classifier judged the error non-transient; it was not retried.
    Rejected(E),
    /// Every allowed attempt failed with a transient error.
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// The error from the final attempt.
        error: E,
    },
}

impl<E> RetryError<E> {
    /// Returns the operation's error, if the failure came from the operation.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Cancelled { .. } => None,
            Self::Rejected(error) | Self::Exhausted { error, .. } => Some(error),
        }
    }

    /// Returns true if the retry sequence was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled { attempts } => {
                write!(f, "Operation cancelled after {attempts} attempt(s)")
            }
            Self::Rejected(error) => write!(f, "{error}"),
            Self::Exhausted { attempts, error } => {
                write!(f, "Retries exhausted after {attempts} attempt(s): {error}")
            }
        }
    }
}

impl<E> StdError for RetryError<E>
where
    E: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Cancelled { .. } => None,
            Self::Rejected(error) | Self::Exhausted { error, .. } => Some(error),
        }
    }
}

/// A named retry policy: a strategy plus the classifier that gates it.
#[derive(Debug, Clone)]
pub struct Retryer {
    name: String,
    classifier: TransientErrorClassifier,
    strategy: Arc<dyn RetryStrategy>,
}

impl Retryer {
    /// Creates a new retryer.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        classifier: TransientErrorClassifier,
        strategy: Arc<dyn RetryStrategy>,
    ) -> Self {
        Self {
            name: name.into(),
            classifier,
            strategy,
        }
    }

    /// Returns the retryer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the backoff strategy.
    #[must_use]
    pub fn strategy(&self) -> &Arc<dyn RetryStrategy> {
        &self.strategy
    }

    /// Returns the transient error classifier.
    #[must_use]
    pub fn classifier(&self) -> &TransientErrorClassifier {
        &self.classifier
    }

    /// Runs `operation` until it succeeds, fails permanently, runs out of
    /// attempts, or `cancel` is signalled.
    ///
    /// The backoff wait is the only suspension point besides the operation
    /// itself, and it is abandoned as soon as cancellation is requested.
    pub async fn execute<T, E, F, Fut>(
        &self,
        mut operation: F,
        cancel: &CancellationToken,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: StdError + 'static,
    {
        let max_attempts = self.strategy.max_attempts().max(1);
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                debug!(retryer = %self.name, attempts = attempt, "Retry sequence cancelled");
                return Err(RetryError::Cancelled { attempts: attempt });
            }

            attempt += 1;
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !self.classifier.is_transient(&error) {
                debug!(
                    retryer = %self.name,
                    attempt,
                    error = %error,
                    "Error is not transient, giving up"
                );
                return Err(RetryError::Rejected(error));
            }

            if attempt >= max_attempts {
                warn!(
                    retryer = %self.name,
                    attempts = attempt,
                    error = %error,
                    "Retries exhausted"
                );
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    error,
                });
            }

            let delay = self.strategy.delay(attempt);
            debug!(
                retryer = %self.name,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "Transient error, retrying"
            );

            if !wait(delay, cancel).await {
                debug!(retryer = %self.name, attempts = attempt, "Backoff interrupted by cancellation");
                return Err(RetryError::Cancelled { attempts: attempt });
            }
        }
    }
}

/// Sleeps for `delay`; returns false if cancellation arrived first.
async fn wait(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }

    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{ExponentialBackoff, FixedInterval};
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fixed(max_attempts: u32) -> Arc<dyn RetryStrategy> {
        Arc::new(FixedInterval::new("fixed", max_attempts, Duration::from_millis(1)))
    }

    fn transient() -> io::Error {
        io::Error::new(io::ErrorKind::ConnectionReset, "reset")
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let retryer = Retryer::new("r", TransientErrorClassifier::always(), fixed(3));
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<&str, RetryError<io::Error>> = retryer
            .execute(
                || async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(transient())
                    } else {
                        Ok("done")
                    }
                },
                &CancellationToken::none(),
            )
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_transient_error_is_not_retried() {
        let retryer = Retryer::new("r", TransientErrorClassifier::new(), fixed(5));
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = retryer
            .execute(
                || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(io::Error::new(io::ErrorKind::InvalidInput, "bad amount"))
                },
                &CancellationToken::none(),
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        match result {
            Err(RetryError::Rejected(err)) => assert_eq!(err.to_string(), "bad amount"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exhausts_attempts() {
        let retryer = Retryer::new("r", TransientErrorClassifier::always(), fixed(3));
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = retryer
            .execute(
                || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(transient())
                },
                &CancellationToken::none(),
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::Exhausted { attempts: 3, .. }));
        assert!(err.to_string().contains("3 attempt(s)"));
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_surfaces_cancellation() {
        let retryer = Retryer::new("r", TransientErrorClassifier::always(), fixed(3));
        let cancel = CancellationToken::new();
        cancel.cancel("shutdown");

        let result: Result<(), RetryError<io::Error>> = retryer
            .execute(|| async { Err(transient()) }, &cancel)
            .await;

        let err = result.unwrap_err();
        assert!(err.is_cancelled());
        assert!(err.into_inner().is_none());
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_backoff() {
        let strategy = ExponentialBackoff::new(
            "slow",
            5,
            Duration::from_secs(60),
            Duration::from_secs(120),
            Duration::from_secs(1),
            false,
        );
        let retryer = Retryer::new("r", TransientErrorClassifier::always(), Arc::new(strategy));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel("stop");
        });

        let result: Result<(), RetryError<io::Error>> = tokio::time::timeout(
            Duration::from_secs(5),
            retryer.execute(|| async { Err(transient()) }, &cancel),
        )
        .await
        .expect("cancellation should cut the 60s backoff short");

        assert!(matches!(result, Err(RetryError::Cancelled { attempts: 1 })));
    }

    #[test]
    fn test_retry_error_source() {
        let err: RetryError<io::Error> = RetryError::Exhausted {
            attempts: 2,
            error: transient(),
        };
        assert!(err.source().is_some());
        assert!(RetryError::<io::Error>::Cancelled { attempts: 0 }.source().is_none());
    }
}
