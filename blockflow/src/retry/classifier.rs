//! Transient error classification.
//!
//! A classifier is an OR of error-kind checks. Each check is applied to the
//! error itself and then to every error in its `source()` chain, so wrapping
//! a transport error in a domain error does not hide it from the retryer.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

type Check = Arc<dyn Fn(&(dyn StdError + 'static)) -> bool + Send + Sync>;

/// Decides whether a failure is eligible for retry.
#[derive(Clone, Default)]
pub struct TransientErrorClassifier {
    checks: Vec<(String, Check)>,
}

impl TransientErrorClassifier {
    /// Creates a classifier that treats nothing as transient.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a classifier that treats every error as transient.
    #[must_use]
    pub fn always() -> Self {
        Self::new().or_when("always", |_| true)
    }

    /// Treats any error of type `E` as transient.
    #[must_use]
    pub fn or_error<E>(self) -> Self
    where
        E: StdError + 'static,
    {
        self.or_when(std::any::type_name::<E>(), |err| err.is::<E>())
    }

    /// Treats errors of type `E` as transient when `predicate` holds.
    #[must_use]
    pub fn or_matching<E, F>(self, predicate: F) -> Self
    where
        E: StdError + 'static,
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.or_when(std::any::type_name::<E>(), move |err| {
            err.downcast_ref::<E>().is_some_and(&predicate)
        })
    }

    /// Treats I/O errors of the given kinds as transient.
    #[must_use]
    pub fn or_io_kinds(self, kinds: &[std::io::ErrorKind]) -> Self {
        let kinds = kinds.to_vec();
        self.or_matching::<std::io::Error, _>(move |err| kinds.contains(&err.kind()))
    }

    /// Adds an arbitrary named check.
    #[must_use]
    pub fn or_when<F>(mut self, label: impl Into<String>, check: F) -> Self
    where
        F: Fn(&(dyn StdError + 'static)) -> bool + Send + Sync + 'static,
    {
        self.checks.push((label.into(), Arc::new(check)));
        self
    }

    /// Returns true if the error, or any error it wraps, is transient.
    #[must_use]
    pub fn is_transient(&self, error: &(dyn StdError + 'static)) -> bool {
        let mut current = Some(error);
        while let Some(err) = current {
            if self.checks.iter().any(|(_, check)| check(err)) {
                return true;
            }
            current = err.source();
        }
        false
    }

    /// Returns the number of checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true if no checks are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// The I/O error kinds treated as connectivity failures.
pub const CONNECTIVITY_IO_KINDS: &[std::io::ErrorKind] = &[
    std::io::ErrorKind::ConnectionRefused,
    std::io::ErrorKind::ConnectionReset,
    std::io::ErrorKind::ConnectionAborted,
    std::io::ErrorKind::NotConnected,
    std::io::ErrorKind::BrokenPipe,
    std::io::ErrorKind::TimedOut,
    std::io::ErrorKind::UnexpectedEof,
];

impl fmt::Debug for TransientErrorClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransientErrorClassifier")
            .field(
                "checks",
                &self.checks.iter().map(|(label, _)| label.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("validation failed")]
    struct ValidationError;

    #[derive(Debug, Error)]
    #[error("request failed")]
    struct RequestError {
        #[source]
        source: io::Error,
    }

    #[test]
    fn test_empty_classifier_rejects_everything() {
        let classifier = TransientErrorClassifier::new();
        assert!(classifier.is_empty());
        assert!(!classifier.is_transient(&ValidationError));
    }

    #[test]
    fn test_always() {
        assert!(TransientErrorClassifier::always().is_transient(&ValidationError));
    }

    #[test]
    fn test_or_error_by_type() {
        let classifier = TransientErrorClassifier::new().or_error::<io::Error>();

        assert!(classifier.is_transient(&io::Error::new(io::ErrorKind::Other, "x")));
        assert!(!classifier.is_transient(&ValidationError));
    }

    #[test]
    fn test_io_kinds_walk_source_chain() {
        let classifier = TransientErrorClassifier::new().or_io_kinds(CONNECTIVITY_IO_KINDS);

        let wrapped = RequestError {
            source: io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"),
        };
        assert!(classifier.is_transient(&wrapped));

        let permanent = RequestError {
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!classifier.is_transient(&permanent));
    }

    #[test]
    fn test_checks_are_ored() {
        let classifier = TransientErrorClassifier::new()
            .or_error::<ValidationError>()
            .or_io_kinds(&[io::ErrorKind::TimedOut]);

        assert_eq!(classifier.len(), 2);
        assert!(classifier.is_transient(&ValidationError));
        assert!(classifier.is_transient(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(format!("{classifier:?}").contains("ValidationError"));
    }
}
