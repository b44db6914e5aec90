//! # Error filters for the allow/deny lists.
//!
//! [`ErrorMatcher`] decides whether a failure belongs to a class of
//! interest. Matchers come in three kinds:
//!
//! - [`ErrorMatcher::when`] — a predicate over the operation's own error;
//! - [`ErrorMatcher::timeouts`] — matches fired attempt timeouts;
//! - [`ErrorMatcher::aborts`] — matches cancellation-signal failures.
//!
//! The kinds never overlap: a timeout matcher does not match an abort, and
//! neither matches operation errors. Filters that should catch an engine
//! failure must therefore name that failure's kind explicitly.

use std::fmt;
use std::sync::Arc;

use crate::error::RetryError;

/// Matches one class of failure, for use with `only_errors`/`skip_errors`.
pub struct ErrorMatcher<E> {
    kind: MatcherKind<E>,
}

enum MatcherKind<E> {
    Timeout,
    Aborted,
    Operation(Arc<dyn Fn(&E) -> bool + Send + Sync>),
}

impl<E> ErrorMatcher<E> {
    /// Matches operation errors for which `predicate` returns `true`.
    ///
    /// # Example
    /// ```
    /// use retrykit::ErrorMatcher;
    ///
    /// let transient = ErrorMatcher::when(|e: &std::io::Error| {
    ///     e.kind() == std::io::ErrorKind::TimedOut
    /// });
    /// # let _ = transient;
    /// ```
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: MatcherKind::Operation(Arc::new(predicate)),
        }
    }

    /// Matches attempt timeouts.
    pub fn timeouts() -> Self {
        Self {
            kind: MatcherKind::Timeout,
        }
    }

    /// Matches cancellation-signal aborts.
    pub fn aborts() -> Self {
        Self {
            kind: MatcherKind::Aborted,
        }
    }

    pub(crate) fn matches(&self, error: &RetryError<E>) -> bool {
        match (&self.kind, error) {
            (MatcherKind::Timeout, RetryError::Timeout { .. }) => true,
            (MatcherKind::Aborted, RetryError::Aborted { .. }) => true,
            (MatcherKind::Operation(predicate), RetryError::Operation(e)) => predicate(e),
            _ => false,
        }
    }
}

impl<E> Clone for ErrorMatcher<E> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            MatcherKind::Timeout => MatcherKind::Timeout,
            MatcherKind::Aborted => MatcherKind::Aborted,
            MatcherKind::Operation(predicate) => MatcherKind::Operation(Arc::clone(predicate)),
        };
        Self { kind }
    }
}

impl<E> fmt::Debug for ErrorMatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            MatcherKind::Timeout => "timeouts",
            MatcherKind::Aborted => "aborts",
            MatcherKind::Operation(_) => "when(..)",
        };
        f.debug_tuple("ErrorMatcher").field(&kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Permanent,
    }

    #[test]
    fn test_predicate_matches_operation_errors_only() {
        let matcher = ErrorMatcher::when(|e: &TestError| matches!(e, TestError::Transient));
        assert!(matcher.matches(&RetryError::Operation(TestError::Transient)));
        assert!(!matcher.matches(&RetryError::Operation(TestError::Permanent)));
        assert!(!matcher.matches(&RetryError::Timeout {
            timeout: Duration::from_secs(1),
            message: "late".into(),
        }));
    }

    #[test]
    fn test_timeout_matcher_does_not_match_aborts() {
        let matcher = ErrorMatcher::<TestError>::timeouts();
        assert!(matcher.matches(&RetryError::Timeout {
            timeout: Duration::from_secs(1),
            message: "late".into(),
        }));
        assert!(!matcher.matches(&RetryError::Aborted {
            reason: "signal".into(),
        }));
    }

    #[test]
    fn test_abort_matcher_does_not_match_timeouts() {
        let matcher = ErrorMatcher::<TestError>::aborts();
        assert!(matcher.matches(&RetryError::Aborted {
            reason: "signal".into(),
        }));
        assert!(!matcher.matches(&RetryError::Timeout {
            timeout: Duration::from_secs(1),
            message: "late".into(),
        }));
    }
}
