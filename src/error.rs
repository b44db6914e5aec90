//! Error types used by the retry engine and surfaced to callers.
//!
//! This module defines two main error types:
//!
//! - [`ConfigError`] — malformed policy detected when an engine is built.
//! - [`RetryError`] — terminal failure of one execution, carrying either a
//!   configuration fault, a timeout, an abort, or the operation's own error.
//!
//! [`RetryError`] provides helper methods (`as_label`, `is_timeout`, …) for
//! diagnostics and for unwrapping the original operation error.

use std::time::Duration;
use thiserror::Error;

/// # Errors raised by policy validation.
///
/// Validation runs once per execution, before the first attempt. A
/// configuration error is always fatal to that call: it is never retried
/// and never delegated to a fallback.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A delay value (fixed, sequence entry, exponential base, or jitter
    /// bound) was zero; delays must be strictly positive.
    #[error("delay must be greater than zero")]
    ZeroDelay,

    /// An explicit delay sequence does not match the retry budget.
    #[error("delay sequence has {actual} entries but the retry budget is {expected}")]
    SequenceLength {
        /// Required length (one delay per retry).
        expected: u32,
        /// Length actually supplied.
        actual: usize,
    },

    /// A growth factor was below 1 or not finite.
    #[error("delay factor {factor} must be finite and at least 1")]
    InvalidFactor {
        /// The rejected factor.
        factor: f64,
    },

    /// A jittered delay range was empty or inverted.
    #[error("jitter range is invalid: min {min:?} must be below max {max:?}")]
    InvalidJitterRange {
        /// Lower bound (inclusive).
        min: Duration,
        /// Upper bound (exclusive).
        max: Duration,
    },

    /// A timeout of zero was supplied; timeouts must be strictly positive.
    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    /// An explicit delay sequence ran out of entries mid-run.
    ///
    /// Unreachable when construction-time validation has run; raised as a
    /// defensive fault rather than silently skipping the delay.
    #[error("delay sequence exhausted at retry {retry}")]
    SequenceExhausted {
        /// The retry (1-based) that found the sequence empty.
        retry: u32,
    },
}

/// # Terminal error of one execution.
///
/// `E` is the error type of the wrapped operation. Operation errors are
/// carried transparently: their message and identity survive unchanged.
/// Timeouts and aborts are distinct kinds so error filters can target them
/// separately from operation errors.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq)]
pub enum RetryError<E> {
    /// The policy failed validation; no attempt was made.
    #[error("invalid retry configuration: {0}")]
    Config(#[from] ConfigError),

    /// An attempt's timer elapsed before the operation settled.
    #[error("{message}")]
    Timeout {
        /// The configured per-attempt timeout.
        timeout: Duration,
        /// Custom message if one was configured, else a default that
        /// embeds the timeout duration in milliseconds.
        message: String,
    },

    /// The cancellation signal fired, so the attempt's wait was abandoned.
    #[error("attempt aborted: {reason}")]
    Aborted {
        /// Why the attempt was abandoned.
        reason: String,
    },

    /// The operation itself failed.
    #[error(transparent)]
    Operation(E),
}

impl<E> RetryError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use retrykit::{ConfigError, RetryError};
    ///
    /// let err: RetryError<std::io::Error> = ConfigError::ZeroTimeout.into();
    /// assert_eq!(err.as_label(), "config_invalid");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::Config(_) => "config_invalid",
            RetryError::Timeout { .. } => "attempt_timeout",
            RetryError::Aborted { .. } => "attempt_aborted",
            RetryError::Operation(_) => "operation_error",
        }
    }

    /// Returns `true` for validation failures.
    pub fn is_config(&self) -> bool {
        matches!(self, RetryError::Config(_))
    }

    /// Returns `true` when an attempt's timer won the race.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RetryError::Timeout { .. })
    }

    /// Returns `true` when the cancellation signal won the race.
    pub fn is_aborted(&self) -> bool {
        matches!(self, RetryError::Aborted { .. })
    }

    /// Unwraps the operation's own error, if that is what terminated the
    /// execution.
    ///
    /// # Example
    /// ```
    /// use retrykit::RetryError;
    ///
    /// let err = RetryError::Operation("boom");
    /// assert_eq!(err.into_operation(), Some("boom"));
    /// ```
    pub fn into_operation(self) -> Option<E> {
        match self {
            RetryError::Operation(e) => Some(e),
            _ => None,
        }
    }
}
