//! Total-capture result pair returned by the safe entry point.

use crate::error::RetryError;

/// Outcome of `run_safe`: exactly one of `result`/`error` is populated.
///
/// Unlike `run`, the safe entry point never fails — terminal errors of any
/// kind (operation, timeout, abort, configuration) are folded into this
/// pair instead of being returned as `Err`.
#[derive(Debug)]
pub struct SafeOutcome<T, E> {
    outcome: Result<T, RetryError<E>>,
}

impl<T, E> SafeOutcome<T, E> {
    pub(crate) fn success(value: T) -> Self {
        Self { outcome: Ok(value) }
    }

    pub(crate) fn failure(error: RetryError<E>) -> Self {
        Self {
            outcome: Err(error),
        }
    }

    /// The terminal value, when the execution succeeded.
    pub fn result(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// The terminal error, when the execution failed.
    pub fn error(&self) -> Option<&RetryError<E>> {
        self.outcome.as_ref().err()
    }

    /// Returns `true` when a value is populated.
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Converts the pair back into an ordinary `Result`.
    pub fn into_result(self) -> Result<T, RetryError<E>> {
        self.outcome
    }

    /// Splits the pair into its two optional sides.
    pub fn into_parts(self) -> (Option<T>, Option<RetryError<E>>) {
        match self.outcome {
            Ok(value) => (Some(value), None),
            Err(error) => (None, Some(error)),
        }
    }
}
