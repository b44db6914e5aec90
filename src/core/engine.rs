//! # Execution engine: the per-call retry loop.
//!
//! One [`Execution`] is materialized per terminal builder call and owns
//! that call's run state: the attempt counter, the retries consumed, and a
//! private delay cursor. Nothing is shared between executions, which is
//! what makes one builder safe to reuse across independent calls.
//!
//! ## Loop
//! ```text
//! validate policy (fail fast, before the first attempt)
//! loop {
//!   ├─► run_once(op, attempt, timeout)
//!   │       ├─ Ok(value) ──────────────► DONE(value)
//!   │       └─ Err(failure)
//!   │            ├─ budget exhausted ──► fallback(error, attempt) | DONE(error)
//!   │            ├─ skip matches ──────► DONE(error)
//!   │            ├─ only misses ───────► DONE(error)
//!   │            └─ retryable
//!   │                 ├─► attempt += 1, retries += 1
//!   │                 └─► sleep(delay for retry)   // if a delay is configured
//!   └─ next attempt
//! }
//! ```
//!
//! ## Rules
//! - Attempts run strictly sequentially; attempt *k+1* never starts before
//!   attempt *k*'s outcome is resolved and its delay has elapsed.
//! - The budget check runs before classification, so the last attempt's
//!   failure always reaches the fallback when one is configured.
//! - `attempt == retries + 1` at every suspension point.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::time;

use crate::core::builder::Retry;
use crate::core::runner::run_once;
use crate::error::{ConfigError, RetryError};
use crate::outcome::SafeOutcome;
use crate::policies::{DelayState, ErrorMatcher, TimeoutPolicy};

pub(crate) type BoxFallbackFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Substitute result producer, invoked once the budget is exhausted.
pub(crate) type FallbackFn<T, E> =
    Arc<dyn Fn(RetryError<E>, u32) -> BoxFallbackFuture<T> + Send + Sync>;

/// Per-call engine: cloned policy plus exclusive run state.
pub(crate) struct Execution<T, E> {
    retry_count: u32,
    only: Vec<ErrorMatcher<E>>,
    skip: Vec<ErrorMatcher<E>>,
    delay: Option<DelayState>,
    timeout: Option<TimeoutPolicy>,
    fallback: Option<FallbackFn<T, E>>,
    logging: bool,

    /// Total invocations of the operation so far; starts at 1.
    attempt: u32,
    /// Retries consumed; the loop stops retrying at `retry_count`.
    retries: u32,
}

impl<T, E> Execution<T, E> {
    /// Validates the accumulated policy and binds a fresh engine to it.
    ///
    /// Sequence- and matcher-valued options are cloned here so that this
    /// call owns an independent copy of every mutable piece.
    pub(crate) fn from_builder(builder: &Retry<T, E>) -> Result<Self, ConfigError> {
        if let Some(delay) = &builder.delay {
            delay.validate(builder.retry_count)?;
        }
        if let Some(timeout) = &builder.timeout {
            timeout.validate()?;
        }
        Ok(Self {
            retry_count: builder.retry_count,
            only: builder.only.clone(),
            skip: builder.skip.clone(),
            delay: builder.delay.as_ref().map(DelayState::new),
            timeout: builder.timeout.clone(),
            fallback: builder.fallback.clone(),
            logging: builder.logging,
            attempt: 1,
            retries: 0,
        })
    }

    /// Drives the loop to its single terminal outcome.
    pub(crate) async fn run<F, Fut>(mut self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        loop {
            let error = match run_once(&mut op, self.attempt, self.timeout.as_ref()).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if self.retries >= self.retry_count {
                return match self.fallback.take() {
                    Some(fallback) => Ok(fallback(error, self.attempt).await),
                    None => Err(error),
                };
            }

            if !self.should_retry(&error) {
                return Err(error);
            }

            self.attempt += 1;
            self.retries += 1;

            if let Some(delay) = self.delay.as_mut() {
                // Zero-based retry index: the first retry is attempt 2.
                let wait = delay.next(self.attempt - 2)?;
                if self.logging {
                    tracing::debug!(
                        attempt = self.attempt,
                        delay_ms = wait.as_millis() as u64,
                        "retry scheduled"
                    );
                }
                time::sleep(wait).await;
            }
        }
    }

    pub(crate) async fn run_safe<F, Fut>(self, op: F) -> SafeOutcome<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        match self.run(op).await {
            Ok(value) => SafeOutcome::success(value),
            Err(error) => SafeOutcome::failure(error),
        }
    }

    /// Deny list first, then the allow list: a skip match propagates, a
    /// non-empty `only` list without a match propagates, anything else
    /// retries.
    fn should_retry(&self, error: &RetryError<E>) -> bool {
        if self.skip.iter().any(|matcher| matcher.matches(error)) {
            return false;
        }
        if !self.only.is_empty() && !self.only.iter().any(|matcher| matcher.matches(error)) {
            return false;
        }
        true
    }
}
