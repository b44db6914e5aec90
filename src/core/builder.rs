//! # Fluent configuration builder.
//!
//! [`retry`] opens a chain that accumulates the policy for one kind of
//! operation; the terminal calls ([`Retry::run`], [`Retry::run_safe`])
//! materialize a fresh engine per invocation and delegate to it.
//!
//! Option order is irrelevant and the last call per option wins. The
//! builder itself is cheap to clone and safe to reuse: every terminal call
//! gets its own engine with fresh attempt/retry counters and a private
//! copy of any sequence-valued configuration.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::core::engine::{BoxFallbackFuture, Execution, FallbackFn};
use crate::error::RetryError;
use crate::outcome::SafeOutcome;
use crate::policies::{DelayPolicy, ErrorMatcher, TimeoutPolicy};

/// Opens a retry chain with the given budget.
///
/// The budget is the maximum number of *retries*; the operation is invoked
/// at most `count + 1` times.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use retrykit::{retry, RetryError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let result: Result<&str, RetryError<std::io::Error>> = retry(2)
///     .with_delay(Duration::from_millis(1))
///     .run(|attempt| async move {
///         if attempt < 3 {
///             Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "flaky"))
///         } else {
///             Ok("ready")
///         }
///     })
///     .await;
/// assert_eq!(result.unwrap(), "ready");
/// # }
/// ```
pub fn retry<T, E>(count: u32) -> Retry<T, E> {
    Retry::new(count)
}

/// Accumulated retry policy for operations yielding `T` and failing with `E`.
///
/// Built by [`retry`]; executed by [`Retry::run`] / [`Retry::run_safe`].
pub struct Retry<T, E> {
    pub(crate) retry_count: u32,
    pub(crate) only: Vec<ErrorMatcher<E>>,
    pub(crate) skip: Vec<ErrorMatcher<E>>,
    pub(crate) delay: Option<DelayPolicy>,
    pub(crate) timeout: Option<TimeoutPolicy>,
    pub(crate) fallback: Option<FallbackFn<T, E>>,
    pub(crate) logging: bool,
}

impl<T, E> Retry<T, E> {
    fn new(retry_count: u32) -> Self {
        Self {
            retry_count,
            only: Vec::new(),
            skip: Vec::new(),
            delay: None,
            timeout: None,
            fallback: None,
            logging: false,
        }
    }

    /// Replaces the allow list: when non-empty, only matched failures are
    /// retried; anything else propagates on first occurrence.
    pub fn only_errors<I>(mut self, matchers: I) -> Self
    where
        I: IntoIterator<Item = ErrorMatcher<E>>,
    {
        self.only = matchers.into_iter().collect();
        self
    }

    /// Replaces the deny list: a matched failure propagates immediately,
    /// regardless of the allow list.
    pub fn skip_errors<I>(mut self, matchers: I) -> Self
    where
        I: IntoIterator<Item = ErrorMatcher<E>>,
    {
        self.skip = matchers.into_iter().collect();
        self
    }

    /// Sets the inter-retry delay policy. Validated when an engine is
    /// built, not here.
    pub fn with_delay(mut self, delay: impl Into<DelayPolicy>) -> Self {
        self.delay = Some(delay.into());
        self
    }

    /// Sets the per-attempt timeout policy. Validated when an engine is
    /// built, not here.
    pub fn with_timeout(mut self, timeout: impl Into<TimeoutPolicy>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Installs a substitute result producer, invoked once when the budget
    /// is exhausted and the last attempt still failed. Receives the
    /// terminal error and the final attempt number.
    pub fn with_fallback<F, Fut>(mut self, fallback: F) -> Self
    where
        F: Fn(RetryError<E>, u32) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let fallback: FallbackFn<T, E> =
            Arc::new(move |error, attempt| -> BoxFallbackFuture<T> {
                Box::pin(fallback(error, attempt))
            });
        self.fallback = Some(fallback);
        self
    }

    /// Enables diagnostic emission of computed delay values via `tracing`.
    /// No behavioral effect.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    /// Executes `op` under this policy and propagates the terminal error.
    ///
    /// `op` receives the 1-based attempt number and may fail with any `E`;
    /// its future must be `Send + 'static` because attempts bounded by a
    /// timeout are spawned so they can outlive an abandoned wait.
    pub async fn run<F, Fut>(&self, op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let engine = Execution::from_builder(self)?;
        engine.run(op).await
    }

    /// Executes `op` under this policy, folding the terminal outcome into
    /// a [`SafeOutcome`] pair instead of failing.
    pub async fn run_safe<F, Fut>(&self, op: F) -> SafeOutcome<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        match Execution::from_builder(self) {
            Ok(engine) => engine.run_safe(op).await,
            Err(config) => SafeOutcome::failure(RetryError::Config(config)),
        }
    }
}

impl<T, E> Clone for Retry<T, E> {
    fn clone(&self) -> Self {
        Self {
            retry_count: self.retry_count,
            only: self.only.clone(),
            skip: self.skip.clone(),
            delay: self.delay.clone(),
            timeout: self.timeout.clone(),
            fallback: self.fallback.clone(),
            logging: self.logging,
        }
    }
}

impl<T, E> fmt::Debug for Retry<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("retry_count", &self.retry_count)
            .field("only", &self.only.len())
            .field("skip", &self.skip.len())
            .field("delay", &self.delay)
            .field("timeout", &self.timeout)
            .field("fallback", &self.fallback.is_some())
            .field("logging", &self.logging)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::retry;
    use crate::error::{ConfigError, RetryError};
    use crate::policies::DelayPolicy;

    #[derive(Debug, thiserror::Error, PartialEq)]
    enum TestError {
        #[error("transient failure")]
        Transient,
    }

    #[tokio::test]
    async fn test_sequence_length_mismatch_fails_before_any_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<(), RetryError<TestError>> = retry(2)
            .with_delay(DelayPolicy::sequence([Duration::from_millis(10)]))
            .run(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            result,
            Err(RetryError::Config(ConfigError::SequenceLength {
                expected: 2,
                actual: 1
            }))
        );
    }

    #[tokio::test]
    async fn test_zero_delay_is_a_config_error() {
        let result: Result<(), RetryError<TestError>> = retry(1)
            .with_delay(Duration::ZERO)
            .run(|_| async { Ok(()) })
            .await;
        assert_eq!(result, Err(RetryError::Config(ConfigError::ZeroDelay)));
    }

    #[tokio::test]
    async fn test_zero_timeout_is_a_config_error() {
        let result: Result<(), RetryError<TestError>> = retry(1)
            .with_timeout(Duration::ZERO)
            .run(|_| async { Ok(()) })
            .await;
        assert_eq!(result, Err(RetryError::Config(ConfigError::ZeroTimeout)));
    }

    #[tokio::test]
    async fn test_last_delay_setting_wins() {
        let result: Result<(), RetryError<TestError>> = retry(1)
            .with_delay(Duration::ZERO)
            .with_delay(Duration::from_millis(1))
            .run(|_| async { Ok(()) })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_safe_success_pair() {
        let outcome = retry(1)
            .run_safe(|attempt| async move {
                if attempt == 1 {
                    Err(TestError::Transient)
                } else {
                    Ok(7)
                }
            })
            .await;

        assert!(outcome.is_ok());
        assert_eq!(outcome.result(), Some(&7));
        assert!(outcome.error().is_none());
    }

    #[tokio::test]
    async fn test_run_safe_failure_pair() {
        let outcome = retry(1)
            .run_safe(|_| async { Err::<i32, _>(TestError::Transient) })
            .await;

        assert!(!outcome.is_ok());
        assert!(outcome.result().is_none());
        assert!(matches!(
            outcome.error(),
            Some(RetryError::Operation(TestError::Transient))
        ));
    }

    #[tokio::test]
    async fn test_run_safe_captures_config_errors() {
        let outcome = retry(1)
            .with_timeout(Duration::ZERO)
            .run_safe(|_| async { Ok::<i32, TestError>(1) })
            .await;

        assert!(!outcome.is_ok());
        assert!(matches!(outcome.error(), Some(RetryError::Config(_))));
    }

    #[tokio::test]
    async fn test_builder_reuse_gets_fresh_counters() {
        let builder = retry(2);

        let first = Arc::new(Mutex::new(Vec::new()));
        let recorder = first.clone();
        let _ = builder
            .run(move |attempt| {
                recorder.lock().unwrap().push(attempt);
                async move { Err::<(), _>(TestError::Transient) }
            })
            .await;

        let second = Arc::new(Mutex::new(Vec::new()));
        let recorder = second.clone();
        let result = builder
            .run(move |attempt| {
                recorder.lock().unwrap().push(attempt);
                async move { Ok::<(), TestError>(()) }
            })
            .await;

        assert_eq!(*first.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(*second.lock().unwrap(), vec![1]);
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_builder_reuse_does_not_consume_the_shared_sequence() {
        let builder = retry(1).with_delay(DelayPolicy::sequence([Duration::from_millis(100)]));

        for _ in 0..2 {
            let start = tokio::time::Instant::now();
            let result = builder
                .run(|_| async { Err::<(), _>(TestError::Transient) })
                .await;
            assert!(result.is_err());
            assert_eq!(start.elapsed(), Duration::from_millis(100));
        }
    }

    #[tokio::test]
    async fn test_cloned_builder_is_equivalent() {
        let builder = retry(1).with_delay(Duration::from_millis(1));
        let clone = builder.clone();

        let result = clone
            .run(|attempt| async move {
                if attempt == 1 {
                    Err(TestError::Transient)
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
    }
}
