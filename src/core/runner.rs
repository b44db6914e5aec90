//! # Run a single attempt of the wrapped operation.
//!
//! Executes one attempt, racing it against the timeout timer and the
//! external cancellation signal when a [`TimeoutPolicy`] is configured.
//!
//! ## Race outcomes
//! ```text
//! No timeout policy:
//!   op(attempt) → awaited inline → Ok(value) | Err(Operation)
//!
//! With a timeout policy:
//!   signal already cancelled → Err(Aborted), operation never invoked
//!   operation settles first  → its outcome wins, timer dropped
//!   timer elapses first      → Err(Timeout), operation abandoned
//!   signal fires mid-flight  → Err(Aborted), operation abandoned
//! ```
//!
//! ## Rules
//! - The attempt is spawned onto the runtime when a timeout policy is
//!   present, so losing the race only stops the *wait*: the operation
//!   keeps running unobserved and its eventual outcome is discarded.
//! - The timer future is dropped whichever path wins.
//! - A panicking operation panics the caller, exactly as it would when
//!   awaited inline.

use std::future::Future;

use tokio::{select, time};

use crate::error::RetryError;
use crate::policies::TimeoutPolicy;

pub(crate) const ABORTED_BEFORE_ATTEMPT: &str =
    "cancellation signal was set before the attempt started";
pub(crate) const ABORTED_MID_ATTEMPT: &str =
    "cancellation signal fired while awaiting the operation";

/// Executes one attempt of `op`, passing it the current attempt number.
pub(crate) async fn run_once<T, E, F, Fut>(
    op: &mut F,
    attempt: u32,
    timeout: Option<&TimeoutPolicy>,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let Some(policy) = timeout else {
        return op(attempt).await.map_err(RetryError::Operation);
    };

    if let Some(signal) = &policy.signal {
        if signal.is_cancelled() {
            return Err(RetryError::Aborted {
                reason: ABORTED_BEFORE_ATTEMPT.to_string(),
            });
        }
    }

    // The attempt runs as its own task: when the timer or the signal wins
    // the race, the handle is dropped and the operation keeps running.
    let mut handle = tokio::spawn(op(attempt));

    let timer = time::sleep(policy.timeout);
    tokio::pin!(timer);

    let signal = policy.signal.clone();
    let cancelled = async move {
        match signal {
            Some(signal) => signal.cancelled_owned().await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(cancelled);

    select! {
        joined = &mut handle => settle(joined),
        _ = &mut timer => Err(RetryError::Timeout {
            timeout: policy.timeout,
            message: policy.timeout_message(),
        }),
        _ = &mut cancelled => Err(RetryError::Aborted {
            reason: ABORTED_MID_ATTEMPT.to_string(),
        }),
    }
}

fn settle<T, E>(
    joined: Result<Result<T, E>, tokio::task::JoinError>,
) -> Result<T, RetryError<E>> {
    match joined {
        Ok(outcome) => outcome.map_err(RetryError::Operation),
        Err(join) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
        Err(_) => Err(RetryError::Aborted {
            reason: "runtime shut down while the attempt was in flight".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time;
    use tokio_util::sync::CancellationToken;

    use crate::core::retry;
    use crate::error::RetryError;
    use crate::policies::{ErrorMatcher, TimeoutPolicy};

    #[derive(Debug, thiserror::Error, PartialEq)]
    enum TestError {
        #[error("transient failure")]
        Transient,
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_settles_before_timeout() {
        let result: Result<&str, RetryError<TestError>> = retry(0)
            .with_timeout(Duration::from_secs(1))
            .run(|_| async {
                time::sleep(Duration::from_millis(100)).await;
                Ok("done")
            })
            .await;
        assert_eq!(result.unwrap(), "done");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_carries_default_message() {
        let result: Result<(), RetryError<TestError>> = retry(0)
            .with_timeout(Duration::from_millis(50))
            .run(|_| async {
                time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        match result {
            Err(RetryError::Timeout { timeout, message }) => {
                assert_eq!(timeout, Duration::from_millis(50));
                assert_eq!(message, "operation timed out after 50 ms");
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_carries_custom_message() {
        let result: Result<(), RetryError<TestError>> = retry(0)
            .with_timeout(
                TimeoutPolicy::after(Duration::from_millis(50)).with_message("too slow"),
            )
            .run(|_| async {
                time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        match result {
            Err(RetryError::Timeout { message, .. }) => assert_eq!(message, "too slow"),
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pre_cancelled_signal_skips_the_operation() {
        let signal = CancellationToken::new();
        signal.cancel();

        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<(), RetryError<TestError>> = retry(0)
            .with_timeout(
                TimeoutPolicy::after(Duration::from_secs(1)).with_signal(signal),
            )
            .run(move |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        match result {
            Err(RetryError::Aborted { reason }) => {
                assert!(reason.contains("before the attempt started"), "{reason}");
            }
            other => panic!("expected an abort, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_fires_mid_flight() {
        let signal = CancellationToken::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result: Result<(), RetryError<TestError>> = retry(0)
            .with_timeout(
                TimeoutPolicy::after(Duration::from_secs(5)).with_signal(signal),
            )
            .run(|_| async {
                time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;

        match result {
            Err(RetryError::Aborted { reason }) => {
                assert!(reason.contains("while awaiting"), "{reason}");
            }
            other => panic!("expected an abort, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_operation_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let result: Result<(), RetryError<TestError>> = retry(0)
            .with_timeout(Duration::from_millis(50))
            .run(move |_| {
                let flag = flag.clone();
                async move {
                    time::sleep(Duration::from_millis(200)).await;
                    flag.store(true, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        assert!(matches!(result, Err(RetryError::Timeout { .. })));
        assert!(!finished.load(Ordering::SeqCst));

        // The wait was abandoned, not the operation: let it finish.
        time::sleep(Duration::from_millis(500)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_is_propagated_immediately_when_skip_listed() {
        let signal = CancellationToken::new();
        signal.cancel();

        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<(), RetryError<TestError>> = retry(3)
            .skip_errors([ErrorMatcher::aborts()])
            .with_timeout(
                TimeoutPolicy::after(Duration::from_secs(1)).with_signal(signal),
            )
            .run(move |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(result, Err(RetryError::Aborted { .. })));
    }
}
