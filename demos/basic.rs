//! # Example: basic
//!
//! Retry a flaky operation with an exponential delay schedule.
//!
//! Demonstrates how to:
//! - Open a chain with [`retry`] and a budget of retries.
//! - Space attempts out with [`DelayPolicy::exponential`].
//! - Filter which failures are worth retrying with [`ErrorMatcher::when`].
//!
//! ## Flow
//! ```text
//! retry(4) ──► run(op)
//!     ├─► attempt 1 ─ fails (connection) ─► sleep 50ms
//!     ├─► attempt 2 ─ fails (connection) ─► sleep 100ms
//!     └─► attempt 3 ─ succeeds ─► "payload"
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic
//! ```

use std::time::Duration;

use retrykit::{retry, DelayPolicy, ErrorMatcher, RetryError};

#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("connection refused")]
    Connection,
    #[error("unauthorized")]
    Unauthorized,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), RetryError<FetchError>> {
    // 1. A budget of four retries, but only connection trouble is worth them.
    let policy = retry(4)
        .only_errors([ErrorMatcher::when(|e: &FetchError| {
            matches!(e, FetchError::Connection)
        })])
        .with_delay(DelayPolicy::exponential(Duration::from_millis(50), 2.0));

    // 2. A flaky "fetch" that needs a couple of attempts to come up.
    let payload = policy
        .run(|attempt| async move {
            println!("[fetch] attempt {attempt}");
            if attempt < 3 {
                Err(FetchError::Connection)
            } else {
                Ok("payload")
            }
        })
        .await?;

    println!("[fetch] got {payload:?}");
    Ok(())
}
