//! # Example: fallback
//!
//! Bound each attempt with a timeout and serve a stale value once the
//! budget is exhausted.
//!
//! Demonstrates how to:
//! - Bound an attempt's wait with [`TimeoutPolicy`] (the slow operation is
//!   abandoned, never interrupted).
//! - Substitute a fallback result after the last failure.
//! - Watch computed delays with `with_logging` + `tracing`.
//!
//! ## Run
//! ```bash
//! RUST_LOG=retrykit=debug cargo run --example fallback
//! ```

use std::time::Duration;

use retrykit::{retry, RetryError, TimeoutPolicy};

#[derive(Debug, thiserror::Error)]
enum CacheError {
    #[error("backend unavailable")]
    Unavailable,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Two retries, 200ms per attempt, stale answer when everything fails.
    let answer: Result<&str, RetryError<CacheError>> = retry(2)
        .with_timeout(TimeoutPolicy::after(Duration::from_millis(200)))
        .with_delay(Duration::from_millis(100))
        .with_logging(true)
        .with_fallback(|error, attempt| async move {
            println!("[cache] attempt {attempt} still failing ({error}), serving stale");
            "stale-value"
        })
        .run(|attempt| async move {
            println!("[cache] attempt {attempt}");
            // The backend never answers in time.
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("fresh-value")
        })
        .await;

    match answer {
        Ok(value) => println!("[cache] -> {value}"),
        Err(error) => println!("[cache] -> error: {error}"),
    }
}
