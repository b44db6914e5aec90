//! # retrykit
//!
//! **Retrykit** is a retry/backoff execution wrapper for fallible async
//! operations.
//!
//! It re-invokes an operation on failure according to a configurable
//! policy: attempt budget, error filtering, delay strategy, per-attempt
//! timeout, and an optional fallback once the budget is exhausted. The
//! crate is a single in-process control-flow engine — no persisted state,
//! no wire protocol.
//!
//! ## Architecture
//! ### Overview
//! ```text
//! retry(count) ──► Retry<T, E>  (fluent builder, reusable across calls)
//!       │  .only_errors(..)  .skip_errors(..)
//!       │  .with_delay(..)   .with_timeout(..)
//!       │  .with_fallback(..) .with_logging(..)
//!       ▼
//!   run(op) / run_safe(op)
//!       │  one Execution per call: fresh counters,
//!       │  private copy of sequence-valued options
//!       ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  Execution (retry loop)                                   │
//! │  - run_once: race operation | timeout timer | signal      │
//! │  - classify failures via skip/only matcher lists          │
//! │  - DelayState: fixed / sequence / exponential / jittered  │
//! │  - fallback on budget exhaustion                          │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! loop {
//!   ├─► run_once(op, attempt, timeout)
//!   │       ├─ Ok(value)          ─► return Ok(value)
//!   │       └─ Err(failure)
//!   │            ├─ budget exhausted ─► fallback(error, attempt) | Err(error)
//!   │            ├─ skip matches     ─► Err(error)
//!   │            ├─ only misses      ─► Err(error)
//!   │            └─ retryable        ─► attempt += 1 ─► sleep(delay) ─► loop
//! }
//! ```
//!
//! ## Semantics worth knowing
//! - **Budget**: `retry(n)` allows `n` retries, so the operation runs at
//!   most `n + 1` times. The operation receives the 1-based attempt number.
//! - **Abandon, don't cancel**: when an attempt's timer or abort signal
//!   wins the race, the engine stops *waiting* — the operation itself is
//!   never interrupted, and side effects of an abandoned attempt may still
//!   land later.
//! - **Filters are kind-precise**: [`ErrorMatcher::when`] targets the
//!   operation's own errors; fired timeouts and signal aborts are matched
//!   only by [`ErrorMatcher::timeouts`] / [`ErrorMatcher::aborts`].
//! - **Validation is fail-fast**: malformed delay/timeout policies surface
//!   as [`RetryError::Config`] before the first attempt, and are never
//!   retried or passed to the fallback.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use retrykit::{retry, DelayPolicy, ErrorMatcher, RetryError};
//!
//! #[derive(Debug, thiserror::Error)]
//! enum FetchError {
//!     #[error("connection refused")]
//!     Connection,
//!     #[error("unauthorized")]
//!     Unauthorized,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let result: Result<&str, RetryError<FetchError>> = retry(3)
//!         .only_errors([ErrorMatcher::when(|e: &FetchError| {
//!             matches!(e, FetchError::Connection)
//!         })])
//!         .with_delay(DelayPolicy::exponential(Duration::from_millis(1), 2.0))
//!         .run(|attempt| async move {
//!             if attempt < 3 {
//!                 Err(FetchError::Connection)
//!             } else {
//!                 Ok("fetched")
//!             }
//!         })
//!         .await;
//!
//!     assert_eq!(result.unwrap(), "fetched");
//! }
//! ```

mod core;
mod error;
mod outcome;
mod policies;

// ---- Public re-exports ----

pub use crate::core::{retry, Retry};
pub use error::{ConfigError, RetryError};
pub use outcome::SafeOutcome;
pub use policies::{DelayPolicy, ErrorMatcher, TimeoutPolicy};
