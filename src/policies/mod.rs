//! Retry policies.
//!
//! This module groups the knobs that control **whether** a failure is
//! retried and **how long** to wait between attempts.
//!
//! ## Contents
//! - [`DelayPolicy`] how waits between retries are computed (fixed /
//!   sequence / exponential / jittered)
//! - [`TimeoutPolicy`] how long one attempt is awaited, plus the external
//!   abort signal
//! - [`ErrorMatcher`] which failure classes the allow/deny lists target
//!
//! ## Quick wiring
//! ```text
//! Retry { only, skip, delay, timeout, .. }
//!      └─► core::engine::Execution uses:
//!           - skip/only matchers to decide retry vs propagate
//!           - DelayState::next(retry_index) to schedule the next attempt
//!           - TimeoutPolicy to bound each attempt's wait
//! ```

mod delay;
mod filter;
mod timeout;

pub use delay::DelayPolicy;
pub(crate) use delay::DelayState;
pub use filter::ErrorMatcher;
pub use timeout::TimeoutPolicy;
