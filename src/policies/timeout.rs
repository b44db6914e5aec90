//! # Per-attempt timeout policy.
//!
//! [`TimeoutPolicy`] bounds how long the engine *waits* for one attempt.
//! When the timer elapses first, the attempt fails with a timeout error;
//! the operation itself keeps running unobserved — it is abandoned, never
//! interrupted.
//!
//! An optional [`CancellationToken`] rides along as an external abort
//! signal: cancelling it fails the current attempt's wait (and skips the
//! attempt entirely when already cancelled), without stopping the retry
//! loop's intent to retry.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use retrykit::TimeoutPolicy;
//!
//! let signal = CancellationToken::new();
//! let policy = TimeoutPolicy::after(Duration::from_secs(2))
//!     .with_message("upstream took too long")
//!     .with_signal(signal.clone());
//! assert_eq!(policy.timeout, Duration::from_secs(2));
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::ConfigError;

/// Timeout configuration for a single attempt's wait.
///
/// A bare [`Duration`] converts into a policy with no custom message and
/// no signal.
#[derive(Clone, Debug)]
pub struct TimeoutPolicy {
    /// How long to wait for the operation to settle. Must be greater
    /// than zero.
    pub timeout: Duration,
    /// Message carried by the timeout error. When absent, a default
    /// embedding the duration in milliseconds is used.
    pub message: Option<String>,
    /// External abort signal raced against the attempt.
    pub signal: Option<CancellationToken>,
}

impl TimeoutPolicy {
    /// Creates a policy that waits `timeout` per attempt.
    pub fn after(timeout: Duration) -> Self {
        Self {
            timeout,
            message: None,
            signal: None,
        }
    }

    /// Sets a custom message for the timeout error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches an external cancellation signal.
    pub fn with_signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            Err(ConfigError::ZeroTimeout)
        } else {
            Ok(())
        }
    }

    /// Message for a fired timeout: the custom one if configured, else a
    /// default embedding the duration in milliseconds.
    pub(crate) fn timeout_message(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => format!("operation timed out after {} ms", self.timeout.as_millis()),
        }
    }
}

impl From<Duration> for TimeoutPolicy {
    fn from(timeout: Duration) -> Self {
        TimeoutPolicy::after(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timeout_rejected() {
        assert_eq!(
            TimeoutPolicy::after(Duration::ZERO).validate(),
            Err(ConfigError::ZeroTimeout)
        );
        assert!(TimeoutPolicy::after(Duration::from_millis(1)).validate().is_ok());
    }

    #[test]
    fn test_default_message_embeds_millis() {
        let policy = TimeoutPolicy::after(Duration::from_millis(1500));
        assert_eq!(policy.timeout_message(), "operation timed out after 1500 ms");
    }

    #[test]
    fn test_custom_message_wins() {
        let policy = TimeoutPolicy::after(Duration::from_secs(1)).with_message("too slow");
        assert_eq!(policy.timeout_message(), "too slow");
    }

    #[test]
    fn test_duration_converts_to_bare_policy() {
        let policy: TimeoutPolicy = Duration::from_secs(3).into();
        assert_eq!(policy.timeout, Duration::from_secs(3));
        assert!(policy.message.is_none());
        assert!(policy.signal.is_none());
    }
}
