//! # Delay policy for spacing out retries.
//!
//! [`DelayPolicy`] controls how long the engine waits between a retryable
//! failure and the next attempt. Four shapes are supported:
//!
//! - [`DelayPolicy::Fixed`] — the same wait before every retry;
//! - [`DelayPolicy::Sequence`] — an explicit per-retry schedule, consumed
//!   front-to-back, whose length must equal the retry budget exactly;
//! - [`DelayPolicy::Exponential`] — `initial × factor^k` for the k-th retry
//!   (k = 0, 1, …), unbounded but saturating instead of overflowing;
//! - [`DelayPolicy::Jittered`] — uniform random in `[min, max)`, optionally
//!   scaled by `factor^k` to grow the randomized window across retries.
//!
//! Every delay must be strictly positive; validation runs once per
//! execution, before the first attempt.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use retrykit::DelayPolicy;
//!
//! // 100ms, 200ms, 400ms, ...
//! let delay = DelayPolicy::exponential(Duration::from_millis(100), 2.0);
//!
//! // Explicit schedule for a budget of three retries.
//! let schedule = DelayPolicy::sequence([
//!     Duration::from_millis(50),
//!     Duration::from_millis(200),
//!     Duration::from_secs(1),
//! ]);
//! # let _ = (delay, schedule);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use rand::Rng;

use crate::error::ConfigError;

/// Inter-retry delay strategy.
///
/// Stored verbatim by the builder; validated against the retry budget when
/// an engine is materialized.
#[derive(Clone, Debug, PartialEq)]
pub enum DelayPolicy {
    /// The same wait before every retry. Must be greater than zero.
    Fixed(Duration),

    /// One wait per retry, in order. The length must equal the retry
    /// budget exactly and every entry must be greater than zero.
    Sequence(Vec<Duration>),

    /// `initial × factor^k` for the k-th retry (zero-based).
    Exponential {
        /// Wait before the first retry. Must be greater than zero.
        initial: Duration,
        /// Multiplicative growth factor (`>= 1`, finite).
        factor: f64,
    },

    /// Uniform random wait in `[min, max)`, optionally scaled by
    /// `factor^k` across retries.
    Jittered {
        /// Lower bound (inclusive). Must be greater than zero.
        min: Duration,
        /// Upper bound (exclusive). Must be above `min`.
        max: Duration,
        /// Optional growth factor applied to the sampled value.
        factor: Option<f64>,
    },
}

impl DelayPolicy {
    /// Fixed wait before every retry.
    pub fn fixed(delay: Duration) -> Self {
        DelayPolicy::Fixed(delay)
    }

    /// Explicit per-retry schedule, consumed front-to-back.
    pub fn sequence<I>(delays: I) -> Self
    where
        I: IntoIterator<Item = Duration>,
    {
        DelayPolicy::Sequence(delays.into_iter().collect())
    }

    /// Exponentially growing wait: `initial × factor^k`.
    pub fn exponential(initial: Duration, factor: f64) -> Self {
        DelayPolicy::Exponential { initial, factor }
    }

    /// Uniform random wait in `[min, max)`.
    pub fn jittered(min: Duration, max: Duration) -> Self {
        DelayPolicy::Jittered {
            min,
            max,
            factor: None,
        }
    }

    /// Uniform random wait in `[min, max)`, scaled by `factor^k`.
    pub fn jittered_scaled(min: Duration, max: Duration, factor: f64) -> Self {
        DelayPolicy::Jittered {
            min,
            max,
            factor: Some(factor),
        }
    }

    /// Checks the policy against the retry budget.
    ///
    /// Runs once per execution, before the first attempt. All delays must
    /// be strictly positive, factors finite and at least 1, sequences the
    /// exact length of the budget, and jitter ranges non-empty.
    pub(crate) fn validate(&self, retry_count: u32) -> Result<(), ConfigError> {
        match self {
            DelayPolicy::Fixed(delay) => ensure_positive(*delay),
            DelayPolicy::Sequence(delays) => {
                if delays.len() != retry_count as usize {
                    return Err(ConfigError::SequenceLength {
                        expected: retry_count,
                        actual: delays.len(),
                    });
                }
                delays.iter().try_for_each(|d| ensure_positive(*d))
            }
            DelayPolicy::Exponential { initial, factor } => {
                ensure_positive(*initial)?;
                ensure_factor(*factor)
            }
            DelayPolicy::Jittered { min, max, factor } => {
                ensure_positive(*min)?;
                ensure_positive(*max)?;
                if min >= max {
                    return Err(ConfigError::InvalidJitterRange {
                        min: *min,
                        max: *max,
                    });
                }
                match factor {
                    Some(f) => ensure_factor(*f),
                    None => Ok(()),
                }
            }
        }
    }
}

impl From<Duration> for DelayPolicy {
    fn from(delay: Duration) -> Self {
        DelayPolicy::Fixed(delay)
    }
}

impl From<Vec<Duration>> for DelayPolicy {
    fn from(delays: Vec<Duration>) -> Self {
        DelayPolicy::Sequence(delays)
    }
}

/// Per-execution delay cursor.
///
/// Owns a private copy of the policy so that consuming an explicit
/// sequence in one call can never corrupt another call's view of the same
/// builder.
#[derive(Clone, Debug)]
pub(crate) enum DelayState {
    Fixed(Duration),
    Sequence(VecDeque<Duration>),
    Exponential { initial: Duration, factor: f64 },
    Jittered {
        min: Duration,
        max: Duration,
        factor: Option<f64>,
    },
}

impl DelayState {
    pub(crate) fn new(policy: &DelayPolicy) -> Self {
        match policy {
            DelayPolicy::Fixed(delay) => DelayState::Fixed(*delay),
            DelayPolicy::Sequence(delays) => {
                DelayState::Sequence(delays.iter().copied().collect())
            }
            DelayPolicy::Exponential { initial, factor } => DelayState::Exponential {
                initial: *initial,
                factor: *factor,
            },
            DelayPolicy::Jittered { min, max, factor } => DelayState::Jittered {
                min: *min,
                max: *max,
                factor: *factor,
            },
        }
    }

    /// Computes the wait for the given retry (zero-indexed).
    ///
    /// Explicit sequences are consumed one entry per call; running dry is
    /// reported as [`ConfigError::SequenceExhausted`] rather than skipped.
    pub(crate) fn next(&mut self, retry_index: u32) -> Result<Duration, ConfigError> {
        match self {
            DelayState::Fixed(delay) => Ok(*delay),
            DelayState::Sequence(remaining) => remaining
                .pop_front()
                .ok_or(ConfigError::SequenceExhausted {
                    retry: retry_index + 1,
                }),
            DelayState::Exponential { initial, factor } => {
                Ok(scaled(*initial, *factor, retry_index))
            }
            DelayState::Jittered { min, max, factor } => {
                let sampled = sample_uniform(*min, *max);
                Ok(match factor {
                    Some(f) => scaled(sampled, *f, retry_index),
                    None => sampled,
                })
            }
        }
    }
}

/// `base × factor^retry_index`, saturating to `Duration::MAX` when the
/// product is non-finite or too large to represent.
fn scaled(base: Duration, factor: f64, retry_index: u32) -> Duration {
    let exp = retry_index.min(i32::MAX as u32) as i32;
    let secs = base.as_secs_f64() * factor.powi(exp);
    if secs.is_finite() && secs >= 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::MAX
    }
}

/// Uniform sample from `[min, max)` at millisecond granularity.
fn sample_uniform(min: Duration, max: Duration) -> Duration {
    let min_ms = min.as_millis() as u64;
    let max_ms = max.as_millis() as u64;
    if max_ms <= min_ms {
        return min;
    }
    let mut rng = rand::rng();
    Duration::from_millis(rng.random_range(min_ms..max_ms))
}

fn ensure_positive(delay: Duration) -> Result<(), ConfigError> {
    if delay.is_zero() {
        Err(ConfigError::ZeroDelay)
    } else {
        Ok(())
    }
}

fn ensure_factor(factor: f64) -> Result<(), ConfigError> {
    if factor.is_finite() && factor >= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidFactor { factor })
    }
}
