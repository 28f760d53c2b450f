//! How long to wait, and how often to try again, after a transient tile
//! fetch failure.
//!
//! ```ignore
//! use aerotiles::fetch::RetryPolicy;
//!
//! // one attempt plus three retries: ~500ms, ~1s, ~2s
//! let policy = RetryPolicy::from_retries(3);
//! ```

use std::time::Duration;

use rand::Rng;

/// First backoff step, in milliseconds.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;

/// Ceiling on a single backoff step, in seconds.
pub const DEFAULT_MAX_DELAY_SECS: u64 = 30;

/// Growth factor between consecutive backoff steps.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Share of each step that is randomized.
pub const DEFAULT_JITTER: f64 = 0.25;

/// Retry schedule applied to transient failures.
///
/// Permanent failures end the fetch at once whatever the policy says.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum RetryPolicy {
    /// Single attempt.
    #[default]
    None,

    /// Constant pause between attempts.
    Fixed { max_attempts: u32, delay: Duration },

    /// Step `n` waits `initial_delay * multiplier^(n-1)`, capped at
    /// `max_delay`, then moved by up to `jitter` of itself in either
    /// direction so workers that failed together do not retry together.
    ExponentialBackoff {
        /// Total attempts, the first one included.
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        multiplier: f64,
        /// 0.0 ..= 1.0
        jitter: f64,
    },
}

impl RetryPolicy {
    /// Policy for `retry_limit` retries after the first attempt, using the
    /// default backoff curve. A limit of 0 is [`RetryPolicy::None`].
    pub fn from_retries(retry_limit: u32) -> Self {
        if retry_limit == 0 {
            return Self::None;
        }
        Self::ExponentialBackoff {
            max_attempts: retry_limit.saturating_add(1),
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter: DEFAULT_JITTER,
        }
    }

    /// Replaces the curve of a backoff policy. Other policies pass through.
    pub fn with_backoff(self, initial_delay: Duration, max_delay: Duration, jitter: f64) -> Self {
        if let Self::ExponentialBackoff {
            max_attempts,
            multiplier,
            ..
        } = self
        {
            Self::ExponentialBackoff {
                max_attempts,
                initial_delay,
                max_delay,
                multiplier,
                jitter: jitter.clamp(0.0, 1.0),
            }
        } else {
            self
        }
    }

    /// Total attempts allowed for one tile.
    pub fn attempts(&self) -> u32 {
        match *self {
            Self::None => 1,
            Self::Fixed { max_attempts, .. } | Self::ExponentialBackoff { max_attempts, .. } => {
                max_attempts
            }
        }
    }

    /// Un-jittered pause after attempt number `failed` (1-based) went wrong.
    /// `None` once the attempts are used up.
    pub fn backoff_after(&self, failed: u32) -> Option<Duration> {
        if failed >= self.attempts() {
            return None;
        }
        match *self {
            Self::None => None,
            Self::Fixed { delay, .. } => Some(delay),
            Self::ExponentialBackoff {
                initial_delay,
                max_delay,
                multiplier,
                ..
            } => {
                let exponent = i32::try_from(failed - 1).unwrap_or(i32::MAX);
                let step_ms = initial_delay.as_millis() as f64 * multiplier.powi(exponent);
                Some(Duration::from_millis(step_ms as u64).min(max_delay))
            }
        }
    }

    /// Pause to actually sleep after attempt `failed`, jitter included.
    pub fn retry_delay(&self, failed: u32) -> Option<Duration> {
        let base = self.backoff_after(failed)?;
        match *self {
            Self::ExponentialBackoff { jitter, .. } if jitter > 0.0 && !base.is_zero() => {
                let offset = rand::rng().random_range(-jitter..=jitter);
                Some(base.mul_f64(1.0 + offset))
            }
            _ => Some(base),
        }
    }
}
