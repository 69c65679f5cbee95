//! Exponential backoff with jitter for provider retries.
//!
//! Resolves spec Open Question #1: a server's `Retry-After` hint is used as
//! a floor on the delay, but the result is still clamped to
//! `BackoffPolicy::max_delay` — we never wait past the configured ceiling,
//! and never wait less than the jittered exponential delay either.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(200),
            max_delay: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry attempt `attempt` (1-indexed: the delay before
    /// the *second* call is `delay_for(1)`). `jitter` is an external
    /// `0.0..1.0` sample so callers can keep this function pure and
    /// deterministic under test.
    pub fn delay_for(&self, attempt: u32, jitter: f64, retry_after: Option<Duration>) -> Duration {
        let exponential = self.base.saturating_mul(1u32 << attempt.min(20));
        let jittered = Duration::from_secs_f64(exponential.as_secs_f64() * (0.5 + 0.5 * jitter));
        let floored = match retry_after {
            Some(hint) => jittered.max(hint),
            None => jittered,
        };
        floored.min(self.max_delay)
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
