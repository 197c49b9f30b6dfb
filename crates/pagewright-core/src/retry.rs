//! Bounded-retry policy shared by every outbound dependency that retries.
//!
//! The policy only computes the schedule; the caller owns the sleeping and
//! the decision of which failures are retryable.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
    /// Add up to +25% random spread to each delay.
    pub jitter: bool,
}

impl RetryPolicy {
    /// Evaluation-callback delivery: 1s, 2s, 4s, 8s between five attempts.
    pub const fn notification() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            multiplier: 2,
            max_delay: Duration::from_secs(16),
            jitter: true,
        }
    }

    /// Pages-activation polling: the provider side is asynchronous and often
    /// takes a few seconds, so start at 2s and stretch to 30s.
    pub const fn hosting_activation() -> Self {
        Self {
            max_attempts: 6,
            base_delay: Duration::from_secs(2),
            multiplier: 2,
            max_delay: Duration::from_secs(30),
            jitter: false,
        }
    }

    /// Delay to sleep after failed attempt `attempt` (0-based) before the
    /// next one. Exponential in the attempt index, capped at `max_delay`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt);
        let capped = self.base_delay.saturating_mul(factor).min(self.max_delay);
        if self.jitter && !capped.is_zero() {
            let spread = capped / 4;
            capped + rand::thread_rng().gen_range(Duration::ZERO..=spread)
        } else {
            capped
        }
    }

    /// True when `attempt` (0-based) was the last allowed one.
    pub fn is_final_attempt(&self, attempt: u32) -> bool {
        attempt + 1 >= self.max_attempts
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
