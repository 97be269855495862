// src/utils/backoff.rs

//! Exponential backoff with bounded jitter.
//!
//! The nominal delay for attempt `n` (1-indexed) is
//! `min(base * 2^(n-1), max_delay)`. A random offset of up to ±20% of the
//! nominal delay is applied, unless the upstream supplied an explicit wait
//! hint, which is used verbatim.

use std::time::Duration;

use rand::Rng;

/// Default upper bound on any computed delay.
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

/// Jitter spread as a fraction of the nominal delay (1/5 = 20%).
const JITTER_DIVISOR: u64 = 5;

/// Retry delay policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl BackoffPolicy {
    /// Create a policy with the default 30s cap.
    pub const fn new(base_delay_ms: u64) -> Self {
        Self {
            base_delay_ms,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }

    /// Override the delay cap.
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub const fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms
    }

    pub const fn max_delay_ms(&self) -> u64 {
        self.max_delay_ms
    }

    /// Un-jittered delay for the given attempt.
    pub fn nominal_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 1_u64.checked_shl(exponent).unwrap_or(u64::MAX);
        let delay = self.base_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    /// Nominal delay with up to ±20% random jitter.
    pub fn jittered_delay(&self, attempt: u32) -> Duration {
        let nominal = self.nominal_delay(attempt).as_millis() as u64;
        let spread = nominal / JITTER_DIVISOR;
        if spread == 0 {
            return Duration::from_millis(nominal);
        }

        let offset = rand::thread_rng().gen_range(0..=spread * 2);
        // nominal - spread + offset, kept in [0.8, 1.2] * nominal
        Duration::from_millis(nominal - spread + offset)
    }

    /// Delay to wait before retrying after `attempt` failed.
    ///
    /// A positive `hint` wins outright; otherwise the jittered backoff applies.
    pub fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        match hint {
            Some(wait) if !wait.is_zero() => wait,
            _ => self.jittered_delay(attempt),
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(1_000)
    }
}
