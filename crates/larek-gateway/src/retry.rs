//! Retry policies for gateway reads.

use std::time::Duration;

use crate::endpoint::Endpoint;
use crate::error::GatewayError;

/// Doubling delay between attempts, capped at `max`. A zero `base` disables
/// waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
}

impl Backoff {
    pub const fn none() -> Self {
        Self {
            base: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    /// Delay before retrying after failed attempt `attempt` (0 = first try).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(200),
            max: Duration::from_secs(2),
        }
    }
}

/// How many times a read is retried, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first try.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::default(),
        }
    }

    /// Single attempt.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Backoff::none(),
        }
    }

    /// Policy for an endpoint, capped by a configured maximum.
    ///
    /// Non-idempotent endpoints never retry.
    pub fn for_endpoint(endpoint: Endpoint, configured_max: u32) -> Self {
        if !endpoint.is_idempotent() {
            return Self::none();
        }
        Self::new(endpoint.default_max_retries().min(configured_max))
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        if self.max_retries > 0 {
            self.backoff = backoff;
        }
        self
    }

    /// Whether failed attempt `attempt` (0-indexed) gets another try.
    pub fn should_retry(&self, error: &GatewayError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}
