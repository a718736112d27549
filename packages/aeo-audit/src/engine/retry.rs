//! Retry policy with exponential backoff and jitter.
//!
//! Retry state is explicit rather than exception-driven: each request
//! walks the [`AttemptState`] machine in
//! [`EngineClient::submit`](crate::engine::EngineClient::submit).

use rand::Rng;
use std::time::Duration;

use crate::types::AuditConfig;

/// Per-request retry discipline.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,

    /// Base delay for the exponential schedule
    pub base_delay: Duration,

    /// Cap on any single delay
    pub max_delay: Duration,

    /// Wall-clock bound per attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Build a policy from audit configuration.
    pub fn from_config(config: &AuditConfig) -> Self {
        Self {
            max_retries: config.retry_max,
            base_delay: Duration::from_millis(config.backoff_base_ms),
            max_delay: Duration::from_millis(config.backoff_max_ms),
            attempt_timeout: config.attempt_timeout(),
        }
    }

    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`
    /// plus up to ±25% random jitter, capped at `max_delay`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay);

        let jitter_range = exp.as_millis() as u64 / 4;
        if jitter_range == 0 {
            return exp;
        }

        let jitter = rand::thread_rng().gen_range(0..=jitter_range * 2);
        let with_jitter = exp.as_millis() as u64 + jitter - jitter_range;
        Duration::from_millis(with_jitter).min(self.max_delay)
    }
}

/// State of one request through the retry machine.
#[derive(Debug)]
pub enum AttemptState {
    /// Waiting for a rate-limit token
    Pending,

    /// An attempt is running against the engine
    InFlight,

    /// A transient failure occurred; sleeping before the next attempt
    AwaitingBackoff,

    /// The engine produced a payload
    Done,

    /// Terminal failure, retries exhausted, or deadline expired
    Failed,
}
