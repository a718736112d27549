//! Audit pipeline configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AuditError, Result};

/// Configuration for an audit run.
///
/// Every tuning value the pipeline uses lives here rather than in code:
/// retry counts, thresholds, and rates are design choices, not observed
/// behavior, and callers are expected to adjust them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Probe queries derived per page. Default: 4.
    pub queries_per_page: usize,

    /// Minimum body length (chars) below which a page is reported as
    /// insufficient rather than audited. Default: 200.
    pub min_body_chars: usize,

    /// Source pages processed concurrently. Default: 4.
    pub concurrency: usize,

    /// Queries in flight at once for a single page. Default: 3.
    pub per_page_fanout: usize,

    /// Retries after the first attempt for transient failures. Default: 3.
    pub retry_max: u32,

    /// Token-bucket refill rate shared by all in-flight requests. Default: 2.
    pub rate_limit_per_sec: u32,

    /// Token-bucket burst capacity. Default: 2.
    pub burst: u32,

    /// Wall-clock bound per attempt, in milliseconds. Default: 30_000.
    pub attempt_timeout_ms: u64,

    /// Base backoff delay, in milliseconds. Default: 500.
    pub backoff_base_ms: u64,

    /// Backoff delay cap, in milliseconds. Default: 8_000.
    pub backoff_max_ms: u64,

    /// Minimum token-overlap score for a fuzzy match to be recorded.
    /// Default: 0.5.
    pub fuzzy_floor: f64,

    /// Minimum fuzzy confidence for a match to count toward `cited`.
    /// Exact and canonical matches always count. Default: 0.75.
    pub fuzzy_threshold: f64,

    /// Maximum evidence snippets kept per verdict. Default: 3.
    pub evidence_limit: usize,

    /// Global deadline for the whole batch, in milliseconds. When it
    /// expires, in-flight attempts finish but no new retries or page
    /// starts are issued; incomplete pages are reported as timed out.
    pub deadline_ms: Option<u64>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            queries_per_page: 4,
            min_body_chars: 200,
            concurrency: 4,
            per_page_fanout: 3,
            retry_max: 3,
            rate_limit_per_sec: 2,
            burst: 2,
            attempt_timeout_ms: 30_000,
            backoff_base_ms: 500,
            backoff_max_ms: 8_000,
            fuzzy_floor: 0.5,
            fuzzy_threshold: 0.75,
            evidence_limit: 3,
            deadline_ms: None,
        }
    }
}

impl AuditConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set queries per page.
    pub fn with_queries_per_page(mut self, n: usize) -> Self {
        self.queries_per_page = n;
        self
    }

    /// Set page concurrency.
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    /// Set per-page query fan-out.
    pub fn with_per_page_fanout(mut self, n: usize) -> Self {
        self.per_page_fanout = n;
        self
    }

    /// Set the retry budget for transient failures.
    pub fn with_retry_max(mut self, n: u32) -> Self {
        self.retry_max = n;
        self
    }

    /// Set the shared request rate.
    pub fn with_rate_limit_per_sec(mut self, rate: u32) -> Self {
        self.rate_limit_per_sec = rate;
        self
    }

    /// Set the token-bucket burst capacity.
    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = burst;
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the fuzzy-match floor.
    pub fn with_fuzzy_floor(mut self, floor: f64) -> Self {
        self.fuzzy_floor = floor;
        self
    }

    /// Set the fuzzy counting threshold.
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    /// Set the global batch deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(deadline.as_millis() as u64);
        self
    }

    /// Per-attempt timeout as a `Duration`.
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Validate the configuration. Invalid configuration is the only
    /// failure that is fatal at batch start.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(AuditError::Config {
                reason: "concurrency must be > 0".into(),
            });
        }
        if self.per_page_fanout == 0 {
            return Err(AuditError::Config {
                reason: "per_page_fanout must be > 0".into(),
            });
        }
        if self.rate_limit_per_sec == 0 {
            return Err(AuditError::Config {
                reason: "rate_limit_per_sec must be > 0".into(),
            });
        }
        if self.queries_per_page == 0 {
            return Err(AuditError::Config {
                reason: "queries_per_page must be > 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.fuzzy_floor) || !(0.0..=1.0).contains(&self.fuzzy_threshold)
        {
            return Err(AuditError::Config {
                reason: "fuzzy_floor and fuzzy_threshold must be within 0.0..=1.0".into(),
            });
        }
        Ok(())
    }
}
