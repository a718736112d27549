//! Rate-limited, retrying answer engine client.
//!
//! Wraps any [`AnswerEngine`] with the shared token bucket, per-attempt
//! timeouts, and the retry state machine. Uses the governor crate for
//! precise rate limiting with burst support; callers suspend on
//! `until_ready` until a token is available rather than failing.

use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::engine::retry::{AttemptState, RetryPolicy};
use crate::error::{AuditError, Result};
use crate::traits::AnswerEngine;
use crate::types::{AuditConfig, ProbeQuery, RawEngineResponse, ResponseErrorKind};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Answer engine client with rate limiting and retry.
///
/// The token bucket and retry policy are shared across all concurrent
/// callers through `Arc`, so the request budget holds no matter how many
/// pages fan out at once. This is the pipeline's single synchronization
/// point; all other state is per-page.
pub struct EngineClient<E: AnswerEngine> {
    engine: Arc<E>,
    limiter: Arc<DefaultRateLimiter>,
    policy: RetryPolicy,
}

impl<E: AnswerEngine> Clone for EngineClient<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            limiter: Arc::clone(&self.limiter),
            policy: self.policy.clone(),
        }
    }
}

impl<E: AnswerEngine> EngineClient<E> {
    /// Create a client from audit configuration.
    pub fn new(engine: E, config: &AuditConfig) -> Result<Self> {
        let rate = NonZeroU32::new(config.rate_limit_per_sec).ok_or(AuditError::Config {
            reason: "rate_limit_per_sec must be > 0".into(),
        })?;
        let burst = NonZeroU32::new(config.burst.max(1)).ok_or(AuditError::Config {
            reason: "burst must be > 0".into(),
        })?;

        let quota = Quota::per_second(rate).allow_burst(burst);

        Ok(Self {
            engine: Arc::new(engine),
            limiter: Arc::new(RateLimiter::direct(quota)),
            policy: RetryPolicy::from_config(config),
        })
    }

    /// Submit one probe query, returning the terminal response.
    ///
    /// Never fails hard: exhausted retries, terminal API errors, and
    /// deadline expiry all come back as error-status responses so one
    /// query's outcome can never abort its batch. Transient failures
    /// (timeout, rate-limit rejection, 5xx, network) are retried with
    /// exponential backoff; terminal failures stop immediately. Past the
    /// deadline no new attempt or retry is started, but a running attempt
    /// finishes under its own timeout.
    pub async fn submit(&self, query: &ProbeQuery, deadline: Option<Instant>) -> RawEngineResponse {
        let mut state = AttemptState::Pending;
        let mut attempt: u32 = 0;
        let mut latency_ms: u64 = 0;

        loop {
            match state {
                AttemptState::Pending => {
                    if deadline_expired(deadline) {
                        return RawEngineResponse::error(
                            query,
                            ResponseErrorKind::TimedOut,
                            "batch deadline expired before attempt",
                            latency_ms,
                        );
                    }
                    self.limiter.until_ready().await;
                    // The token wait itself can outlive the deadline
                    if deadline_expired(deadline) {
                        return RawEngineResponse::error(
                            query,
                            ResponseErrorKind::TimedOut,
                            "batch deadline expired while waiting for a rate token",
                            latency_ms,
                        );
                    }
                    state = AttemptState::InFlight;
                }

                AttemptState::InFlight => {
                    let started = Instant::now();
                    let outcome = match tokio::time::timeout(
                        self.policy.attempt_timeout,
                        self.engine.ask(&query.text),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(crate::error::EngineError::Timeout),
                    };
                    latency_ms = started.elapsed().as_millis() as u64;

                    match outcome {
                        Ok(payload) => {
                            debug!(
                                query_id = %query.query_id,
                                attempt,
                                latency_ms,
                                "engine answered"
                            );
                            return RawEngineResponse::ok(query, payload, latency_ms);
                        }
                        Err(e) if e.is_transient() && attempt < self.policy.max_retries => {
                            warn!(
                                query_id = %query.query_id,
                                attempt,
                                error = %e,
                                "transient engine failure, backing off"
                            );
                            state = AttemptState::AwaitingBackoff;
                        }
                        Err(e) if e.is_transient() => {
                            warn!(
                                query_id = %query.query_id,
                                attempts = attempt + 1,
                                error = %e,
                                "retries exhausted"
                            );
                            return RawEngineResponse::error(
                                query,
                                ResponseErrorKind::Transient,
                                e.to_string(),
                                latency_ms,
                            );
                        }
                        Err(e) => {
                            warn!(
                                query_id = %query.query_id,
                                error = %e,
                                "terminal engine failure, not retrying"
                            );
                            return RawEngineResponse::error(
                                query,
                                ResponseErrorKind::Terminal,
                                e.to_string(),
                                latency_ms,
                            );
                        }
                    }
                }

                AttemptState::AwaitingBackoff => {
                    if deadline_expired(deadline) {
                        return RawEngineResponse::error(
                            query,
                            ResponseErrorKind::TimedOut,
                            "batch deadline expired during backoff",
                            latency_ms,
                        );
                    }
                    tokio::time::sleep(self.policy.backoff_delay(attempt)).await;
                    attempt += 1;
                    state = AttemptState::Pending;
                }

                // The success and failure arms above return directly.
                AttemptState::Done | AttemptState::Failed => {
                    unreachable!("terminal attempt states exit via return")
                }
            }
        }
    }
}

fn deadline_expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}
