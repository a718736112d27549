//! Answer engine client layer: rate limiting, retry, timeouts.

pub mod client;
pub mod retry;

#[cfg(feature = "perplexity")]
pub mod sonar;

pub use client::EngineClient;
pub use retry::{AttemptState, RetryPolicy};

#[cfg(feature = "perplexity")]
pub use sonar::{EngineCredentials, SonarEngine};
