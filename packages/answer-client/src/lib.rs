//! Pure answer engine REST API client
//!
//! A clean, minimal client for citation-bearing answer APIs (Perplexity-style
//! chat completions) with no domain-specific logic. Retry, rate limiting, and
//! citation interpretation belong to callers; this crate only speaks HTTP and
//! classifies failures.
//!
//! # Example
//!
//! ```rust,ignore
//! use answer_client::{AnswerClient, AnswerRequest};
//!
//! let client = AnswerClient::from_env()?;
//! let response = client
//!     .answer(AnswerRequest::question("sonar", "what is answer engine optimization"))
//!     .await?;
//!
//! println!("{:?}", response.citation_urls());
//! ```

pub mod auth;
pub mod error;
pub mod types;

pub use auth::ApiKey;
pub use error::{AnswerApiError, Result};
pub use types::{AnswerRequest, AnswerResponse, Message};

use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default API base URL (Perplexity-compatible).
pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pure answer engine API client.
///
/// The API key is held as a redacting [`ApiKey`] for the client's whole
/// lifetime and exposed only while the Authorization header is written.
#[derive(Clone)]
pub struct AnswerClient {
    http_client: Client,
    api_key: ApiKey,
    base_url: String,
}

impl AnswerClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom per-request timeout.
    pub fn with_timeout(api_key: impl Into<ApiKey>, timeout: Duration) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to build HTTP client"),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `PERPLEXITY_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("PERPLEXITY_API_KEY")
            .map_err(|_| AnswerApiError::Config("PERPLEXITY_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies or compatible engines).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one answer request and return the raw response payload.
    ///
    /// Makes exactly one attempt; failures are classified into
    /// [`AnswerApiError`] variants so callers can decide whether to retry.
    /// The API key is sent in the Authorization header and never logged.
    pub async fn answer(&self, request: AnswerRequest) -> Result<AnswerResponse> {
        let start = Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(model = %request.model, "answer request timed out");
                    AnswerApiError::Timeout
                } else {
                    warn!(model = %request.model, error = %e, "answer request failed");
                    AnswerApiError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, "answer API error");
            return Err(classify_status(status, message));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AnswerApiError::Parse(e.to_string()))?;

        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(
            model = %request.model,
            latency_ms,
            "answer completion received"
        );

        Ok(AnswerResponse {
            payload,
            latency_ms,
        })
    }
}

/// Map a non-success HTTP status to a typed error.
fn classify_status(status: StatusCode, message: String) -> AnswerApiError {
    match status.as_u16() {
        401 | 403 => AnswerApiError::InvalidCredentials,
        429 => AnswerApiError::RateLimited,
        code if code >= 500 => AnswerApiError::Server { status: code },
        code => AnswerApiError::InvalidRequest {
            status: code,
            message,
        },
    }
}
