//! Error types for the answer engine client.

use thiserror::Error;

/// Result type for answer client operations.
pub type Result<T> = std::result::Result<T, AnswerApiError>;

/// Answer engine API errors.
///
/// The variants preserve the transient/terminal distinction callers need
/// for retry decisions: [`AnswerApiError::is_transient`] returns true for
/// failures that may succeed on a later attempt.
#[derive(Debug, Clone, Error)]
pub enum AnswerApiError {
    /// Configuration error (missing API key, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, DNS, TLS)
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded its wall-clock timeout
    #[error("request timed out")]
    Timeout,

    /// The API rejected the request with HTTP 429
    #[error("rate limit exceeded")]
    RateLimited,

    /// Server-side failure (HTTP 5xx)
    #[error("server error: HTTP {status}")]
    Server { status: u16 },

    /// Credentials rejected (HTTP 401/403)
    #[error("invalid API credentials")]
    InvalidCredentials,

    /// Malformed or otherwise rejected request (other 4xx)
    #[error("invalid request: HTTP {status}: {message}")]
    InvalidRequest { status: u16, message: String },

    /// Response body could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
}

impl AnswerApiError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Timeouts, rate limiting, network failures, and 5xx responses are
    /// transient. Credential and request errors are terminal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout | Self::RateLimited | Self::Server { .. }
        )
    }
}
