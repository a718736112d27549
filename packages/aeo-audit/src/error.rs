//! Typed errors for the audit pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. The central distinction is
//! transient vs terminal engine failures: transient errors are retried by
//! the engine client, terminal errors stop a request immediately. Failures
//! are always local to one page and never abort a batch.

use thiserror::Error;

/// Errors that can occur during audit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Document body is empty or too short to derive probe queries
    #[error("insufficient content for {source_id}: {chars} chars")]
    InsufficientContent { source_id: String, chars: usize },

    /// Answer engine call failed
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Content normalization failed
    #[error("normalize error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Invalid configuration, fatal at batch start
    #[error("config error: {reason}")]
    Config { reason: String },

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Errors from the external answer engine.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Attempt exceeded its wall-clock timeout
    #[error("request timed out")]
    Timeout,

    /// Engine responded with an explicit rate-limit rejection
    #[error("rate limit exceeded")]
    RateLimited,

    /// Server-side failure (HTTP 5xx)
    #[error("server error: HTTP {status}")]
    Server { status: u16 },

    /// Network-level failure (connection, DNS, TLS)
    #[error("network error: {0}")]
    Network(String),

    /// Credentials rejected
    #[error("invalid API credentials")]
    InvalidCredentials,

    /// Malformed or otherwise rejected request (non-retryable 4xx)
    #[error("invalid request: HTTP {status}: {message}")]
    InvalidRequest { status: u16, message: String },

    /// Response payload could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
}

impl EngineError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Timeouts, rate limiting, 5xx, and network failures are transient.
    /// Credential, request, and parse errors are terminal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::RateLimited | Self::Server { .. } | Self::Network(_)
        )
    }
}

/// Errors from the content normalizer (consumed as a black box).
#[derive(Debug, Clone, Error)]
pub enum NormalizeError {
    /// Network failure fetching the page
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Content could not be parsed into a normalized document
    #[error("parse failed: {0}")]
    Parse(String),
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Result type alias for normalizer operations.
pub type NormalizeResult<T> = std::result::Result<T, NormalizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(EngineError::Timeout.is_transient());
        assert!(EngineError::RateLimited.is_transient());
        assert!(EngineError::Server { status: 502 }.is_transient());
        assert!(EngineError::Network("connection reset".into()).is_transient());

        assert!(!EngineError::InvalidCredentials.is_transient());
        assert!(!EngineError::InvalidRequest {
            status: 400,
            message: "unknown model".into()
        }
        .is_transient());
        assert!(!EngineError::Parse("not json".into()).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = AuditError::InsufficientContent {
            source_id: "doc-1".into(),
            chars: 12,
        };
        assert!(err.to_string().contains("doc-1"));
    }
}
