//! Raw engine responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::query::ProbeQuery;

/// Why a terminal error response was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseErrorKind {
    /// Transient failures exhausted the retry budget
    Transient,

    /// A non-retryable failure stopped the request immediately
    Terminal,

    /// The batch deadline expired before the request could complete
    TimedOut,
}

/// Terminal status of an engine request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// The engine produced a payload
    Ok,

    /// The request failed; no payload is available
    Error {
        kind: ResponseErrorKind,
        message: String,
    },
}

/// The authoritative response for one probe query.
///
/// Retries produce multiple attempts but only the terminal one is retained.
/// Error responses are data, not panics: downstream stages treat them as
/// "zero citations, degraded" rather than aborting the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEngineResponse {
    /// The probe query this response answers
    pub query_id: String,

    /// When the terminal attempt completed
    pub received_at: DateTime<Utc>,

    /// Terminal status
    pub status: ResponseStatus,

    /// Raw payload; present only when status is `Ok`
    pub payload: Option<Value>,

    /// Latency of the terminal attempt in milliseconds
    pub latency_ms: u64,
}

impl RawEngineResponse {
    /// Build a successful response.
    pub fn ok(query: &ProbeQuery, payload: Value, latency_ms: u64) -> Self {
        Self {
            query_id: query.query_id.clone(),
            received_at: Utc::now(),
            status: ResponseStatus::Ok,
            payload: Some(payload),
            latency_ms,
        }
    }

    /// Build a terminal error response.
    pub fn error(
        query: &ProbeQuery,
        kind: ResponseErrorKind,
        message: impl Into<String>,
        latency_ms: u64,
    ) -> Self {
        Self {
            query_id: query.query_id.clone(),
            received_at: Utc::now(),
            status: ResponseStatus::Error {
                kind,
                message: message.into(),
            },
            payload: None,
            latency_ms,
        }
    }

    /// Whether the engine produced a payload.
    pub fn is_ok(&self) -> bool {
        matches!(self.status, ResponseStatus::Ok)
    }

    /// The error kind, if this is an error response.
    pub fn error_kind(&self) -> Option<ResponseErrorKind> {
        match &self.status {
            ResponseStatus::Ok => None,
            ResponseStatus::Error { kind, .. } => Some(*kind),
        }
    }
}
