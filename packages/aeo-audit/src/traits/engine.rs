//! Answer engine trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::EngineResult;

/// A citation-producing answer engine.
///
/// Implementations make exactly one attempt per call and classify failures
/// into transient or terminal [`EngineError`](crate::error::EngineError)
/// variants. Retry, rate limiting, and timeouts are layered on top by
/// [`EngineClient`](crate::engine::EngineClient); citation interpretation
/// is the extractor's job. The payload is raw JSON because citation
/// schemas vary across engines and versions.
#[async_trait]
pub trait AnswerEngine: Send + Sync {
    /// Ask one natural-language question, returning the raw response payload.
    async fn ask(&self, query_text: &str) -> EngineResult<Value>;
}
