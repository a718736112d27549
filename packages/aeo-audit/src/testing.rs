//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the audit pipeline
//! without making real engine or network calls. Mocks are deterministic
//! and track their calls for assertions.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use crate::error::{EngineError, EngineResult, NormalizeError, NormalizeResult};
use crate::traits::{AnswerEngine, ContentNormalizer};
use crate::types::SourceDocument;

/// A mock answer engine with scripted responses.
///
/// Per-query failure scripts are consumed first (one per call), then the
/// configured payload, then the defaults. Cloning shares state, so a
/// clone kept outside the pipeline can inspect calls afterward.
#[derive(Clone, Default)]
pub struct MockEngine {
    /// Payloads by query text
    payloads: Arc<RwLock<HashMap<String, Value>>>,

    /// Failure sequences by query text, consumed call by call
    failures: Arc<RwLock<HashMap<String, VecDeque<EngineError>>>>,

    /// Payload for queries with no script
    default_payload: Arc<RwLock<Option<Value>>>,

    /// Failure for queries with no script (checked before default payload)
    default_failure: Arc<RwLock<Option<EngineError>>>,

    /// Query texts in call order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockEngine {
    /// Create a mock engine that answers everything with zero citations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the payload returned for a specific query text.
    pub fn with_payload(self, query: impl Into<String>, payload: Value) -> Self {
        self.payloads.write().unwrap().insert(query.into(), payload);
        self
    }

    /// Queue failures for a query text; each call consumes one before
    /// the payload (if any) is served.
    pub fn with_failures(self, query: impl Into<String>, failures: Vec<EngineError>) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(query.into(), failures.into());
        self
    }

    /// Set the payload for queries without a script.
    pub fn with_default_payload(self, payload: Value) -> Self {
        *self.default_payload.write().unwrap() = Some(payload);
        self
    }

    /// Fail every unscripted call with this error.
    pub fn with_default_failure(self, error: EngineError) -> Self {
        *self.default_failure.write().unwrap() = Some(error);
        self
    }

    /// Query texts in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl AnswerEngine for MockEngine {
    async fn ask(&self, query_text: &str) -> EngineResult<Value> {
        self.calls.write().unwrap().push(query_text.to_string());

        if let Some(queue) = self.failures.write().unwrap().get_mut(query_text) {
            if let Some(error) = queue.pop_front() {
                return Err(error);
            }
        }

        if let Some(payload) = self.payloads.read().unwrap().get(query_text) {
            return Ok(payload.clone());
        }

        if let Some(error) = self.default_failure.read().unwrap().as_ref() {
            return Err(error.clone());
        }

        if let Some(payload) = self.default_payload.read().unwrap().as_ref() {
            return Ok(payload.clone());
        }

        Ok(serde_json::json!({ "citations": [] }))
    }
}

/// A mock content normalizer with predefined documents.
#[derive(Clone, Default)]
pub struct MockNormalizer {
    /// Documents by requested URL
    documents: Arc<RwLock<HashMap<String, SourceDocument>>>,

    /// Failures by requested URL
    failures: Arc<RwLock<HashMap<String, NormalizeError>>>,

    /// URLs in call order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockNormalizer {
    /// Create an empty mock normalizer. Unknown URLs fail with a fetch
    /// error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predefined document for a URL.
    pub fn with_document(self, url: impl Into<String>, doc: SourceDocument) -> Self {
        self.documents.write().unwrap().insert(url.into(), doc);
        self
    }

    /// Make a URL fail with the given error.
    pub fn with_failure(self, url: impl Into<String>, error: NormalizeError) -> Self {
        self.failures.write().unwrap().insert(url.into(), error);
        self
    }

    /// URLs in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ContentNormalizer for MockNormalizer {
    async fn normalize(&self, url_or_html: &str) -> NormalizeResult<SourceDocument> {
        self.calls.write().unwrap().push(url_or_html.to_string());

        if let Some(error) = self.failures.read().unwrap().get(url_or_html) {
            return Err(error.clone());
        }

        self.documents
            .read()
            .unwrap()
            .get(url_or_html)
            .cloned()
            .ok_or_else(|| NormalizeError::Fetch(format!("no document configured for {url_or_html}")))
    }
}

/// A ready-made document long enough to pass content checks. Title
/// "Sourdough", so the first derived query is "What is sourdough".
pub fn sample_document(url: &str) -> SourceDocument {
    SourceDocument::new(
        url,
        "Sourdough fermentation depends on wild yeast cultures. Hydration levels \
         shape the crumb, and fermentation time controls flavor. Bakers adjust \
         hydration and fermentation schedules around kitchen temperature to keep \
         the starter culture active and predictable across seasons.",
    )
    .with_source_id(url)
    .with_title("Sourdough")
    .with_canonical_url(format!("{}/", url.trim_end_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_engine_scripts_failures_then_payload() {
        let engine = MockEngine::new()
            .with_failures("q", vec![EngineError::Timeout])
            .with_payload("q", json!({"citations": ["https://a.com"]}));

        assert!(engine.ask("q").await.is_err());
        assert!(engine.ask("q").await.is_ok());
        assert_eq!(engine.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_engine_default_is_zero_citations() {
        let engine = MockEngine::new();
        let payload = engine.ask("anything").await.unwrap();
        assert_eq!(payload["citations"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_mock_normalizer_unknown_url_fails() {
        let normalizer = MockNormalizer::new();
        assert!(matches!(
            normalizer.normalize("https://unknown.com").await,
            Err(NormalizeError::Fetch(_))
        ));
    }

    #[test]
    fn test_sample_document_is_long_enough() {
        let doc = sample_document("https://a.com");
        assert!(doc.body_text.len() >= 200);
        assert_eq!(doc.canonical_url.as_deref(), Some("https://a.com/"));
    }
}
