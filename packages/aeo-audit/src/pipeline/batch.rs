//! Batch orchestration.
//!
//! Fans a collection of pages across the audit pipeline under a page
//! concurrency bound and the shared request rate budget. Pages fail
//! individually: every requested page yields exactly one outcome, and a
//! page whose normalization or API calls collapse never aborts its batch.

use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::engine::EngineClient;
use crate::error::{NormalizeError, Result};
use crate::pipeline::aggregate::{aggregate, QueryAudit};
use crate::pipeline::derive::derive_queries;
use crate::pipeline::extract::extract_citations;
use crate::traits::{AnswerEngine, ContentNormalizer};
use crate::types::{
    AuditConfig, AuditOutcome, FailureKind, FailureMarker, ResponseErrorKind, ResponseStatus,
    SourceDocument,
};

/// One requested page: a URL still to be normalized, or an already
/// normalized document.
#[derive(Debug, Clone)]
pub enum PageInput {
    /// Normalize this URL first
    Url(String),

    /// Audit this document directly
    Document(SourceDocument),
}

impl PageInput {
    /// Key identifying this page in the batch result: the source id, or
    /// the requested URL when no document exists yet.
    pub fn key(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Document(doc) => doc.source_id.clone(),
        }
    }
}

impl From<SourceDocument> for PageInput {
    fn from(doc: SourceDocument) -> Self {
        Self::Document(doc)
    }
}

impl From<&str> for PageInput {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for PageInput {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

/// The audit pipeline's public entry point.
///
/// Owns the rate-limited engine client and the normalizer seam; per-page
/// artifacts stay local to each page's task.
pub struct Auditor<E: AnswerEngine, N: ContentNormalizer> {
    client: EngineClient<E>,
    normalizer: Arc<N>,
    config: AuditConfig,
}

impl<E: AnswerEngine, N: ContentNormalizer> Auditor<E, N> {
    /// Create an auditor. Fails only on invalid configuration; everything
    /// later is reported per page.
    pub fn new(engine: E, normalizer: N, config: AuditConfig) -> Result<Self> {
        config.validate()?;
        let client = EngineClient::new(engine, &config)?;
        Ok(Self {
            client,
            normalizer: Arc::new(normalizer),
            config,
        })
    }

    /// Audit a collection of pages, returning one outcome per page.
    ///
    /// Pages run concurrently up to the configured bound; queries within
    /// a page fan out under their own limit and the shared rate budget.
    /// When the global deadline expires, running attempts finish but no
    /// new page starts or retries are issued, and incomplete pages are
    /// reported as timed out rather than dropped.
    ///
    /// Pages with the same key are the same page: duplicates are audited
    /// once, and the result map carries one outcome under that key.
    pub async fn audit(&self, pages: Vec<PageInput>) -> HashMap<String, AuditOutcome> {
        let deadline = self
            .config
            .deadline_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));

        let mut seen: HashSet<String> = HashSet::new();
        let requested = pages.len();
        let pages: Vec<PageInput> = pages
            .into_iter()
            .filter(|page| seen.insert(page.key()))
            .collect();
        if pages.len() < requested {
            warn!(
                duplicates = requested - pages.len(),
                "duplicate pages requested, auditing each page once"
            );
        }

        info!(pages = pages.len(), "starting audit batch");

        let tasks = pages.into_iter().map(|page| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let key = page.key();
                let _permit = semaphore.acquire().await.unwrap();

                if deadline_expired(deadline) {
                    warn!(page = %key, "deadline expired before page start");
                    let marker = FailureMarker::new(
                        &key,
                        FailureKind::TimedOut,
                        "batch deadline expired before page start",
                    );
                    return (key, AuditOutcome::Failed(marker));
                }

                let outcome = self.audit_input(page, deadline).await;
                (key, outcome)
            }
        });

        let outcomes: HashMap<String, AuditOutcome> = join_all(tasks).await.into_iter().collect();

        let failed = outcomes.values().filter(|o| o.failure().is_some()).count();
        info!(
            pages = outcomes.len(),
            failed,
            "audit batch complete"
        );
        outcomes
    }

    /// Normalize if needed, then audit.
    async fn audit_input(&self, page: PageInput, deadline: Option<Instant>) -> AuditOutcome {
        let key = page.key();
        let doc = match page {
            PageInput::Document(doc) => doc,
            PageInput::Url(url) => match self.normalizer.normalize(&url).await {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(url = %url, error = %e, "normalization failed");
                    let kind = match e {
                        NormalizeError::Fetch(_) => FailureKind::Fetch,
                        NormalizeError::Parse(_) => FailureKind::Parse,
                    };
                    return AuditOutcome::Failed(FailureMarker::new(key, kind, e.to_string()));
                }
            },
        };

        self.audit_document(&doc, deadline).await
    }

    /// Audit one normalized document: derive queries, fan out to the
    /// engine, extract, match, aggregate.
    pub async fn audit_document(
        &self,
        doc: &SourceDocument,
        deadline: Option<Instant>,
    ) -> AuditOutcome {
        let queries = match derive_queries(doc, &self.config) {
            Ok(queries) => queries,
            Err(e) => {
                warn!(source_id = %doc.source_id, error = %e, "cannot derive queries");
                return AuditOutcome::Failed(FailureMarker::new(
                    &doc.source_id,
                    FailureKind::InsufficientContent,
                    e.to_string(),
                ));
            }
        };

        let fanout = Arc::new(Semaphore::new(self.config.per_page_fanout));
        let submissions = queries.iter().map(|query| {
            let fanout = Arc::clone(&fanout);
            async move {
                let _permit = fanout.acquire().await.unwrap();
                self.client.submit(query, deadline).await
            }
        });
        let responses = join_all(submissions).await;

        let mut audits: Vec<QueryAudit> = Vec::with_capacity(queries.len());
        for (query, response) in queries.into_iter().zip(responses) {
            let extracted = extract_citations(&response);
            audits.push(QueryAudit {
                query,
                response,
                citations: extracted.records,
                skipped: extracted.skipped,
            });
        }

        // Deadline expiry trumps other failures: the page is incomplete,
        // not broken.
        if audits
            .iter()
            .any(|a| a.response.error_kind() == Some(ResponseErrorKind::TimedOut))
        {
            return AuditOutcome::Failed(FailureMarker::new(
                &doc.source_id,
                FailureKind::TimedOut,
                "batch deadline expired before all queries completed",
            ));
        }

        // No query produced an answer at all: report the page as failed
        // rather than emitting a hollow verdict.
        if !audits.is_empty() && audits.iter().all(|a| !a.response.is_ok()) {
            let reason = audits
                .iter()
                .find_map(|a| match &a.response.status {
                    ResponseStatus::Error { message, .. } => Some(message.clone()),
                    ResponseStatus::Ok => None,
                })
                .unwrap_or_else(|| "all queries failed".to_string());
            return AuditOutcome::Failed(FailureMarker::new(
                &doc.source_id,
                FailureKind::Api,
                reason,
            ));
        }

        AuditOutcome::Verdict(aggregate(doc, &audits, &self.config))
    }
}

fn deadline_expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::testing::{sample_document, MockEngine, MockNormalizer};
    use serde_json::json;

    fn fast_config() -> AuditConfig {
        let mut config = AuditConfig::new()
            .with_rate_limit_per_sec(1000)
            .with_burst(1000);
        config.backoff_base_ms = 1;
        config.backoff_max_ms = 2;
        config
    }

    #[tokio::test]
    async fn test_every_page_yields_exactly_one_outcome() {
        let engine = MockEngine::new().with_default_payload(json!({"citations": []}));
        let normalizer = MockNormalizer::new()
            .with_document("https://a.com", sample_document("https://a.com"))
            .with_document("https://b.com", sample_document("https://b.com"));
        let auditor = Auditor::new(engine, normalizer, fast_config()).unwrap();

        let outcomes = auditor
            .audit(vec!["https://a.com".into(), "https://b.com".into()])
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.contains_key("https://a.com"));
        assert!(outcomes.contains_key("https://b.com"));
    }

    #[tokio::test]
    async fn test_duplicate_pages_are_audited_once() {
        let engine = MockEngine::new().with_default_payload(json!({"citations": []}));
        let normalizer =
            MockNormalizer::new().with_document("https://a.com", sample_document("https://a.com"));
        let auditor = Auditor::new(engine, normalizer.clone(), fast_config()).unwrap();

        let outcomes = auditor
            .audit(vec![
                "https://a.com".into(),
                "https://a.com".into(),
                "https://a.com".into(),
            ])
            .await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes["https://a.com"].verdict().is_some());
        // the page was normalized and audited a single time
        assert_eq!(normalizer.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_normalizer_failure_does_not_abort_batch() {
        let engine = MockEngine::new().with_default_payload(json!({"citations": []}));
        let normalizer = MockNormalizer::new()
            .with_document("https://ok.com", sample_document("https://ok.com"))
            .with_failure(
                "https://broken.com",
                NormalizeError::Fetch("connection refused".into()),
            );
        let auditor = Auditor::new(engine, normalizer, fast_config()).unwrap();

        let outcomes = auditor
            .audit(vec!["https://ok.com".into(), "https://broken.com".into()])
            .await;

        assert!(outcomes["https://ok.com"].verdict().is_some());
        let failure = outcomes["https://broken.com"].failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Fetch);
        assert!(failure.reason.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_all_terminal_errors_mark_page_failed() {
        let doc = sample_document("https://a.com");
        let engine = MockEngine::new().with_default_failure(EngineError::InvalidRequest {
            status: 400,
            message: "bad model".into(),
        });
        let auditor = Auditor::new(engine, MockNormalizer::new(), fast_config()).unwrap();

        let outcome = auditor.audit_document(&doc, None).await;
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Api);
        assert!(failure.reason.contains("bad model"));
    }

    #[tokio::test]
    async fn test_insufficient_content_marks_page() {
        let doc = SourceDocument::new("https://a.com", "tiny").with_source_id("a");
        let engine = MockEngine::new().with_default_payload(json!({}));
        let auditor = Auditor::new(engine, MockNormalizer::new(), fast_config()).unwrap();

        let outcome = auditor.audit_document(&doc, None).await;
        assert_eq!(
            outcome.failure().unwrap().kind,
            FailureKind::InsufficientContent
        );
    }

    #[tokio::test]
    async fn test_expired_deadline_reports_timed_out_pages() {
        let engine = MockEngine::new().with_default_payload(json!({}));
        let normalizer =
            MockNormalizer::new().with_document("https://a.com", sample_document("https://a.com"));
        let mut config = fast_config();
        config.deadline_ms = Some(0);
        let auditor = Auditor::new(engine, normalizer, config).unwrap();

        let outcomes = auditor.audit(vec!["https://a.com".into()]).await;
        assert_eq!(
            outcomes["https://a.com"].failure().unwrap().kind,
            FailureKind::TimedOut
        );
    }

    #[tokio::test]
    async fn test_degraded_queries_still_produce_verdict() {
        let doc = sample_document("https://a.com");
        // first derived query fails terminally, the rest succeed
        let engine = MockEngine::new()
            .with_default_payload(json!({"citations": [doc.url.clone()]}))
            .with_failures(
                "What is sourdough",
                vec![EngineError::InvalidRequest {
                    status: 400,
                    message: "rejected".into(),
                }],
            );
        let auditor = Auditor::new(engine, MockNormalizer::new(), fast_config()).unwrap();

        let outcome = auditor.audit_document(&doc, None).await;
        let verdict = outcome.verdict().unwrap();
        assert!(verdict.cited);
        assert_eq!(verdict.degraded_queries, 1);
    }
}
