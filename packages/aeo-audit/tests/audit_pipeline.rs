//! End-to-end pipeline tests over mock engine and normalizer.

use proptest::prelude::*;
use serde_json::json;
use std::cmp::Ordering;
use std::time::{Duration, Instant};

use aeo_audit::testing::{sample_document, MockEngine, MockNormalizer};
use aeo_audit::{
    AuditConfig, Auditor, EngineError, FailureKind, MatchResult, MatchTier, NormalizeError,
    SourceDocument,
};

fn fast_config() -> AuditConfig {
    let mut config = AuditConfig::new()
        .with_rate_limit_per_sec(1000)
        .with_burst(1000);
    config.backoff_base_ms = 1;
    config.backoff_max_ms = 2;
    config
}

fn article() -> SourceDocument {
    SourceDocument::new(
        "https://ex.com/a",
        "Sourdough fermentation depends on wild yeast cultures. Hydration levels \
         shape the crumb, and fermentation time controls flavor. Bakers adjust \
         hydration and fermentation schedules around kitchen temperature to keep \
         the starter culture active and predictable across seasons.",
    )
    .with_source_id("article-1")
    .with_title("Sourdough")
    .with_canonical_url("https://ex.com/a/")
}

#[tokio::test]
async fn canonical_citation_yields_canonical_match() {
    // The engine cites the canonical form, not the document URL verbatim
    let engine = MockEngine::new().with_default_payload(json!({
        "citations": ["https://ex.com/a/"]
    }));
    let auditor = Auditor::new(engine, MockNormalizer::new(), fast_config()).unwrap();

    let outcome = auditor.audit_document(&article(), None).await;
    let verdict = outcome.verdict().unwrap();

    assert!(verdict.cited);
    let best = verdict.best_match.as_ref().unwrap();
    assert_eq!(best.tier, MatchTier::CanonicalUrl);
    assert_eq!(best.confidence, 0.9);
}

#[tokio::test]
async fn zero_citations_across_all_queries_is_uncited() {
    let engine = MockEngine::new().with_default_payload(json!({"citations": []}));
    let mut config = fast_config();
    config.queries_per_page = 3;
    let auditor = Auditor::new(engine, MockNormalizer::new(), config).unwrap();

    let outcome = auditor.audit_document(&article(), None).await;
    let verdict = outcome.verdict().unwrap();

    assert!(!verdict.cited);
    assert!(verdict.supporting_queries.is_empty());
    assert!(verdict.evidence.is_empty());
    assert!(verdict.best_match.is_none());
}

#[tokio::test]
async fn reruns_produce_identical_verdicts() {
    let payload = json!({
        "search_results": [
            {"url": "https://ex.com/a", "title": "Sourdough", "snippet": "wild yeast cultures"}
        ]
    });
    let engine = MockEngine::new().with_default_payload(payload);
    let auditor = Auditor::new(engine, MockNormalizer::new(), fast_config()).unwrap();

    let first = auditor.audit_document(&article(), None).await;
    let second = auditor.audit_document(&article(), None).await;

    let a = first.verdict().unwrap();
    let b = second.verdict().unwrap();
    assert_eq!(a.cited, b.cited);
    assert_eq!(a.supporting_queries, b.supporting_queries);
    assert_eq!(a.evidence, b.evidence);
    assert_eq!(
        a.best_match.as_ref().map(|m| (m.tier, m.confidence)),
        b.best_match.as_ref().map(|m| (m.tier, m.confidence))
    );
}

#[tokio::test]
async fn batch_survives_one_page_failing_normalization() {
    let engine = MockEngine::new().with_default_payload(json!({"citations": []}));
    let normalizer = MockNormalizer::new()
        .with_document("https://a.com", sample_document("https://a.com"))
        .with_failure("https://down.com", NormalizeError::Fetch("timeout".into()))
        .with_document("https://c.com", sample_document("https://c.com"));
    let auditor = Auditor::new(engine, normalizer, fast_config()).unwrap();

    let outcomes = auditor
        .audit(vec![
            "https://a.com".into(),
            "https://down.com".into(),
            "https://c.com".into(),
        ])
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes["https://a.com"].verdict().is_some());
    assert!(outcomes["https://c.com"].verdict().is_some());
    assert_eq!(
        outcomes["https://down.com"].failure().unwrap().kind,
        FailureKind::Fetch
    );
}

#[tokio::test]
async fn terminal_api_error_is_recorded_without_retry() {
    let doc = sample_document("https://a.com");
    let engine = MockEngine::new().with_default_failure(EngineError::InvalidRequest {
        status: 400,
        message: "invalid request".into(),
    });
    let mut config = fast_config();
    config.queries_per_page = 1;
    let auditor = Auditor::new(engine.clone(), MockNormalizer::new(), config).unwrap();

    let outcome = auditor.audit_document(&doc, None).await;

    assert_eq!(outcome.failure().unwrap().kind, FailureKind::Api);
    // one query, one attempt, zero retries
    assert_eq!(engine.call_count(), 1);
}

#[tokio::test]
async fn token_bucket_spaces_a_page_fanout() {
    let engine = MockEngine::new().with_default_payload(json!({"citations": []}));
    let mut config = AuditConfig::new()
        .with_rate_limit_per_sec(4)
        .with_burst(1)
        .with_queries_per_page(4)
        .with_per_page_fanout(4);
    config.backoff_base_ms = 1;
    let auditor = Auditor::new(engine, MockNormalizer::new(), config).unwrap();

    let start = Instant::now();
    let outcome = auditor.audit_document(&article(), None).await;
    let elapsed = start.elapsed();

    assert!(outcome.verdict().is_some());
    // 4 requests at 4/sec with burst 1: the last three wait ~250ms each
    assert!(
        elapsed >= Duration::from_millis(500),
        "rate budget not enforced: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn verdict_carries_direct_answer_assessment() {
    let engine = MockEngine::new().with_default_payload(json!({"citations": []}));
    let auditor = Auditor::new(engine, MockNormalizer::new(), fast_config()).unwrap();

    let outcome = auditor.audit_document(&article(), None).await;
    let report = &outcome.verdict().unwrap().direct_answer;

    // 36-word statement opening, no weak or promotional phrases
    assert!(report.has_direct_answer);
    assert_eq!(report.score, 50);
    assert!(!report.reasons.is_empty());
}

#[tokio::test]
async fn idempotent_cited_flag_on_rerun() {
    let engine = MockEngine::new().with_default_payload(json!({
        "citations": ["https://ex.com/a"]
    }));
    let auditor = Auditor::new(engine, MockNormalizer::new(), fast_config()).unwrap();

    let first = auditor.audit_document(&article(), None).await;
    let second = auditor.audit_document(&article(), None).await;

    assert_eq!(
        first.verdict().unwrap().cited,
        second.verdict().unwrap().cited
    );
}

proptest! {
    // An exact URL match is never outranked by a fuzzy match, whatever
    // the fuzzy confidence.
    #[test]
    fn exact_tier_always_outranks_fuzzy(confidence in 0.0f64..=1.0) {
        let exact = MatchResult {
            source_id: "doc".into(),
            query_id: "q".into(),
            cited_url: "https://ex.com/a".into(),
            tier: MatchTier::ExactUrl,
            confidence: 1.0,
            rank: Some(9),
            quoted_text: None,
        };
        let fuzzy = MatchResult {
            source_id: "doc".into(),
            query_id: "q".into(),
            cited_url: "https://other.com/b".into(),
            tier: MatchTier::FuzzyText,
            confidence,
            rank: Some(1),
            quoted_text: None,
        };

        prop_assert_eq!(exact.cmp_priority(&fuzzy), Ordering::Less);
        prop_assert_eq!(fuzzy.cmp_priority(&exact), Ordering::Greater);
    }
}
