//! Verdict aggregation.
//!
//! Combines everything gathered for one page into a single verdict, and
//! batch outcomes into summary statistics. Both are pure functions of
//! their inputs (aside from the verdict timestamp), so arrival order of
//! query results never changes the output.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::pipeline::answerability::assess_direct_answer;
use crate::pipeline::matcher::match_citation;
use crate::types::{
    AuditConfig, AuditOutcome, AuditVerdict, CitationRecord, MatchResult, MatchTier, ProbeQuery,
    RawEngineResponse, SourceDocument,
};

/// Evidence snippets longer than this are truncated.
const SNIPPET_MAX_CHARS: usize = 300;

/// Everything gathered for one probe query.
#[derive(Debug)]
pub struct QueryAudit {
    /// The probe query
    pub query: ProbeQuery,

    /// Terminal engine response
    pub response: RawEngineResponse,

    /// Citations extracted from the response (empty for error responses)
    pub citations: Vec<CitationRecord>,

    /// Malformed citation entries skipped during extraction
    pub skipped: usize,
}

/// Whether a match counts toward `cited`: exact and canonical tiers
/// always count, fuzzy only at or above the configured threshold.
fn counts(m: &MatchResult, config: &AuditConfig) -> bool {
    m.tier != MatchTier::FuzzyText || m.confidence >= config.fuzzy_threshold
}

/// Combine all of a page's query results into one verdict.
pub fn aggregate(
    doc: &SourceDocument,
    audits: &[QueryAudit],
    config: &AuditConfig,
) -> AuditVerdict {
    let mut matches: Vec<MatchResult> = audits
        .iter()
        .flat_map(|audit| audit.citations.iter())
        .filter_map(|citation| match_citation(doc, citation, config.fuzzy_floor))
        .collect();
    matches.sort_by(|a, b| a.cmp_priority(b));

    let cited = matches.iter().any(|m| counts(m, config));

    // Counting matches sort above non-counting ones within and across
    // tiers, so the head of the sorted list is the authoritative best.
    let best_match = matches.first().cloned();

    let counting_queries: HashSet<&str> = matches
        .iter()
        .filter(|m| counts(m, config))
        .map(|m| m.query_id.as_str())
        .collect();
    let mut supporting_queries: Vec<String> = Vec::new();
    for audit in audits {
        if counting_queries.contains(audit.query.query_id.as_str())
            && !supporting_queries.contains(&audit.query.query_id)
        {
            supporting_queries.push(audit.query.query_id.clone());
        }
    }

    let mut evidence: Vec<String> = Vec::new();
    for m in matches.iter().filter(|m| counts(m, config)) {
        if evidence.len() >= config.evidence_limit {
            break;
        }
        if let Some(quoted) = &m.quoted_text {
            let snippet = truncate_snippet(quoted);
            if !evidence.contains(&snippet) {
                evidence.push(snippet);
            }
        }
    }

    AuditVerdict {
        source_id: doc.source_id.clone(),
        cited,
        best_match,
        supporting_queries,
        evidence,
        degraded_queries: audits.iter().filter(|a| !a.response.is_ok()).count(),
        skipped_citations: audits.iter().map(|a| a.skipped).sum(),
        direct_answer: assess_direct_answer(doc),
        computed_at: Utc::now(),
    }
}

fn truncate_snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_MAX_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
    format!("{truncated}...")
}

/// Summary statistics over a batch's outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationStats {
    /// Pages requested
    pub total_pages: usize,

    /// Pages with a cited verdict
    pub cited_pages: usize,

    /// Pages with an uncited verdict
    pub uncited_pages: usize,

    /// Pages that failed with a marker
    pub failed_pages: usize,

    /// cited / (cited + uncited), as a percentage; 0 when no verdicts
    pub citation_rate: f64,

    /// Distinct best-match URLs across cited verdicts, sorted
    pub cited_sources: Vec<String>,
}

impl CitationStats {
    /// Compute statistics from a batch result.
    pub fn from_outcomes(outcomes: &HashMap<String, AuditOutcome>) -> Self {
        let mut cited_pages = 0;
        let mut uncited_pages = 0;
        let mut failed_pages = 0;
        let mut cited_sources: BTreeSet<String> = BTreeSet::new();

        for outcome in outcomes.values() {
            match outcome {
                AuditOutcome::Verdict(v) if v.cited => {
                    cited_pages += 1;
                    if let Some(best) = &v.best_match {
                        cited_sources.insert(best.cited_url.clone());
                    }
                }
                AuditOutcome::Verdict(_) => uncited_pages += 1,
                AuditOutcome::Failed(_) => failed_pages += 1,
            }
        }

        let audited = cited_pages + uncited_pages;
        let citation_rate = if audited > 0 {
            cited_pages as f64 / audited as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_pages: outcomes.len(),
            cited_pages,
            uncited_pages,
            failed_pages,
            citation_rate,
            cited_sources: cited_sources.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DerivationStrategy;
    use serde_json::json;

    fn doc() -> SourceDocument {
        SourceDocument::new(
            "https://ex.com/a",
            "Sourdough fermentation depends on wild yeast and careful hydration control.",
        )
        .with_source_id("doc-1")
        .with_canonical_url("https://ex.com/a/")
    }

    fn audit_for(doc: &SourceDocument, text: &str, citations: Vec<CitationRecord>) -> QueryAudit {
        let query = ProbeQuery::new(doc, DerivationStrategy::TitleTopic, text);
        let response = RawEngineResponse::ok(&query, json!({}), 10);
        let citations = citations
            .into_iter()
            .map(|mut c| {
                c.response_id = query.query_id.clone();
                c
            })
            .collect();
        QueryAudit {
            query,
            response,
            citations,
            skipped: 0,
        }
    }

    #[test]
    fn test_zero_citations_means_not_cited() {
        let doc = doc();
        let audits = vec![
            audit_for(&doc, "q1", vec![]),
            audit_for(&doc, "q2", vec![]),
            audit_for(&doc, "q3", vec![]),
        ];

        let verdict = aggregate(&doc, &audits, &AuditConfig::default());
        assert!(!verdict.cited);
        assert!(verdict.best_match.is_none());
        assert!(verdict.supporting_queries.is_empty());
        assert!(verdict.evidence.is_empty());
    }

    #[test]
    fn test_canonical_match_makes_cited() {
        let doc = doc();
        let audits = vec![audit_for(
            &doc,
            "q1",
            vec![CitationRecord::new("", "https://ex.com/a/")],
        )];

        let verdict = aggregate(&doc, &audits, &AuditConfig::default());
        assert!(verdict.cited);
        let best = verdict.best_match.unwrap();
        assert_eq!(best.tier, MatchTier::CanonicalUrl);
        assert_eq!(best.confidence, 0.9);
        assert_eq!(verdict.supporting_queries.len(), 1);
    }

    #[test]
    fn test_below_threshold_fuzzy_does_not_count() {
        let doc = doc();
        // 0.5 containment: at the floor, below the counting threshold
        let cited = CitationRecord::new("", "https://other.com/x")
            .with_quoted_text("sourdough fermentation depends strongly alkaline flour");
        let audits = vec![audit_for(&doc, "q1", vec![cited])];

        let verdict = aggregate(&doc, &audits, &AuditConfig::default());
        assert!(!verdict.cited);
        // the near-miss is still reported as best_match for diagnostics
        let best = verdict.best_match.unwrap();
        assert_eq!(best.tier, MatchTier::FuzzyText);
        assert!(verdict.supporting_queries.is_empty());
    }

    #[test]
    fn test_exact_outranks_fuzzy_in_best_match() {
        let doc = doc();
        let fuzzy = CitationRecord::new("", "https://other.com/x")
            .with_quoted_text("sourdough fermentation depends on wild yeast and careful hydration");
        let exact = CitationRecord::new("", "https://ex.com/a");
        let audits = vec![audit_for(&doc, "q1", vec![fuzzy, exact])];

        let verdict = aggregate(&doc, &audits, &AuditConfig::default());
        assert_eq!(verdict.best_match.unwrap().tier, MatchTier::ExactUrl);
    }

    #[test]
    fn test_supporting_queries_are_distinct_and_ordered() {
        let doc = doc();
        let hit = || CitationRecord::new("", "https://ex.com/a");
        let audits = vec![
            audit_for(&doc, "q1", vec![hit(), hit()]),
            audit_for(&doc, "q2", vec![]),
            audit_for(&doc, "q3", vec![hit()]),
        ];

        let verdict = aggregate(&doc, &audits, &AuditConfig::default());
        assert_eq!(verdict.supporting_queries.len(), 2);
        assert_eq!(verdict.supporting_queries[0], audits[0].query.query_id);
        assert_eq!(verdict.supporting_queries[1], audits[2].query.query_id);
    }

    #[test]
    fn test_evidence_is_truncated_and_limited() {
        let doc = doc();
        let long_quote = format!(
            "sourdough fermentation depends on wild yeast {}",
            "and careful hydration control ".repeat(30)
        );
        let cited = CitationRecord::new("", "https://ex.com/a").with_quoted_text(&long_quote);
        let audits = vec![audit_for(&doc, "q1", vec![cited])];

        let verdict = aggregate(&doc, &audits, &AuditConfig::default());
        assert_eq!(verdict.evidence.len(), 1);
        assert!(verdict.evidence[0].ends_with("..."));
        assert!(verdict.evidence[0].chars().count() <= SNIPPET_MAX_CHARS + 3);
    }

    #[test]
    fn test_stats_from_outcomes() {
        let doc = doc();
        let cited_verdict = aggregate(
            &doc,
            &[audit_for(
                &doc,
                "q1",
                vec![CitationRecord::new("", "https://ex.com/a")],
            )],
            &AuditConfig::default(),
        );
        let uncited_verdict = aggregate(&doc, &[], &AuditConfig::default());

        let mut outcomes = HashMap::new();
        outcomes.insert("a".to_string(), AuditOutcome::Verdict(cited_verdict));
        outcomes.insert("b".to_string(), AuditOutcome::Verdict(uncited_verdict));
        outcomes.insert(
            "c".to_string(),
            AuditOutcome::Failed(crate::types::FailureMarker::new(
                "c",
                crate::types::FailureKind::Fetch,
                "connection refused",
            )),
        );

        let stats = CitationStats::from_outcomes(&outcomes);
        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.cited_pages, 1);
        assert_eq!(stats.uncited_pages, 1);
        assert_eq!(stats.failed_pages, 1);
        assert!((stats.citation_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(stats.cited_sources, vec!["https://ex.com/a".to_string()]);
    }
}
