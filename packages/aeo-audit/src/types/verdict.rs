//! Match results, audit verdicts, and failure markers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::answerability::DirectAnswerReport;

/// Precedence class of an identity match.
///
/// Declared in precedence order: an exact URL match always outranks a
/// canonical one, which outranks any fuzzy text match, regardless of the
/// numeric confidence. "No match" is represented by the absence of a
/// [`MatchResult`], not a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Cited URL equals the document URL
    ExactUrl,

    /// Cited URL equals the canonical URL after normalization
    CanonicalUrl,

    /// Quoted text is similar to the document body
    FuzzyText,
}

/// An authoritative identity match between one citation and one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// The matched document
    pub source_id: String,

    /// Query whose response carried the citation
    pub query_id: String,

    /// URL as cited by the engine
    pub cited_url: String,

    /// Precedence class
    pub tier: MatchTier,

    /// Confidence in [0.0, 1.0]; 1.0 exact, 0.9 canonical, similarity score fuzzy
    pub confidence: f64,

    /// Rank of the citation in its answer, if known
    pub rank: Option<u32>,

    /// Quoted text carried by the citation, if any
    pub quoted_text: Option<String>,
}

impl MatchResult {
    /// Total ordering used everywhere a "best" match is selected:
    /// higher tier first, then higher confidence, then lower rank
    /// (unranked citations sort last).
    pub fn cmp_priority(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then_with(|| {
                other
                    .confidence
                    .partial_cmp(&self.confidence)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| match (self.rank, other.rank) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

/// Terminal artifact of one source page's audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditVerdict {
    /// The audited document
    pub source_id: String,

    /// Whether the engine cites this document
    pub cited: bool,

    /// Highest-precedence match found, if any
    pub best_match: Option<MatchResult>,

    /// Distinct query ids that contributed a counting match, in query order
    pub supporting_queries: Vec<String>,

    /// Representative quoted-text snippets from the top matches
    pub evidence: Vec<String>,

    /// Queries whose terminal response was an error (zero citations, degraded)
    pub degraded_queries: usize,

    /// Citation entries skipped during extraction as malformed
    pub skipped_citations: usize,

    /// Whether the page's opening paragraph reads as a direct answer;
    /// uncited pages with a weak opening are the primary AEO gap
    pub direct_answer: DirectAnswerReport,

    /// When the verdict was computed
    pub computed_at: DateTime<Utc>,
}

/// Why a page failed to produce a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Content normalizer could not fetch the page
    Fetch,

    /// Content normalizer could not parse the page
    Parse,

    /// Body too short to derive probe queries
    InsufficientContent,

    /// Every probe query ended in an API error
    Api,

    /// The batch deadline expired before the page completed
    TimedOut,
}

/// Per-page failure report. Pages fail individually; a marker for one page
/// never affects any other page in the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureMarker {
    /// The page that failed (source id, or the requested URL when
    /// normalization never produced a document)
    pub source_id: String,

    /// Failure category
    pub kind: FailureKind,

    /// Human-readable reason
    pub reason: String,
}

impl FailureMarker {
    /// Create a failure marker.
    pub fn new(source_id: impl Into<String>, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Outcome of one requested page: a verdict or an explicit failure.
/// Every requested page yields exactly one of these, never a silent omission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The audit completed
    Verdict(AuditVerdict),

    /// The page failed with a typed reason
    Failed(FailureMarker),
}

impl AuditOutcome {
    /// The verdict, if the audit completed.
    pub fn verdict(&self) -> Option<&AuditVerdict> {
        match self {
            Self::Verdict(v) => Some(v),
            Self::Failed(_) => None,
        }
    }

    /// The failure marker, if the audit failed.
    pub fn failure(&self) -> Option<&FailureMarker> {
        match self {
            Self::Verdict(_) => None,
            Self::Failed(f) => Some(f),
        }
    }
}
