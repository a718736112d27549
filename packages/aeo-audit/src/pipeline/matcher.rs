//! Identity matching between citations and source documents.
//!
//! Tiered, short-circuiting per citation: exact URL, then canonical URL,
//! then fuzzy text similarity. Tier precedence is strict; a fuzzy match
//! can never outrank a URL match no matter its score.
//!
//! The exact tier compares the cited URL against the document URL alone,
//! case-normalized but otherwise verbatim, so `/a` and `/a/` stay
//! distinct. Slash, query-string, and tracking-parameter equivalence is
//! the canonical tier's job; a citation that only matches once those are
//! dropped is a canonical match at confidence 0.9, not an exact one.

use std::collections::HashSet;
use url::Url;

use crate::types::{CitationRecord, MatchResult, MatchTier, SourceDocument};

/// Confidence assigned to canonical-URL matches.
const CANONICAL_CONFIDENCE: f64 = 0.9;

/// Minimum distinct tokens a quote needs before the fuzzy tier applies.
/// A one- or two-word quote present in almost any body would otherwise
/// score a perfect containment against an unrelated URL.
const MIN_FUZZY_TOKENS: usize = 4;

/// Match one citation against the document. `None` means no tier applies
/// (the citation is excluded from aggregation).
pub fn match_citation(
    doc: &SourceDocument,
    citation: &CitationRecord,
    fuzzy_floor: f64,
) -> Option<MatchResult> {
    let result = |tier, confidence| MatchResult {
        source_id: doc.source_id.clone(),
        query_id: citation.response_id.clone(),
        cited_url: citation.cited_url.clone(),
        tier,
        confidence,
        rank: citation.rank,
        quoted_text: citation.quoted_text.clone(),
    };

    // Tier 1: exact URL
    if normalize_exact(&citation.cited_url) == normalize_exact(&doc.url) {
        return Some(result(MatchTier::ExactUrl, 1.0));
    }

    // Tier 2: canonical URL (document URL stands in when no canonical is declared)
    let doc_canonical = doc.canonical_url.as_deref().unwrap_or(&doc.url);
    if normalize_canonical(&citation.cited_url) == normalize_canonical(doc_canonical) {
        return Some(result(MatchTier::CanonicalUrl, CANONICAL_CONFIDENCE));
    }

    // Tier 3: fuzzy text similarity over the quoted snippet
    if let Some(quoted) = &citation.quoted_text {
        if tokens(quoted).len() >= MIN_FUZZY_TOKENS {
            let score = token_containment(quoted, &doc.body_text);
            if score >= fuzzy_floor {
                return Some(result(MatchTier::FuzzyText, score));
            }
        }
    }

    None
}

/// Match all citations gathered for a document, sorted best-first by
/// tier, then confidence, then rank.
pub fn match_citations(
    doc: &SourceDocument,
    citations: &[CitationRecord],
    fuzzy_floor: f64,
) -> Vec<MatchResult> {
    let mut matches: Vec<MatchResult> = citations
        .iter()
        .filter_map(|c| match_citation(doc, c, fuzzy_floor))
        .collect();
    matches.sort_by(|a, b| a.cmp_priority(b));
    matches
}

/// Case-normalized URL identity: scheme dropped, host lowercased with any
/// `www.` prefix removed, path and query kept verbatim.
fn normalize_exact(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("").trim_start_matches("www.");
            let mut normalized = format!("{}{}", host.to_lowercase(), url.path());
            if let Some(query) = url.query() {
                normalized.push('?');
                normalized.push_str(query);
            }
            normalized
        }
        // Not an absolute URL; fall back to plain string normalization
        Err(_) => strip_scheme(raw).to_lowercase(),
    }
}

/// Canonical URL form: domain plus path, trailing slash trimmed, query
/// string and fragment dropped (which removes tracking parameters).
fn normalize_canonical(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("").trim_start_matches("www.");
            let path = url.path().trim_end_matches('/');
            format!("{}{}", host.to_lowercase(), path)
        }
        Err(_) => {
            let stripped = strip_scheme(raw).to_lowercase();
            let without_query = stripped
                .split(['?', '#'])
                .next()
                .unwrap_or("")
                .trim_end_matches('/');
            without_query.to_string()
        }
    }
}

fn strip_scheme(raw: &str) -> &str {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .unwrap_or(raw);
    raw.strip_prefix("www.").unwrap_or(raw)
}

/// Fraction of the quoted snippet's tokens that appear in the body.
///
/// Asymmetric on purpose: the body is far larger than any snippet, so
/// containment of the snippet is what signals identity.
fn token_containment(quoted: &str, body: &str) -> f64 {
    let quoted_tokens = tokens(quoted);
    if quoted_tokens.is_empty() {
        return 0.0;
    }
    let body_tokens = tokens(body);

    let overlap = quoted_tokens.intersection(&body_tokens).count();
    overlap as f64 / quoted_tokens.len() as f64
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
