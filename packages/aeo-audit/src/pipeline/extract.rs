//! Citation extraction from raw engine payloads.
//!
//! Engine payloads are schema-variant: older responses carry a bare
//! `citations` array of URL strings, newer ones a `search_results` array
//! of objects, and both shapes drift. Extraction recognizes known fields
//! and skips anything malformed; a bad entry costs one citation, never
//! the whole response.

use serde_json::Value;

use crate::types::{CitationRecord, RawEngineResponse};

/// Citations pulled from one response, plus a count of entries skipped
/// as malformed.
#[derive(Debug, Default)]
pub struct ExtractedCitations {
    /// Citations in payload order
    pub records: Vec<CitationRecord>,

    /// Entries dropped because no usable URL could be found
    pub skipped: usize,
}

/// Extract citation records from a terminal engine response.
///
/// Error responses yield zero citations; the caller counts them as
/// degraded rather than aborting anything.
pub fn extract_citations(response: &RawEngineResponse) -> ExtractedCitations {
    let payload = match (&response.payload, response.is_ok()) {
        (Some(payload), true) => payload,
        _ => return ExtractedCitations::default(),
    };

    // Prefer the richer search_results shape; fall back to citations.
    let entries = payload
        .get("search_results")
        .and_then(Value::as_array)
        .filter(|arr| !arr.is_empty())
        .or_else(|| payload.get("citations").and_then(Value::as_array));

    let Some(entries) = entries else {
        return ExtractedCitations::default();
    };

    let mut extracted = ExtractedCitations::default();
    for (index, entry) in entries.iter().enumerate() {
        match parse_entry(&response.query_id, entry, index) {
            Some(record) => extracted.records.push(record),
            None => extracted.skipped += 1,
        }
    }

    extracted
}

/// Parse one citation entry; `None` means the entry is unusable.
fn parse_entry(response_id: &str, entry: &Value, index: usize) -> Option<CitationRecord> {
    // Bare URL string
    if let Some(url) = entry.as_str() {
        if url.trim().is_empty() {
            return None;
        }
        return Some(CitationRecord::new(response_id, url.trim()).with_rank(index as u32 + 1));
    }

    // Object entry: url is required, everything else optional
    let object = entry.as_object()?;
    let url = object
        .get("url")
        .or_else(|| object.get("link"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|u| !u.is_empty())?;

    let mut record = CitationRecord::new(response_id, url);

    if let Some(title) = object.get("title").and_then(Value::as_str) {
        record = record.with_title(title);
    }

    let quoted = object
        .get("snippet")
        .or_else(|| object.get("quote"))
        .or_else(|| object.get("text"))
        .and_then(Value::as_str);
    if let Some(quoted) = quoted {
        record = record.with_quoted_text(quoted);
    }

    let rank = object
        .get("rank")
        .or_else(|| object.get("position"))
        .and_then(Value::as_u64)
        .map(|r| r as u32)
        .unwrap_or(index as u32 + 1);

    Some(record.with_rank(rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DerivationStrategy, ProbeQuery, ResponseErrorKind, SourceDocument};
    use serde_json::json;

    fn response(payload: Value) -> RawEngineResponse {
        let doc = SourceDocument::new("https://example.com", "body").with_source_id("doc-1");
        let query = ProbeQuery::new(&doc, DerivationStrategy::TitleTopic, "q");
        RawEngineResponse::ok(&query, payload, 10)
    }

    #[test]
    fn test_bare_url_citations() {
        let extracted = extract_citations(&response(json!({
            "citations": ["https://a.com/x", "https://b.com/y"]
        })));

        assert_eq!(extracted.records.len(), 2);
        assert_eq!(extracted.skipped, 0);
        assert_eq!(extracted.records[0].cited_url, "https://a.com/x");
        assert_eq!(extracted.records[0].rank, Some(1));
        assert_eq!(extracted.records[1].rank, Some(2));
    }

    #[test]
    fn test_search_results_preferred_over_citations() {
        let extracted = extract_citations(&response(json!({
            "citations": ["https://ignored.com"],
            "search_results": [
                {"url": "https://a.com/x", "title": "A", "snippet": "quoted words"}
            ]
        })));

        assert_eq!(extracted.records.len(), 1);
        assert_eq!(extracted.records[0].cited_url, "https://a.com/x");
        assert_eq!(extracted.records[0].cited_title.as_deref(), Some("A"));
        assert_eq!(
            extracted.records[0].quoted_text.as_deref(),
            Some("quoted words")
        );
    }

    #[test]
    fn test_malformed_entries_are_skipped_not_fatal() {
        let extracted = extract_citations(&response(json!({
            "citations": [
                "https://a.com/x",
                42,
                {"title": "no url"},
                "",
                "https://b.com/y"
            ]
        })));

        assert_eq!(extracted.records.len(), 2);
        assert_eq!(extracted.skipped, 3);
        // payload order preserved
        assert_eq!(extracted.records[0].cited_url, "https://a.com/x");
        assert_eq!(extracted.records[1].cited_url, "https://b.com/y");
        assert_eq!(extracted.records[1].rank, Some(5));
    }

    #[test]
    fn test_explicit_rank_overrides_position() {
        let extracted = extract_citations(&response(json!({
            "search_results": [
                {"url": "https://a.com", "rank": 7}
            ]
        })));

        assert_eq!(extracted.records[0].rank, Some(7));
    }

    #[test]
    fn test_missing_citation_fields_yield_empty() {
        let extracted = extract_citations(&response(json!({
            "choices": [{"message": {"content": "no citations here"}}]
        })));

        assert!(extracted.records.is_empty());
        assert_eq!(extracted.skipped, 0);
    }

    #[test]
    fn test_error_response_yields_zero_citations() {
        let doc = SourceDocument::new("https://example.com", "body");
        let query = ProbeQuery::new(&doc, DerivationStrategy::TitleTopic, "q");
        let response =
            RawEngineResponse::error(&query, ResponseErrorKind::Transient, "exhausted", 10);

        let extracted = extract_citations(&response);
        assert!(extracted.records.is_empty());
    }
}
