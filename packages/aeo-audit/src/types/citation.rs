//! Normalized citation records.

use serde::{Deserialize, Serialize};

/// One citation extracted from an engine response.
///
/// Zero or many per response. Fields beyond the URL are optional because
/// citation schemas vary across engine versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationRecord {
    /// Query id of the producing response
    pub response_id: String,

    /// The URL the engine cited
    pub cited_url: String,

    /// Title the engine attached to the citation, if any
    pub cited_title: Option<String>,

    /// Text the engine quoted from the cited source, if any
    pub quoted_text: Option<String>,

    /// 1-based position of this citation in the answer, if known
    pub rank: Option<u32>,
}

impl CitationRecord {
    /// Create a citation with just a URL.
    pub fn new(response_id: impl Into<String>, cited_url: impl Into<String>) -> Self {
        Self {
            response_id: response_id.into(),
            cited_url: cited_url.into(),
            cited_title: None,
            quoted_text: None,
            rank: None,
        }
    }

    /// Set the cited title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.cited_title = Some(title.into());
        self
    }

    /// Set the quoted text.
    pub fn with_quoted_text(mut self, text: impl Into<String>) -> Self {
        self.quoted_text = Some(text.into());
        self
    }

    /// Set the rank.
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }
}
