//! Normalized source documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source page after content normalization.
///
/// Produced by a [`ContentNormalizer`](crate::traits::ContentNormalizer)
/// implementation and immutable for the rest of the pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Stable identifier for this document within a run
    pub source_id: String,

    /// The URL the document was fetched from
    pub url: String,

    /// Publisher-declared canonical URL, if any
    pub canonical_url: Option<String>,

    /// Page title
    pub title: String,

    /// Normalized plain-text body
    pub body_text: String,

    /// When the content was fetched
    pub fetched_at: DateTime<Utc>,
}

impl SourceDocument {
    /// Create a new document. The source id defaults to the URL.
    pub fn new(url: impl Into<String>, body_text: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            source_id: url.clone(),
            url,
            canonical_url: None,
            title: String::new(),
            body_text: body_text.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Set an explicit source id.
    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = id.into();
        self
    }

    /// Set the canonical URL.
    pub fn with_canonical_url(mut self, url: impl Into<String>) -> Self {
        self.canonical_url = Some(url.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the fetch timestamp.
    pub fn with_fetched_at(mut self, at: DateTime<Utc>) -> Self {
        self.fetched_at = at;
        self
    }
}
