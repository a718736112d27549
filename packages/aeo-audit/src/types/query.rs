//! Probe queries derived from source documents.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::document::SourceDocument;

/// How a probe query was derived from its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationStrategy {
    /// "What is {topic}" built from the cleaned title
    TitleTopic,

    /// "How does {topic} work"
    HowItWorks,

    /// "{topic} best practices"
    BestPractices,

    /// Built from a high-frequency body phrase
    KeyPhrase,
}

impl DerivationStrategy {
    /// Stable tag used in query ids and logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::TitleTopic => "title_topic",
            Self::HowItWorks => "how_it_works",
            Self::BestPractices => "best_practices",
            Self::KeyPhrase => "key_phrase",
        }
    }
}

/// A synthetic question used to elicit a citation-bearing answer.
///
/// Each query belongs to exactly one source document. Query ids are
/// content-derived so reruns over the same document produce the same ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeQuery {
    /// Deterministic identifier
    pub query_id: String,

    /// Owning document's source id
    pub source_id: String,

    /// Natural-language query text
    pub text: String,

    /// How this query was derived
    pub strategy: DerivationStrategy,
}

impl ProbeQuery {
    /// Create a query for a document, deriving a deterministic id.
    pub fn new(doc: &SourceDocument, strategy: DerivationStrategy, text: impl Into<String>) -> Self {
        let text = text.into();
        let query_id = deterministic_id(&doc.source_id, strategy.tag(), &text);
        Self {
            query_id,
            source_id: doc.source_id.clone(),
            text,
            strategy,
        }
    }
}

/// Short hex digest of (source, strategy, text).
fn deterministic_id(source_id: &str, tag: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_id.as_bytes());
    hasher.update([0]);
    hasher.update(tag.as_bytes());
    hasher.update([0]);
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();

    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}
