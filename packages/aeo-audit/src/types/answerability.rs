//! Direct-answer assessment of a source page.

use serde::{Deserialize, Serialize};

/// How well a page's opening paragraph works as a direct answer.
///
/// Answer engines favor pages that answer the question in the first
/// paragraph. The assessment is a deterministic rubric over the
/// normalized body text; `reasons` records which checks passed or failed
/// so a content owner can act on the score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectAnswerReport {
    /// Whether the opening paragraph reads as a direct answer
    pub has_direct_answer: bool,

    /// Rubric score, 0 to 100
    pub score: u8,

    /// Per-check outcomes, in rubric order
    pub reasons: Vec<String>,
}

impl DirectAnswerReport {
    /// Report for a page with no usable opening paragraph.
    pub fn absent(reason: impl Into<String>) -> Self {
        Self {
            has_direct_answer: false,
            score: 0,
            reasons: vec![reason.into()],
        }
    }
}
