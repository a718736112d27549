//! Direct-answer assessment.
//!
//! Scores how well a page's opening paragraph would serve as a direct
//! answer, the form answer engines prefer to quote. Six weighted checks
//! over the normalized body text; fully deterministic, no network.

use regex::Regex;

use crate::types::{DirectAnswerReport, SourceDocument};

/// Score at or above which the opening counts as a direct answer.
const DIRECT_ANSWER_THRESHOLD: u8 = 50;

/// Openers that postpone the answer.
const WEAK_OPENERS: &[&str] = &[
    "in this article",
    "in this post",
    "welcome to",
    "today we",
    "let's",
    "click here",
    "subscribe",
];

/// Words that signal selling rather than answering.
const PROMO_WORDS: &[&str] = &[
    "buy", "purchase", "discount", "sale", "offer", "deal", "subscribe",
];

/// Assess the document's opening paragraph as a direct answer.
pub fn assess_direct_answer(doc: &SourceDocument) -> DirectAnswerReport {
    let Some(opening) = opening_paragraph(&doc.body_text) else {
        return DirectAnswerReport::absent("no usable opening paragraph");
    };

    let lowered = opening.to_lowercase();
    let mut score: u8 = 0;
    let mut reasons: Vec<String> = Vec::new();

    // Length: concise but substantial
    let words = opening.split_whitespace().count();
    if (20..=100).contains(&words) {
        score += 25;
        reasons.push(format!("opening length is good ({words} words)"));
    } else if words < 20 {
        reasons.push(format!("opening is too short ({words} words)"));
    } else {
        score += 10;
        reasons.push(format!("opening is long ({words} words)"));
    }

    // Opens with a statement, not a question
    if opening.trim_end().ends_with('?') {
        reasons.push("opening is a question, not an answer".to_string());
    } else if ["the ", "a ", "an ", "it ", "this ", "there "]
        .iter()
        .any(|w| lowered.starts_with(w))
    {
        score += 20;
        reasons.push("opens with a definitive statement".to_string());
    }

    // Defining language
    let defining = Regex::new(r"\b(is|are|means|refers to|defined as|known as|called)\b").unwrap();
    if defining.is_match(&lowered) {
        score += 20;
        reasons.push("uses defining language".to_string());
    }

    // Gets to the point
    if WEAK_OPENERS.iter().any(|w| lowered.starts_with(w)) {
        reasons.push("opens with a weak or promotional phrase".to_string());
    } else {
        score += 15;
        reasons.push("does not open with a weak phrase".to_string());
    }

    // Specific numbers or data
    if opening.chars().any(|c| c.is_ascii_digit()) {
        score += 10;
        reasons.push("contains specific numbers".to_string());
    }

    // Informational, not promotional
    if PROMO_WORDS.iter().any(|w| lowered.contains(w)) {
        reasons.push("contains promotional language".to_string());
    } else {
        score += 10;
        reasons.push("free of promotional language".to_string());
    }

    let score = score.min(100);
    DirectAnswerReport {
        has_direct_answer: score >= DIRECT_ANSWER_THRESHOLD,
        score,
        reasons,
    }
}

/// The first body segment long enough to be a paragraph. Normalizers
/// that flatten paragraph breaks yield the whole body as one segment.
fn opening_paragraph(body: &str) -> Option<&str> {
    body.split('\n').map(str::trim).find(|p| p.len() > 20)
}
