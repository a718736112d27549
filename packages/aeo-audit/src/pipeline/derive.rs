//! Probe query derivation.
//!
//! Turns a normalized document into natural-language questions likely to
//! trigger a citation of that content. Derivation is rule-based and fully
//! deterministic given the same document and configuration, so reruns are
//! reproducible.

use regex::Regex;
use std::collections::HashMap;

use crate::error::{AuditError, Result};
use crate::types::{AuditConfig, DerivationStrategy, ProbeQuery, SourceDocument};

/// Words ignored during keyword extraction.
const STOPWORDS: &[&str] = &[
    "about", "after", "also", "because", "been", "before", "being", "between", "both", "could",
    "does", "during", "each", "from", "have", "having", "here", "into", "just", "like", "more",
    "most", "much", "only", "other", "over", "same", "should", "some", "such", "than", "that",
    "their", "them", "then", "there", "these", "they", "this", "those", "through", "under",
    "very", "what", "when", "where", "which", "while", "will", "with", "would", "your",
];

/// Derive an ordered sequence of probe queries for a document.
///
/// Fails with [`AuditError::InsufficientContent`] when the body is below
/// the configured minimum; that failure is reported, never retried.
pub fn derive_queries(doc: &SourceDocument, config: &AuditConfig) -> Result<Vec<ProbeQuery>> {
    let body = doc.body_text.trim();
    if body.len() < config.min_body_chars {
        return Err(AuditError::InsufficientContent {
            source_id: doc.source_id.clone(),
            chars: body.len(),
        });
    }

    let keywords = ranked_keywords(body);
    let topic = match extract_topic(&doc.title) {
        Some(topic) => topic,
        // No usable title: build a topic from the two strongest keywords
        None => keywords.iter().take(2).cloned().collect::<Vec<_>>().join(" "),
    };

    if topic.is_empty() {
        return Err(AuditError::InsufficientContent {
            source_id: doc.source_id.clone(),
            chars: body.len(),
        });
    }

    let mut queries: Vec<ProbeQuery> = Vec::new();
    let mut push = |queries: &mut Vec<ProbeQuery>, strategy, text: String| {
        let duplicate = queries
            .iter()
            .any(|q: &ProbeQuery| q.text.eq_ignore_ascii_case(&text));
        if !duplicate && queries.len() < config.queries_per_page {
            queries.push(ProbeQuery::new(doc, strategy, text));
        }
    };

    push(
        &mut queries,
        DerivationStrategy::TitleTopic,
        format!("What is {topic}"),
    );
    push(
        &mut queries,
        DerivationStrategy::HowItWorks,
        format!("How does {topic} work"),
    );
    push(
        &mut queries,
        DerivationStrategy::BestPractices,
        format!("{topic} best practices"),
    );

    for keyword in &keywords {
        if queries.len() >= config.queries_per_page {
            break;
        }
        // Keywords already inside the topic add nothing
        if topic.contains(keyword.as_str()) {
            continue;
        }
        push(
            &mut queries,
            DerivationStrategy::KeyPhrase,
            format!("{topic} {keyword}"),
        );
    }

    Ok(queries)
}

/// Pull the core topic out of a page title.
///
/// Takes the first segment before a site-name separator, strips common
/// editorial prefixes ("The Ultimate Guide to ...", "Understanding ...")
/// and leading articles, and lowercases the result.
fn extract_topic(title: &str) -> Option<String> {
    let separator = Regex::new(r"\s*[|–—:]\s*|\s+-\s+").unwrap();
    let segment = separator.split(title).next().unwrap_or("").trim();
    if segment.is_empty() {
        return None;
    }

    let mut topic = segment.to_lowercase();

    let prefixes = [
        r"^my\s+(take|thoughts|view|opinion|guide)\s+(on|to)\s+",
        r"^our\s+(take|thoughts|view|guide)\s+(on|to)\s+",
        r"^the\s+(definitive|ultimate|complete|official|essential)\s+(guide\s+to|home\s+of)\s+",
        r"^(the\s+)?(official\s+)?(home|site|page)\s+(of|for)\s+(the\s+)?",
        r"^(understanding|exploring|introducing|announcing)\s+",
        r"^(what|why|how)\s+(is|are|to|does)\s+",
        r"^the\s+(best|top|ultimate)\s+",
        r"^(guide|introduction)\s+to\s+",
    ];
    for pattern in prefixes {
        let re = Regex::new(pattern).unwrap();
        if let Some(m) = re.find(&topic) {
            topic = topic[m.end()..].to_string();
            break;
        }
    }

    let article = Regex::new(r"^(the|a|an)\s+").unwrap();
    topic = article.replace(&topic, "").trim().to_string();

    // Trailing question marks from question-style titles
    topic = topic.trim_end_matches(['?', '.', '!']).trim().to_string();

    if topic.is_empty() {
        None
    } else {
        Some(topic)
    }
}

/// Body keywords ranked by frequency, ties broken by first occurrence.
fn ranked_keywords(body: &str) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for (position, raw) in body.split_whitespace().enumerate() {
        let word: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        if word.len() < 4 || STOPWORDS.contains(&word.as_str()) {
            continue;
        }

        let entry = counts.entry(word).or_insert((0, position));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().map(|(word, _)| word).collect()
}
