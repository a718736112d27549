//! The citation audit pipeline.
//!
//! Stages in data-flow order:
//!
//! - [`derive`] - deterministic probe-query derivation
//! - [`extract`] - schema-tolerant citation extraction
//! - [`matcher`] - tiered citation-to-document identity matching
//! - [`answerability`] - direct-answer assessment of the source page
//! - [`aggregate`] - per-page verdicts and batch statistics
//! - [`batch`] - concurrency-bounded orchestration with partial failure

pub mod aggregate;
pub mod answerability;
pub mod batch;
pub mod derive;
pub mod extract;
pub mod matcher;

pub use aggregate::{aggregate as aggregate_verdict, CitationStats, QueryAudit};
pub use answerability::assess_direct_answer;
pub use batch::{Auditor, PageInput};
pub use derive::derive_queries;
pub use extract::{extract_citations, ExtractedCitations};
pub use matcher::{match_citation, match_citations};
