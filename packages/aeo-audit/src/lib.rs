//! Citation Audit Pipeline for Answer Engine Optimization
//!
//! Audits published web content against an AI answer engine: derives
//! probe queries from a source page, asks the engine under retry and
//! rate-limit discipline, extracts citations from heterogeneous
//! responses, matches them back to the page (exact URL, canonical URL,
//! fuzzy text), and emits a per-page verdict. Content owners use the
//! verdicts to find pages answer engines fail to surface or cite.
//!
//! # Design
//!
//! - The engine's output is an opaque oracle: queried, parsed
//!   tolerantly, never re-ranked or second-guessed
//! - Failures are data: one page's outages become failure markers,
//!   never batch aborts
//! - The shared token bucket is the only cross-page mutable state;
//!   everything else stays local to a page's task
//! - Derivation and matching are deterministic, so reruns reproduce
//!   verdicts exactly
//!
//! # Usage
//!
//! ```rust,ignore
//! use aeo_audit::{AuditConfig, Auditor, EngineCredentials, SonarEngine};
//!
//! let engine = SonarEngine::new(EngineCredentials::new(api_key, "sonar"));
//! let auditor = Auditor::new(engine, normalizer, AuditConfig::default())?;
//!
//! let outcomes = auditor.audit(vec!["https://example.com/post".into()]).await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (AnswerEngine, ContentNormalizer)
//! - [`types`] - Pipeline data model
//! - [`engine`] - Rate-limited, retrying engine client
//! - [`pipeline`] - Derivation, extraction, matching, aggregation, batching
//! - [`testing`] - Mock implementations for testing

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{AuditError, EngineError, NormalizeError, Result};
pub use traits::{AnswerEngine, ContentNormalizer};
pub use types::{
    AuditConfig, AuditOutcome, AuditVerdict, CitationRecord, DerivationStrategy,
    DirectAnswerReport, FailureKind, FailureMarker, MatchResult, MatchTier, ProbeQuery,
    RawEngineResponse, ResponseErrorKind, ResponseStatus, SourceDocument,
};

// Re-export the pipeline entry point and stages
pub use pipeline::{
    aggregate_verdict, assess_direct_answer, derive_queries, extract_citations, match_citation,
    match_citations, Auditor, CitationStats, ExtractedCitations, PageInput, QueryAudit,
};

// Re-export the engine client layer
pub use engine::{EngineClient, RetryPolicy};

#[cfg(feature = "perplexity")]
pub use engine::{EngineCredentials, SonarEngine};
