//! Data model for the citation audit pipeline.
//!
//! Artifacts flow strictly forward: a [`SourceDocument`] produces
//! [`ProbeQuery`]s, each query one [`RawEngineResponse`], each ok response
//! zero or more [`CitationRecord`]s, citations at most one [`MatchResult`]
//! each, and all of a page's matches one [`AuditVerdict`]. Everything is
//! immutable once created and local to its page's task.

pub mod answerability;
pub mod citation;
pub mod config;
pub mod document;
pub mod query;
pub mod response;
pub mod verdict;

pub use answerability::DirectAnswerReport;
pub use citation::CitationRecord;
pub use config::AuditConfig;
pub use document::SourceDocument;
pub use query::{DerivationStrategy, ProbeQuery};
pub use response::{RawEngineResponse, ResponseErrorKind, ResponseStatus};
pub use verdict::{AuditOutcome, AuditVerdict, FailureKind, FailureMarker, MatchResult, MatchTier};
