//! Core trait abstractions.
//!
//! Two seams connect the pipeline to the outside world: the answer engine
//! (network boundary, mocked in tests) and the content normalizer
//! (consumed capability, never implemented here).

pub mod engine;
pub mod normalizer;

pub use engine::AnswerEngine;
pub use normalizer::ContentNormalizer;
