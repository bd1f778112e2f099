//! Memory analysis: from a memory fragment to ranked candidate places.
//!
//! - [`types`]: inputs, candidates and the [`AnalysisResult`](types::AnalysisResult) output shape
//! - [`keyword`]: deterministic offline matcher
//! - [`normalize`]: rescaling of raw scores to percentages
//! - [`payload`]: parsing of upstream responses
//! - [`source`] / [`sources`]: the fallback sources
//! - [`orchestrator`]: the fallback chain itself

pub mod keyword;
pub mod normalize;
pub mod orchestrator;
pub mod payload;
pub mod source;
pub mod sources;
pub mod types;

pub use orchestrator::Orchestrator;
pub use source::LocationSource;
pub use types::{AnalysisResult, Candidate, Coordinates, Emotion, EmotionTag, MemoryInput, SourceMethod};
