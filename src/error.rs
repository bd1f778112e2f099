//! Error taxonomy for the analysis pipeline.
//!
//! Only [`AnalysisUnavailable`] ever reaches a caller of the pipeline.
//! [`SourceError`] is swallowed per fallback attempt and [`EnrichmentError`]
//! is swallowed per candidate; both are logged where they are dropped.

use std::time::Duration;

use thiserror::Error;

use crate::analysis::types::SourceMethod;

/// Failure of a single fallback attempt.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network failure or non-2xx status from an upstream service.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The attempt did not finish within its time budget.
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    /// JSON parse failure or a missing required field.
    #[error("malformed upstream response: {0}")]
    Malformed(String),

    /// The source has no endpoint or credentials configured.
    #[error("source not configured: {0}")]
    NotConfigured(&'static str),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Malformed(e.to_string())
        } else {
            Self::Unavailable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

/// One failed attempt, recorded by the orchestrator.
#[derive(Debug)]
pub struct AttemptFailure {
    pub method: SourceMethod,
    pub error: SourceError,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.method, self.error)
    }
}

/// Every source in the fallback chain failed.
#[derive(Debug, Error)]
#[error("analysis unavailable: all {} source(s) failed", .failures.len())]
pub struct AnalysisUnavailable {
    pub failures: Vec<AttemptFailure>,
}

/// Failure to geocode or find an image for one candidate. Never surfaced.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("enrichment request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("enrichment service returned HTTP {0}")]
    Status(u16),

    #[error("unexpected enrichment response: {0}")]
    Malformed(String),
}

/// Rejected user submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("memory text is {len} characters, the limit is {max}")]
    TooLong { len: usize, max: usize },
}
