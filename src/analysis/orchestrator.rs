//! Fallback orchestration.
//!
//! [`Orchestrator`] walks an ordered list of [`LocationSource`]s and returns
//! the first usable result. Each attempt runs under its own timeout; a
//! timeout, transport error or malformed payload is logged and the next
//! source is tried. Only exhaustion of the whole chain is reported to the
//! caller, as [`AnalysisUnavailable`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::normalize::normalize_result;
use super::source::LocationSource;
use super::types::{AnalysisResult, MemoryInput, SourceMethod};
use crate::error::{AnalysisUnavailable, AttemptFailure, SourceError};

/// Default per-attempt budget.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Orchestrator {
    sources: Vec<Arc<dyn LocationSource>>,
    attempt_timeout: Duration,
}

impl Orchestrator {
    pub fn new(sources: Vec<Arc<dyn LocationSource>>, attempt_timeout: Duration) -> Self {
        Self {
            sources,
            attempt_timeout,
        }
    }

    /// Source tags in attempt order.
    pub fn methods(&self) -> Vec<SourceMethod> {
        self.sources.iter().map(|s| s.method()).collect()
    }

    /// Sanitize raw text and analyze it.
    pub async fn analyze_text(
        &self,
        text: &str,
        emotion: &str,
    ) -> Result<AnalysisResult, AnalysisUnavailable> {
        self.analyze(&MemoryInput::sanitize(text, emotion)).await
    }

    /// Try each source in order; the first success is deduplicated,
    /// normalized and returned.
    pub async fn analyze(&self, input: &MemoryInput) -> Result<AnalysisResult, AnalysisUnavailable> {
        let mut failures = Vec::new();

        for source in &self.sources {
            let method = source.method();
            let started = Instant::now();

            let outcome = match tokio::time::timeout(self.attempt_timeout, source.analyze(input)).await
            {
                Ok(result) => result,
                Err(_) => Err(SourceError::Timeout(self.attempt_timeout)),
            };

            match outcome {
                Ok(mut result) => {
                    result.source_method = method;
                    result.dedup_secondary();
                    normalize_result(&mut result);
                    tracing::info!(
                        source = %method,
                        primary = %result.primary.name,
                        secondary = result.secondary.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "analysis attempt succeeded"
                    );
                    return Ok(result);
                }
                Err(error) => {
                    tracing::warn!(
                        source = %method,
                        error = %error,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "analysis attempt failed, trying next source"
                    );
                    failures.push(AttemptFailure { method, error });
                }
            }
        }

        tracing::error!(attempts = failures.len(), "all analysis sources failed");
        Err(AnalysisUnavailable { failures })
    }
}
