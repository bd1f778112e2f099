//! The capability every fallback source implements.

use async_trait::async_trait;

use super::types::{AnalysisResult, MemoryInput, SourceMethod};
use crate::error::SourceError;

/// One entry in the fallback chain.
///
/// Implementations report failure through [`SourceError`] and never retry
/// internally; the orchestrator moves on to the next source instead.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Tag stamped on results from this source.
    fn method(&self) -> SourceMethod;

    /// Propose a primary location and alternates for `input`.
    ///
    /// Returned scores are raw; the orchestrator normalizes them.
    async fn analyze(&self, input: &MemoryInput) -> Result<AnalysisResult, SourceError>;
}
