use async_trait::async_trait;

use crate::analysis::keyword;
use crate::analysis::source::LocationSource;
use crate::analysis::types::{AnalysisResult, MemoryInput, SourceMethod};
use crate::error::SourceError;

/// Last resort of the chain: the offline keyword matcher. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordSource;

#[async_trait]
impl LocationSource for KeywordSource {
    fn method(&self) -> SourceMethod {
        SourceMethod::KeywordFallback
    }

    async fn analyze(&self, input: &MemoryInput) -> Result<AnalysisResult, SourceError> {
        Ok(keyword::resolve(input))
    }
}
