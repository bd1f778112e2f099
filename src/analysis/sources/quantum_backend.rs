//! Client for the dedicated quantum analysis backend.

use async_trait::async_trait;

use super::{post_json, AnalyzeRequest};
use crate::analysis::payload::BackendPayload;
use crate::analysis::source::LocationSource;
use crate::analysis::types::{AnalysisResult, MemoryInput, SourceMethod};
use crate::error::SourceError;

pub const ANALYZE_PATH: &str = "/api/quantum/analyze";

pub struct QuantumBackendSource {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl QuantumBackendSource {
    /// `base_url` of `None` leaves the source permanently unconfigured.
    pub fn new(client: reqwest::Client, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        Self { client, base_url }
    }
}

#[async_trait]
impl LocationSource for QuantumBackendSource {
    fn method(&self) -> SourceMethod {
        SourceMethod::QuantumBackend
    }

    async fn analyze(&self, input: &MemoryInput) -> Result<AnalysisResult, SourceError> {
        let base = self
            .base_url
            .as_deref()
            .ok_or(SourceError::NotConfigured("quantum backend url"))?;
        let url = format!("{base}{ANALYZE_PATH}");

        let body = post_json(&self.client, &url, &AnalyzeRequest::from(input)).await?;
        let payload: BackendPayload = serde_json::from_str(&body)?;
        payload.into_result(self.method())
    }
}
