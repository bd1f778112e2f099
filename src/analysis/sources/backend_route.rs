//! Client for the secondary backend AI route.
//!
//! The route runs the generative model server-side and answers with the flat
//! model shape (`location`, `story`, `region`, `secondaryLocations`).

use async_trait::async_trait;

use super::{post_json, AnalyzeRequest};
use crate::analysis::payload::ModelPayload;
use crate::analysis::source::LocationSource;
use crate::analysis::types::{AnalysisResult, MemoryInput, SourceMethod};
use crate::error::SourceError;

pub struct BackendRouteSource {
    client: reqwest::Client,
    url: Option<String>,
}

impl BackendRouteSource {
    pub fn new(client: reqwest::Client, url: Option<String>) -> Self {
        let url = url.filter(|u| !u.trim().is_empty());
        Self { client, url }
    }
}

#[async_trait]
impl LocationSource for BackendRouteSource {
    fn method(&self) -> SourceMethod {
        SourceMethod::GeminiLocal
    }

    async fn analyze(&self, input: &MemoryInput) -> Result<AnalysisResult, SourceError> {
        let url = self
            .url
            .as_deref()
            .ok_or(SourceError::NotConfigured("secondary backend url"))?;

        let body = post_json(&self.client, url, &AnalyzeRequest::from(input)).await?;
        // The route may hand back raw model text rather than clean JSON.
        ModelPayload::from_text(&body)?.into_result(self.method())
    }
}
