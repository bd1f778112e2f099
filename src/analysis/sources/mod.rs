//! Concrete [`LocationSource`](super::source::LocationSource) implementations,
//! in fallback order.

pub mod backend_route;
pub mod gemini;
pub mod keyword;
pub mod quantum_backend;

pub use backend_route::BackendRouteSource;
pub use gemini::GeminiSource;
pub use keyword::KeywordSource;
pub use quantum_backend::QuantumBackendSource;

use serde::Serialize;

use super::types::MemoryInput;
use crate::error::SourceError;

/// Request body shared by the backend services.
#[derive(Debug, Serialize)]
pub(crate) struct AnalyzeRequest<'a> {
    pub memory: &'a str,
    pub emotion: &'a str,
}

impl<'a> From<&'a MemoryInput> for AnalyzeRequest<'a> {
    fn from(input: &'a MemoryInput) -> Self {
        Self {
            memory: input.text(),
            emotion: input.emotion().as_str(),
        }
    }
}

/// POST `body` as JSON and return the response text, failing on non-2xx.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    body: &T,
) -> Result<String, SourceError> {
    let response = client.post(url).json(body).send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let preview: String = text.chars().take(200).collect();
        return Err(SourceError::Unavailable(format!("HTTP {status}: {preview}")));
    }
    Ok(text)
}
