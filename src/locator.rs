//! The full recall pipeline: fallback analysis, then enrichment.
//!
//! [`Locator::from_config`] is the one place where upstream clients are
//! constructed. Everything below it receives its collaborators explicitly, so
//! tests can assemble a [`Locator`] from mock sources and geocoders.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::analysis::sources::{BackendRouteSource, GeminiSource, KeywordSource, QuantumBackendSource};
use crate::analysis::types::{AnalysisResult, MemoryInput};
use crate::analysis::{LocationSource, Orchestrator};
use crate::config::{AnalysisConfig, EnrichmentConfig, QMemoryConfig};
use crate::enrichment::{
    Enricher, Geocoder, ImageSource, NominatimGeocoder, UnsplashImages, WikipediaImages,
};
use crate::error::AnalysisUnavailable;

pub struct Locator {
    orchestrator: Orchestrator,
    enricher: Enricher,
}

impl Locator {
    pub fn new(orchestrator: Orchestrator, enricher: Enricher) -> Self {
        Self {
            orchestrator,
            enricher,
        }
    }

    /// Build the production pipeline with one shared HTTP client.
    pub fn from_config(config: &QMemoryConfig) -> Result<Self> {
        let client = build_http_client(&config.enrichment)?;

        let orchestrator = Orchestrator::new(
            default_sources(client.clone(), &config.analysis),
            config.analysis.attempt_timeout(),
        );
        let enricher = build_enricher(client, &config.enrichment);

        tracing::info!(
            sources = ?orchestrator.methods(),
            enrichment = config.enrichment.enabled,
            "locator ready"
        );
        Ok(Self::new(orchestrator, enricher))
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    /// Analyze `input` and enrich the winning result. Enrichment cannot fail.
    pub async fn locate(&self, input: &MemoryInput) -> Result<AnalysisResult, AnalysisUnavailable> {
        let result = self.orchestrator.analyze(input).await?;
        Ok(self.enricher.enrich_result(result).await)
    }
}

pub fn build_http_client(config: &EnrichmentConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(5))
        .build()
        .context("failed to build HTTP client")
}

/// The fallback chain in priority order: quantum backend, direct Gemini,
/// secondary backend route, keyword matcher.
pub fn default_sources(
    client: reqwest::Client,
    config: &AnalysisConfig,
) -> Vec<Arc<dyn LocationSource>> {
    vec![
        Arc::new(QuantumBackendSource::new(
            client.clone(),
            config.quantum_backend_url.clone(),
        )),
        Arc::new(GeminiSource::new(
            client.clone(),
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
        )),
        Arc::new(BackendRouteSource::new(
            client,
            config.secondary_backend_url.clone(),
        )),
        Arc::new(KeywordSource),
    ]
}

pub fn build_enricher(client: reqwest::Client, config: &EnrichmentConfig) -> Enricher {
    if !config.enabled {
        return Enricher::offline();
    }

    let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimGeocoder::new(
        client.clone(),
        config.nominatim_url.clone(),
        config.user_agent.clone(),
        config.timeout(),
        config.cache_ttl(),
        config.min_request_interval(),
    ));

    let mut images: Vec<Arc<dyn ImageSource>> = Vec::new();
    if let Some(key) = config
        .unsplash_access_key
        .clone()
        .filter(|k| !k.trim().is_empty())
    {
        images.push(Arc::new(UnsplashImages::new(
            client.clone(),
            config.unsplash_url.clone(),
            key,
        )));
    }
    images.push(Arc::new(WikipediaImages::new(
        client,
        config.wikipedia_url.clone(),
    )));

    Enricher::new(Some(geocoder), images, config.timeout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::SourceMethod;

    #[test]
    fn chain_order_is_fixed() {
        let config = QMemoryConfig::default();
        let sources = default_sources(reqwest::Client::new(), &config.analysis);
        let methods: Vec<_> = sources.iter().map(|s| s.method()).collect();
        assert_eq!(
            methods,
            vec![
                SourceMethod::QuantumBackend,
                SourceMethod::GeminiDirect,
                SourceMethod::GeminiLocal,
                SourceMethod::KeywordFallback,
            ]
        );
    }

    #[tokio::test]
    async fn unconfigured_pipeline_falls_back_to_keywords() {
        let mut config = QMemoryConfig::default();
        config.enrichment.enabled = false;
        let locator = Locator::from_config(&config).unwrap();

        let input = MemoryInput::submit("snow on the mountain", "peaceful").unwrap();
        let result = locator.locate(&input).await.unwrap();
        assert_eq!(result.source_method, SourceMethod::KeywordFallback);
        assert_eq!(result.primary.name, "Hakuba Valley");
        assert!(result.candidates().all(|c| c.image_url.is_some()));
    }
}
