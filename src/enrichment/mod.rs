//! Best-effort enrichment of candidates with coordinates and imagery.
//!
//! Enrichment never fails a request. A geocoding failure leaves
//! `coordinates` as `None`; an image failure falls through to the next image
//! source and finally to a deterministic placeholder, so every enriched
//! candidate has an image URL.
//!
//! Candidates are enriched concurrently and independently: the fan-out is
//! all-settled, and output order always equals input order.

pub mod images;
pub mod nominatim;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::Serialize;

use crate::analysis::types::{AnalysisResult, Candidate, Coordinates};
use crate::error::EnrichmentError;

pub use images::{placeholder_image_url, UnsplashImages, WikipediaImages};
pub use nominatim::NominatimGeocoder;

/// A geocoding hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub display_address: String,
    /// Normalized lower-case country name, when the service reported one.
    pub country: Option<String>,
}

impl GeoPoint {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Resolves a place name to at most one point.
///
/// Implementations bound the duration of each upstream request themselves.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `region` is a hint (prefecture, country) and may be empty.
    async fn geocode(&self, name: &str, region: &str) -> Result<Option<GeoPoint>, EnrichmentError>;
}

/// Finds a representative image URL for a query.
#[async_trait]
pub trait ImageSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn find_image(&self, query: &str) -> Result<Option<String>, EnrichmentError>;
}

pub struct Enricher {
    geocoder: Option<Arc<dyn Geocoder>>,
    images: Vec<Arc<dyn ImageSource>>,
    call_timeout: Duration,
}

impl Enricher {
    pub fn new(
        geocoder: Option<Arc<dyn Geocoder>>,
        images: Vec<Arc<dyn ImageSource>>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            geocoder,
            images,
            call_timeout,
        }
    }

    /// An enricher with no external services: placeholders only.
    pub fn offline() -> Self {
        Self::new(None, Vec::new(), Duration::from_secs(1))
    }

    /// Enrich the primary and every secondary candidate concurrently.
    pub async fn enrich_result(&self, result: AnalysisResult) -> AnalysisResult {
        let AnalysisResult {
            primary,
            secondary,
            source_method,
        } = result;

        let (primary, secondary) = tokio::join!(
            self.enrich_candidate(primary),
            join_all(secondary.into_iter().map(|c| self.enrich_candidate(c))),
        );

        AnalysisResult {
            primary,
            secondary,
            source_method,
        }
    }

    /// Fill in whatever `candidate` is missing. Never fails.
    pub async fn enrich_candidate(&self, mut candidate: Candidate) -> Candidate {
        if candidate.coordinates.is_none() {
            if let Some(point) = self.locate(&candidate.name, &candidate.region).await {
                candidate.coordinates = Some(point.coordinates());
                candidate.address = Some(point.display_address);
            }
        }

        if candidate.image_url.is_none() {
            candidate.image_url = Some(self.image_for(&candidate.name).await);
        }

        candidate
    }

    /// Geocode one name, logging and swallowing failures.
    ///
    /// No overall deadline is applied here: a throttled geocoder queues
    /// concurrent candidates, so it bounds each of its own requests instead.
    pub async fn locate(&self, name: &str, region: &str) -> Option<GeoPoint> {
        let geocoder = self.geocoder.as_ref()?;

        match geocoder.geocode(name, region).await {
            Ok(Some(point)) => Some(point),
            Ok(None) => {
                tracing::debug!(place = %name, region = %region, "no geocoding match");
                None
            }
            Err(e) => {
                tracing::warn!(place = %name, error = %e, "geocoding failed");
                None
            }
        }
    }

    async fn image_for(&self, name: &str) -> String {
        for source in &self.images {
            match tokio::time::timeout(self.call_timeout, source.find_image(name)).await {
                Ok(Ok(Some(url))) => return url,
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    tracing::warn!(source = source.name(), place = %name, error = %e, "image lookup failed");
                }
                Err(_) => {
                    tracing::warn!(source = source.name(), place = %name, "image lookup timed out");
                }
            }
        }
        placeholder_image_url(name)
    }
}
