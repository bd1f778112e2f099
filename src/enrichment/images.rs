//! Image sources, tried in priority order, plus the deterministic placeholder.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;

use super::ImageSource;
use crate::error::EnrichmentError;

/// Stable 32-bit string hash (`h = h * 31 + c`, wrapping, over UTF-16 units).
pub fn name_hash(name: &str) -> u32 {
    name.encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as u32))
}

/// Placeholder image seeded by the name, so a place always gets the same picture.
pub fn placeholder_image_url(name: &str) -> String {
    let id = name_hash(name) % 1000;
    format!("https://picsum.photos/seed/{id}/800/600")
}

/// Unsplash photo search. Only used when an access key is configured.
pub struct UnsplashImages {
    client: reqwest::Client,
    base_url: String,
    access_key: String,
}

impl UnsplashImages {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, access_key: String) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_key,
        }
    }
}

#[async_trait]
impl ImageSource for UnsplashImages {
    fn name(&self) -> &'static str {
        "unsplash"
    }

    async fn find_image(&self, query: &str) -> Result<Option<String>, EnrichmentError> {
        let url = Url::parse_with_params(
            &format!("{}/search/photos", self.base_url),
            &[
                ("query", query),
                ("per_page", "1"),
                ("orientation", "landscape"),
                ("client_id", self.access_key.as_str()),
            ],
        )
        .map_err(|e| EnrichmentError::Malformed(format!("invalid unsplash url: {e}")))?;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(EnrichmentError::Status(response.status().as_u16()));
        }
        let body: Value = response.json().await?;

        Ok(body["results"][0]["urls"]["regular"]
            .as_str()
            .map(str::to_string))
    }
}

/// Lead image of the Wikipedia article with the place's name.
pub struct WikipediaImages {
    client: reqwest::Client,
    base_url: String,
}

impl WikipediaImages {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn summary_url(&self, title: &str) -> Result<Url, EnrichmentError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| EnrichmentError::Malformed(format!("invalid wikipedia url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| EnrichmentError::Malformed("wikipedia url cannot be a base".into()))?
            .pop_if_empty()
            .push("page")
            .push("summary")
            .push(&title.replace(' ', "_"));
        Ok(url)
    }
}

#[async_trait]
impl ImageSource for WikipediaImages {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    async fn find_image(&self, query: &str) -> Result<Option<String>, EnrichmentError> {
        let url = self.summary_url(query)?;
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(EnrichmentError::Status(response.status().as_u16()));
        }
        let body: Value = response.json().await?;

        let image = body["originalimage"]["source"]
            .as_str()
            .or_else(|| body["thumbnail"]["source"].as_str())
            .map(str::to_string);
        Ok(image)
    }
}
