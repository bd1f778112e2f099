//! OpenStreetMap Nominatim geocoder.
//!
//! Tries a short list of query variants per place, caches hits and misses for
//! a TTL, and spaces requests by a minimum interval to respect the public
//! instance's usage policy.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{GeoPoint, Geocoder};
use crate::error::EnrichmentError;

pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
    request_timeout: Duration,
    cache_ttl: Duration,
    min_interval: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
    last_request: Mutex<Option<Instant>>,
}

struct CacheEntry {
    stored_at: Instant,
    point: Option<GeoPoint>,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    country: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
        request_timeout: Duration,
        cache_ttl: Duration,
        min_interval: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            request_timeout,
            cache_ttl,
            min_interval,
            cache: Mutex::new(HashMap::new()),
            last_request: Mutex::new(None),
        }
    }

    async fn cached(&self, key: &str) -> Option<Option<GeoPoint>> {
        let cache = self.cache.lock().await;
        cache
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.cache_ttl)
            .map(|entry| entry.point.clone())
    }

    async fn store(&self, key: String, point: Option<GeoPoint>) {
        let mut cache = self.cache.lock().await;
        cache.retain(|_, entry| entry.stored_at.elapsed() < self.cache_ttl);
        cache.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                point,
            },
        );
    }

    /// Wait until `min_interval` has passed since the previous request.
    async fn throttle(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn search(&self, query: &str) -> Result<Option<GeoPoint>, EnrichmentError> {
        let url = Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
                ("accept-language", "en"),
            ],
        )
        .map_err(|e| EnrichmentError::Malformed(format!("invalid nominatim url: {e}")))?;

        // The timeout starts once this request has its slot.
        self.throttle().await;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EnrichmentError::Status(response.status().as_u16()));
        }

        let places: Vec<Place> = response.json().await?;
        places.into_iter().next().map(to_point).transpose()
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, name: &str, region: &str) -> Result<Option<GeoPoint>, EnrichmentError> {
        let key = format!("{}|{}", name.trim().to_lowercase(), region.trim().to_lowercase());
        if let Some(hit) = self.cached(&key).await {
            tracing::debug!(place = %name, "geocoding cache hit");
            return Ok(hit);
        }

        let mut last_error = None;
        for query in build_queries(name, region) {
            match self.search(&query).await {
                Ok(Some(point)) => {
                    tracing::info!(place = %name, query = %query, country = ?point.country, "geocoded");
                    self.store(key, Some(point.clone())).await;
                    return Ok(Some(point));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(query = %query, error = %e, "geocoding query failed");
                    last_error = Some(e);
                }
            }
        }

        // Only cache a miss when every query got a definitive answer.
        match last_error {
            Some(e) => Err(e),
            None => {
                self.store(key, None).await;
                Ok(None)
            }
        }
    }
}

fn to_point(place: Place) -> Result<GeoPoint, EnrichmentError> {
    let lat = place
        .lat
        .parse::<f64>()
        .map_err(|e| EnrichmentError::Malformed(format!("bad latitude {:?}: {e}", place.lat)))?;
    let lng = place
        .lon
        .parse::<f64>()
        .map_err(|e| EnrichmentError::Malformed(format!("bad longitude {:?}: {e}", place.lon)))?;

    Ok(GeoPoint {
        lat,
        lng,
        display_address: place.display_name,
        country: place
            .address
            .and_then(|a| a.country)
            .map(|c| normalize_country(&c)),
    })
}

/// Query variants for one place, most specific first.
pub fn build_queries(name: &str, region: &str) -> Vec<String> {
    let name = name.trim();
    let region = region.trim();
    let mut queries = Vec::with_capacity(3);

    if !region.is_empty() && !name.to_lowercase().contains(&region.to_lowercase()) {
        queries.push(format!("{name}, {region}"));
    }
    queries.push(name.to_string());
    queries.push(format!("{name} landmark"));
    queries
}

/// Map the many spellings of a country onto one lower-case name.
pub fn normalize_country(raw: &str) -> String {
    const MAPPINGS: &[(&str, &str)] = &[
        ("french republic", "france"),
        ("france", "france"),
        ("日本", "japan"),
        ("japan", "japan"),
        ("italia", "italy"),
        ("italy", "italy"),
        ("united kingdom", "uk"),
        ("england", "uk"),
        ("britain", "uk"),
        ("united states", "usa"),
        ("america", "usa"),
    ];

    let lower = raw.trim().to_lowercase();
    MAPPINGS
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, normalized)| normalized.to_string())
        .unwrap_or(lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_use_region_hint() {
        assert_eq!(
            build_queries("Montmartre", "Paris, France"),
            vec!["Montmartre, Paris, France", "Montmartre", "Montmartre landmark"]
        );
        assert_eq!(build_queries("Kyoto", ""), vec!["Kyoto", "Kyoto landmark"]);
        // Region already part of the name.
        assert_eq!(build_queries("Nara Park", "nara"), vec!["Nara Park", "Nara Park landmark"]);
    }

    #[test]
    fn countries_are_normalized() {
        assert_eq!(normalize_country("United States of America"), "usa");
        assert_eq!(normalize_country("French Republic"), "france");
        assert_eq!(normalize_country("日本"), "japan");
        assert_eq!(normalize_country("Switzerland"), "switzerland");
    }

    #[test]
    fn place_strings_are_parsed() {
        let place = Place {
            lat: "35.0116".into(),
            lon: "135.7681".into(),
            display_name: "Kyoto, Japan".into(),
            address: Some(Address {
                country: Some("Japan".into()),
            }),
        };
        let point = to_point(place).unwrap();
        assert_eq!(point.lat, 35.0116);
        assert_eq!(point.country.as_deref(), Some("japan"));

        let bad = Place {
            lat: "north".into(),
            lon: "0".into(),
            display_name: String::new(),
            address: None,
        };
        assert!(matches!(to_point(bad), Err(EnrichmentError::Malformed(_))));
    }
}
