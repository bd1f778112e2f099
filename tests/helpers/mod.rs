#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qmemory::analysis::types::{AnalysisResult, Candidate, MemoryInput, SourceMethod};
use qmemory::analysis::LocationSource;
use qmemory::enrichment::{GeoPoint, Geocoder};
use qmemory::error::{EnrichmentError, SourceError};

/// What a [`MockSource`] does when called.
pub enum Behavior {
    Succeed(AnalysisResult),
    Fail,
    Hang(Duration),
}

/// A scripted [`LocationSource`] that counts its calls.
pub struct MockSource {
    method: SourceMethod,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new(method: SourceMethod, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            method,
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationSource for MockSource {
    fn method(&self) -> SourceMethod {
        self.method
    }

    async fn analyze(&self, _input: &MemoryInput) -> Result<AnalysisResult, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed(result) => Ok(result.clone()),
            Behavior::Fail => Err(SourceError::Unavailable("HTTP 500: mock failure".into())),
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Err(SourceError::Unavailable("mock source woke up too late".into()))
            }
        }
    }
}

/// A result with the given primary and secondaries, all with raw scores.
pub fn result_with(primary: (&str, f64), secondary: &[(&str, f64)]) -> AnalysisResult {
    AnalysisResult {
        primary: Candidate::new(primary.0, primary.1, "a story", ""),
        secondary: secondary
            .iter()
            .map(|(name, p)| Candidate::new(*name, *p, "", ""))
            .collect(),
        source_method: SourceMethod::GeminiDirect,
    }
}

/// Geocoder that resolves every name except those listed in `failing`,
/// which return an error.
pub struct MockGeocoder {
    failing: Vec<String>,
    calls: AtomicUsize,
}

impl MockGeocoder {
    pub fn new(failing: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: failing.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, name: &str, _region: &str) -> Result<Option<GeoPoint>, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|f| f == name) {
            return Err(EnrichmentError::Status(503));
        }
        Ok(Some(GeoPoint {
            lat: 10.0 + name.len() as f64,
            lng: 20.0,
            display_address: format!("{name}, Somewhere"),
            country: Some("japan".into()),
        }))
    }
}

/// Serve `router` on an ephemeral local port. Returns the base URL.
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
