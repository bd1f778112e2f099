mod helpers;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use helpers::spawn_server;
use qmemory::enrichment::{Geocoder, NominatimGeocoder};
use serde_json::json;

#[derive(Default)]
struct Recorder {
    hits: AtomicUsize,
    queries: Mutex<Vec<String>>,
    user_agents: Mutex<Vec<String>>,
}

/// Fake Nominatim: knows "Montmartre" and "Kyoto", fails on "Broken".
async fn search(
    State(recorder): State<Arc<Recorder>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> axum::response::Response {
    recorder.hits.fetch_add(1, Ordering::SeqCst);
    let q = params.get("q").cloned().unwrap_or_default();
    recorder.queries.lock().unwrap().push(q.clone());
    if let Some(ua) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        recorder.user_agents.lock().unwrap().push(ua.to_string());
    }

    match q.as_str() {
        "Montmartre" => Json(json!([{
            "lat": "48.8867",
            "lon": "2.3431",
            "display_name": "Montmartre, Paris, Île-de-France, France",
            "address": { "country": "France" }
        }]))
        .into_response(),
        "Kyoto, Japan" => Json(json!([{
            "lat": "35.0116",
            "lon": "135.7681",
            "display_name": "Kyoto, Japan",
            "address": { "country": "日本" }
        }]))
        .into_response(),
        q if q.starts_with("Broken") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn fake_nominatim() -> (String, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let router = Router::new()
        .route("/search", get(search))
        .with_state(recorder.clone());
    (spawn_server(router).await, recorder)
}

fn geocoder(base_url: &str, min_interval: Duration) -> NominatimGeocoder {
    NominatimGeocoder::new(
        reqwest::Client::new(),
        base_url,
        "qmemory-test/0.1",
        Duration::from_secs(5),
        Duration::from_secs(3600),
        min_interval,
    )
}

#[tokio::test]
async fn falls_back_to_bare_name_when_region_query_misses() {
    let (url, recorder) = fake_nominatim().await;
    let geocoder = geocoder(&url, Duration::ZERO);

    let point = geocoder.geocode("Montmartre", "Paris").await.unwrap().unwrap();

    assert_eq!(point.lat, 48.8867);
    assert_eq!(point.lng, 2.3431);
    assert_eq!(point.country.as_deref(), Some("france"));
    assert_eq!(
        *recorder.queries.lock().unwrap(),
        vec!["Montmartre, Paris".to_string(), "Montmartre".to_string()]
    );
    assert!(recorder
        .user_agents
        .lock()
        .unwrap()
        .iter()
        .all(|ua| ua == "qmemory-test/0.1"));
}

#[tokio::test]
async fn hits_and_misses_are_cached() {
    let (url, recorder) = fake_nominatim().await;
    let geocoder = geocoder(&url, Duration::ZERO);

    let first = geocoder.geocode("Kyoto", "Japan").await.unwrap();
    let second = geocoder.geocode("kyoto ", "japan").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.unwrap().country.as_deref(), Some("japan"));
    assert_eq!(recorder.hits.load(Ordering::SeqCst), 1);

    // A miss runs both query variants once, then comes from cache.
    assert!(geocoder.geocode("Atlantis", "").await.unwrap().is_none());
    let after_miss = recorder.hits.load(Ordering::SeqCst);
    assert_eq!(after_miss, 3);
    assert!(geocoder.geocode("Atlantis", "").await.unwrap().is_none());
    assert_eq!(recorder.hits.load(Ordering::SeqCst), after_miss);
}

#[tokio::test]
async fn server_errors_are_reported_and_not_cached() {
    let (url, recorder) = fake_nominatim().await;
    let geocoder = geocoder(&url, Duration::ZERO);

    assert!(geocoder.geocode("Broken Bridge", "").await.is_err());
    let after_first = recorder.hits.load(Ordering::SeqCst);
    assert!(geocoder.geocode("Broken Bridge", "").await.is_err());
    assert!(recorder.hits.load(Ordering::SeqCst) > after_first);
}

#[tokio::test]
async fn requests_are_spaced_by_min_interval() {
    let (url, recorder) = fake_nominatim().await;
    let geocoder = geocoder(&url, Duration::from_millis(150));

    let started = Instant::now();
    // Misses on all three query variants.
    assert!(geocoder.geocode("Atlantis", "Ocean").await.unwrap().is_none());

    assert_eq!(recorder.hits.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() >= Duration::from_millis(300));
}
