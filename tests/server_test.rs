mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{result_with, spawn_server, Behavior, MockGeocoder, MockSource};
use qmemory::analysis::sources::KeywordSource;
use qmemory::analysis::types::SourceMethod;
use qmemory::analysis::{LocationSource, Orchestrator};
use qmemory::enrichment::{Enricher, Geocoder};
use qmemory::locator::Locator;
use qmemory::server::router;
use serde_json::{json, Value};

async fn serve(sources: Vec<Arc<dyn LocationSource>>, enricher: Enricher) -> String {
    let locator = Locator::new(Orchestrator::new(sources, Duration::from_secs(1)), enricher);
    spawn_server(router(Arc::new(locator), &[])).await
}

async fn serve_keywords() -> String {
    serve(vec![Arc::new(KeywordSource)], Enricher::offline()).await
}

#[tokio::test]
async fn health_and_root_report_status() {
    let url = serve_keywords().await;
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("{url}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");
    assert!(health["timestamp"].is_string());

    let root: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(root["service"], "qmemory");
    assert_eq!(root["sources"], json!(["keyword_fallback"]));
}

#[tokio::test]
async fn analyze_returns_enriched_result_envelope() {
    let url = serve_keywords().await;

    let response = reqwest::Client::new()
        .post(format!("{url}/api/analyze"))
        .json(&json!({ "memory": "snow on the mountain pass", "emotion": "peaceful" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert!(body["id"].is_string());
    assert!(body["analyzed_at"].is_string());
    assert!(body["analysis_time_ms"].is_u64());
    assert_eq!(body["result"]["sourceMethod"], "keyword_fallback");
    assert_eq!(body["result"]["primary"]["name"], "Hakuba Valley");
    assert!(body["result"]["primary"]["imageUrl"].is_string());

    let coherence = body["display"]["coherence"].as_u64().unwrap();
    assert!((70..=95).contains(&coherence));
}

#[tokio::test]
async fn invalid_input_is_rejected_with_400() {
    let url = serve_keywords().await;
    let client = reqwest::Client::new();

    let too_long = "あ".repeat(501);
    let response = client
        .post(format!("{url}/api/analyze"))
        .json(&json!({ "memory": too_long, "emotion": "warm" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("501"));

    let response = client
        .post(format!("{url}/api/analyze"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exhausted_chain_returns_503_with_retry_hint() {
    let sources: Vec<Arc<dyn LocationSource>> = vec![
        MockSource::new(SourceMethod::QuantumBackend, Behavior::Fail),
        MockSource::new(SourceMethod::GeminiDirect, Behavior::Fail),
    ];
    let url = serve(sources, Enricher::offline()).await;

    let response = reqwest::Client::new()
        .post(format!("{url}/api/analyze"))
        .json(&json!({ "memory": "somewhere warm", "emotion": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.headers().contains_key("retry-after"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["attempts"].as_array().unwrap().len(), 2);
    assert!(body["retry_after_secs"].is_u64());
}

#[tokio::test]
async fn coordinates_endpoint_geocodes_or_404s() {
    let source: Arc<dyn LocationSource> = MockSource::new(
        SourceMethod::GeminiDirect,
        Behavior::Succeed(result_with(("Kyoto", 100.0), &[])),
    );
    let geocoder: Arc<dyn Geocoder> = MockGeocoder::new(&["Atlantis"]);
    let enricher = Enricher::new(Some(geocoder), Vec::new(), Duration::from_secs(1));
    let url = serve(vec![source], enricher).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{url}/api/locations/coordinates/Kyoto?region=Japan"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Kyoto");
    assert_eq!(body["coordinates"]["lng"], 20.0);
    assert_eq!(body["country"], "japan");

    let response = client
        .get(format!("{url}/api/locations/coordinates/Atlantis"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn display_state_is_in_range() {
    let url = serve_keywords().await;

    let body: Value = reqwest::get(format!("{url}/api/quantum/state"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let superposition = body["superposition"].as_u64().unwrap();
    assert!((3..=8).contains(&superposition));
}
