//! Server entry points: the HTTP API ([`serve_http`]) and MCP over stdio
//! ([`serve_stdio`]). Both share one [`Locator`] built from config.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rmcp::ServiceExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::analysis::types::{AnalysisResult, MemoryInput};
use crate::config::QMemoryConfig;
use crate::display::DisplayState;
use crate::error::{AnalysisUnavailable, InputError};
use crate::locator::Locator;
use crate::tools::QMemoryTools;

/// Seconds a client should wait before retrying after a 503.
const RETRY_AFTER_SECS: u64 = 30;

#[derive(Clone)]
struct AppState {
    locator: Arc<Locator>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub memory: String,
    #[serde(default)]
    pub emotion: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub id: Uuid,
    pub result: AnalysisResult,
    /// Decorative only, see [`DisplayState`].
    pub display: DisplayState,
    pub analysis_time_ms: u64,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RegionQuery {
    region: Option<String>,
}

enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unavailable(AnalysisUnavailable),
}

impl From<InputError> for ApiError {
    fn from(e: InputError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<AnalysisUnavailable> for ApiError {
    fn from(e: AnalysisUnavailable) -> Self {
        Self::Unavailable(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            Self::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            Self::Unavailable(e) => {
                let attempts: Vec<String> = e.failures.iter().map(|f| f.to_string()).collect();
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    [(header::RETRY_AFTER, RETRY_AFTER_SECS.to_string())],
                    Json(json!({
                        "error": e.to_string(),
                        "attempts": attempts,
                        "retry_after_secs": RETRY_AFTER_SECS,
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// Build the HTTP API router around a shared locator.
pub fn router(locator: Arc<Locator>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/locations/coordinates/{name}", get(coordinates))
        .route("/api/quantum/state", get(display_state))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { locator })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sources: Vec<&str> = state
        .locator
        .orchestrator()
        .methods()
        .iter()
        .map(|m| m.as_str())
        .collect();
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "sources": sources,
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "timestamp": Utc::now() }))
}

async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = body?;
    let input = MemoryInput::submit(&request.memory, &request.emotion)?;

    tracing::info!(
        memory_len = input.text().chars().count(),
        emotion = %input.emotion(),
        "analyze called"
    );

    let started = Instant::now();
    let result = state.locator.locate(&input).await?;

    Ok(Json(AnalyzeResponse {
        id: Uuid::now_v7(),
        result,
        display: DisplayState::random(),
        analysis_time_ms: started.elapsed().as_millis() as u64,
        analyzed_at: Utc::now(),
    }))
}

async fn coordinates(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<RegionQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let region = query.region.unwrap_or_default();
    match state.locator.enricher().locate(&name, &region).await {
        Some(point) => Ok(Json(json!({
            "name": name,
            "coordinates": point.coordinates(),
            "address": point.display_address,
            "country": point.country,
        }))),
        None => Err(ApiError::NotFound(format!("no coordinates found for {name:?}"))),
    }
}

async fn display_state() -> Json<DisplayState> {
    Json(DisplayState::random())
}

/// Serve the HTTP API until ctrl-c.
pub async fn serve_http(config: QMemoryConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let locator = Arc::new(Locator::from_config(&config)?);
    let app = router(locator, &config.server.cors_origins);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "HTTP API listening at http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP API shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down HTTP server");
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: QMemoryConfig) -> Result<()> {
    tracing::info!("starting qmemory MCP server on stdio");

    let locator = Arc::new(Locator::from_config(&config)?);
    let tools = QMemoryTools::new(locator);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}
