//! REST surface of the path store.
//!
//! - GET  /api/paths?width=&height=   cached set for a viewport (empty on miss)
//! - POST /api/paths                  replace the set for a viewport
//! - POST /api/paths/clear            drop one viewport, or all without a body
//! - GET  /api/debug/cache-stats      hit/miss counters
//! - POST /api/debug/cache-clear      reset the counters
//! - GET  /health                     liveness probe

use crate::metrics::Metrics;
use crate::state::PathStore;
use api::v1::*;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, rejection::QueryRejection, DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

pub struct AppState {
    pub store: PathStore,
    pub metrics: Arc<Metrics>,
    started: Instant,
}

impl AppState {
    pub fn new(store: PathStore, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics, started: Instant::now() }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("too many paths: {got} exceeds the limit of {limit}")]
    TooManyPaths { got: usize, limit: usize },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyPaths { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

pub fn router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route(PATHS_ROUTE, get(get_paths).post(store_paths))
        .route(CLEAR_PATHS_ROUTE, post(clear_paths))
        .route(CACHE_STATS_ROUTE, get(cache_stats))
        .route(CACHE_CLEAR_ROUTE, post(cache_clear))
        .route(HEALTH_ROUTE, get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn get_paths(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PathsQuery>, QueryRejection>,
) -> Result<Json<PathsResponse>, ApiError> {
    state.metrics.record_request("get");
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let viewport = dotgrid::Viewport::from(query);

    match state.store.get(viewport) {
        Some(paths) => {
            state.metrics.cache_hits_total.inc();
            tracing::debug!(%viewport, paths = paths.len(), "Cache hit");
            Ok(Json(PathsResponse { paths: paths.as_ref().clone() }))
        }
        None => {
            state.metrics.cache_misses_total.inc();
            tracing::debug!(%viewport, "Cache miss");
            Ok(Json(PathsResponse::default()))
        }
    }
}

async fn store_paths(
    State(state): State<Arc<AppState>>,
    body: Result<Json<StorePathsRequest>, JsonRejection>,
) -> Result<Json<StorePathsResponse>, ApiError> {
    state.metrics.record_request("store");
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let limit = state.store.max_paths_per_viewport();
    if req.paths.len() > limit {
        return Err(ApiError::TooManyPaths { got: req.paths.len(), limit });
    }

    let viewport = req.viewport;
    let stored = state.store.insert(viewport, req.paths);
    state.metrics.paths_stored_total.inc_by(stored as u64);
    state.metrics.update_viewports(state.store.len());
    tracing::info!(%viewport, stored, "Stored path set");

    Ok(Json(StorePathsResponse { stored }))
}

async fn clear_paths(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ClearPathsResponse>, ApiError> {
    state.metrics.record_request("clear");
    let req: ClearPathsRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ClearPathsRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
    };

    let cleared = state.store.clear(req.viewport);
    state.metrics.cache_clears_total.inc();
    state.metrics.update_viewports(state.store.len());
    tracing::info!(viewport = ?req.viewport, cleared, "Cleared cached paths");

    Ok(Json(ClearPathsResponse { cleared }))
}

async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.store.stats())
}

async fn cache_clear(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    state.metrics.cache_clears_total.inc();
    let before = state.store.reset_stats();
    tracing::info!(hits = before.hits, misses = before.misses, "Reset cache counters");
    Json(before)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.started.elapsed().as_secs(),
    })
}
