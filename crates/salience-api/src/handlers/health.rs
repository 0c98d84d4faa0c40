//! Health check handlers

use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use salience_extractor::CacheStatsReport;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness probe - basic health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness response
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub extraction_client: String,
    pub cache_enabled: bool,
}

/// Readiness probe
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let is_ready = state.is_ready();

    let response = ReadinessResponse {
        ready: is_ready,
        extraction_client: state.client_name.clone(),
        cache_enabled: state.cache_stats.is_some(),
    };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// JSON metrics response
#[derive(Serialize)]
pub struct MetricsResponse {
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub analyses: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStatsReport>,
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(MetricsResponse {
        uptime_seconds: state.uptime_secs(),
        total_requests: state.get_request_count(),
        analyses: state.get_analysis_count(),
        cache: state.cache_stats.as_ref().map(|s| s.report()),
    })
}

/// Prometheus-compatible metrics endpoint
pub async fn prometheus_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (cache_hits, cache_misses) = state.get_cache_stats();

    let mut output = String::new();

    output.push_str("# HELP salience_uptime_seconds Time since server start\n");
    output.push_str("# TYPE salience_uptime_seconds gauge\n");
    output.push_str(&format!("salience_uptime_seconds {}\n\n", state.uptime_secs()));

    output.push_str("# HELP salience_requests_total Total number of HTTP requests\n");
    output.push_str("# TYPE salience_requests_total counter\n");
    output.push_str(&format!(
        "salience_requests_total {}\n\n",
        state.get_request_count()
    ));

    output.push_str("# HELP salience_analyses_total Completed comparisons\n");
    output.push_str("# TYPE salience_analyses_total counter\n");
    output.push_str(&format!(
        "salience_analyses_total {}\n\n",
        state.get_analysis_count()
    ));

    output.push_str("# HELP salience_cache_hits_total Extraction cache hits\n");
    output.push_str("# TYPE salience_cache_hits_total counter\n");
    output.push_str(&format!("salience_cache_hits_total {cache_hits}\n\n"));

    output.push_str("# HELP salience_cache_misses_total Extraction cache misses\n");
    output.push_str("# TYPE salience_cache_misses_total counter\n");
    output.push_str(&format!("salience_cache_misses_total {cache_misses}\n"));

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        output,
    )
}
