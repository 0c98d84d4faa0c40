//! Comparison handlers

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use salience_core::FailurePolicy;
use salience_extractor::AnalysisRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use utoipa::ToSchema;

/// Analyze request body; every text is optional
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Original passage
    #[schema(example = "Paris is the capital of France.")]
    #[serde(default)]
    pub original: Option<String>,

    /// First variation
    #[schema(example = "Paris is home to the Tour Eiffel.")]
    #[serde(default)]
    pub variation_1: Option<String>,

    /// Second variation
    #[serde(default)]
    pub variation_2: Option<String>,

    /// `abort` or `degrade`; defaults to the server setting
    #[serde(default)]
    pub failure_policy: Option<String>,
}

/// Analyze response body
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    /// Analysis identifier
    pub id: String,

    /// RFC 3339 timestamp
    pub analyzed_at: String,

    /// Score columns, in order
    #[schema(example = json!(["Original", "Variation 1"]))]
    pub columns: Vec<String>,

    /// One object per entity keyed by `Entity`, `Type` and column name
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Map<String, Value>>,

    /// Set when there is nothing to show
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Texts left out of the comparison and why
    pub warnings: Vec<String>,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Compare entity salience across the supplied texts
#[utoipa::path(
    post,
    path = "/api/v1/analyze",
    tag = "analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Comparison built", body = AnalyzeResponse),
        (status = 400, description = "Invalid request", body = crate::error::ApiError),
        (status = 422, description = "Malformed extraction data", body = crate::error::ApiError),
        (status = 502, description = "Extraction failed", body = crate::error::ApiError),
        (status = 504, description = "Extraction timed out", body = crate::error::ApiError)
    )
)]
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let start = std::time::Instant::now();

    let policy = match req.failure_policy.as_deref() {
        Some(policy) => policy
            .parse::<FailurePolicy>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => state.analyzer.failure_policy(),
    };

    let request = AnalysisRequest::from_slots(req.original, req.variation_1, req.variation_2);
    let outcome = state.analyzer.analyze_with_policy(&request, policy).await?;
    state.record_analysis();

    let response = AnalyzeResponse {
        id: outcome.id.to_string(),
        analyzed_at: outcome.analyzed_at.to_rfc3339(),
        columns: outcome.table.columns.iter().map(|l| l.to_string()).collect(),
        rows: outcome.table.to_records(),
        message: outcome.message().map(str::to_string),
        warnings: outcome.warnings,
        processing_time_ms: start.elapsed().as_millis() as u64,
    };

    Ok((StatusCode::OK, Json(response)))
}
