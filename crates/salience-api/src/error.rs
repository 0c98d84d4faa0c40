//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use salience_core::SalienceError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// Extraction service returned unusable data
    InvalidData(String),
    /// Extraction service failed
    Upstream(String),
    /// Extraction service did not answer in time
    UpstreamTimeout(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::InvalidData(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("DATA_ERROR", "Extraction returned malformed data")
                    .with_details(msg),
            ),
            AppError::Upstream(msg) => (
                StatusCode::BAD_GATEWAY,
                ApiError::new("EXTRACTION_ERROR", "Entity extraction failed").with_details(msg),
            ),
            AppError::UpstreamTimeout(msg) => (
                StatusCode::GATEWAY_TIMEOUT,
                ApiError::new("EXTRACTION_TIMEOUT", "Entity extraction timed out")
                    .with_details(msg),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::internal_error().with_details(msg),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<SalienceError> for AppError {
    fn from(err: SalienceError) -> Self {
        match err {
            SalienceError::Validation(msg) => AppError::BadRequest(msg),
            SalienceError::Data(msg) => AppError::InvalidData(msg),
            SalienceError::Extraction(msg) => AppError::Upstream(msg),
            err @ SalienceError::Timeout { .. } => AppError::UpstreamTimeout(err.to_string()),
            SalienceError::Config(msg) => AppError::Internal(format!("Configuration error: {msg}")),
            SalienceError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}
