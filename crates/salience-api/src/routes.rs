//! API route definitions

use crate::handlers::analyze;
use crate::state::AppState;
use axum::{routing::post, Router};
use std::sync::Arc;

/// Create API v1 routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/analyze", post(analyze::analyze_handler))
}
