//! Salience API - HTTP server
//!
//! Exposes the "Analyze" action over HTTP: submit up to three texts and
//! receive the ranked entity comparison as JSON.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use handlers::health;
use state::AppState;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    paths(health::health_check, handlers::analyze::analyze_handler),
    components(schemas(
        health::HealthResponse,
        handlers::analyze::AnalyzeRequest,
        handlers::analyze::AnalyzeResponse,
        error::ApiError
    )),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "analyze", description = "Entity salience comparison")
    )
)]
pub struct ApiDoc;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    let body_limit = state.config.server.max_body_size;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::prometheus_metrics))
        .nest("/api/v1", routes::api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Fixtures for exercising the router without the real extraction service
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use salience_core::{EntityResult, EntityType};
    use salience_extractor::StaticExtractor;

    pub const ORIGINAL_TEXT: &str = "Paris is the capital of France.";
    pub const VARIATION_TEXT: &str = "Paris is home to the Tour Eiffel.";
    pub const FAILING_TEXT: &str = "This text makes the extraction service fail.";
    pub const MALFORMED_TEXT: &str = "This text yields a malformed salience.";

    /// Extractor answering for the fixture texts above
    pub fn fixture_extractor() -> StaticExtractor {
        StaticExtractor::new()
            .with_response(
                ORIGINAL_TEXT,
                vec![
                    EntityResult::new("Paris", EntityType::Location, 0.41),
                    EntityResult::new("France", EntityType::Location, 0.3),
                ],
            )
            .with_response(
                VARIATION_TEXT,
                vec![
                    EntityResult::new("Paris", EntityType::Location, 0.55),
                    EntityResult::new("Tour Eiffel", EntityType::Location, 0.10),
                ],
            )
            .with_failure(FAILING_TEXT, "quota exhausted")
            .with_response(
                MALFORMED_TEXT,
                vec![EntityResult::new("Nowhere", EntityType::Location, f64::NAN)],
            )
    }
}

/// Router over the fixture extractor
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    let config = salience_core::AppConfig::default();
    let stack = salience_extractor::ExtractionStack::wrap(testing::fixture_extractor(), &config);
    create_router(Arc::new(AppState::new(config, stack)))
}
