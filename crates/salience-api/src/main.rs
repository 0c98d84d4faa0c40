//! Salience API Server
//!
//! REST API server comparing entity salience across text variations.

use anyhow::Context;
use salience_api::{create_router, state::AppState};
use salience_core::config::AppConfig;
use salience_extractor::create_extraction_stack;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (file first, env overrides)
    let config = match std::env::var("SALIENCE_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.logging.level;
        format!("salience_api={level},salience_extractor={level},tower_http={level}").into()
    });
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let stack = create_extraction_stack(&config).context("Failed to configure extraction client")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = Arc::new(AppState::new(config, stack));

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Salience API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI document at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
