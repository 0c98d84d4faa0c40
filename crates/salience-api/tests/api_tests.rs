//! API Integration Tests
//!
//! All tests run against the fixture extractor; no network access needed.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use salience_api::create_router_for_testing;
use salience_api::testing::{FAILING_TEXT, MALFORMED_TEXT, ORIGINAL_TEXT, VARIATION_TEXT};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn analyze(body: Value) -> (StatusCode, Value) {
    send(
        create_router_for_testing(),
        create_json_request("POST", "/api/v1/analyze", Some(body)),
    )
    .await
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let (status, json) = send(
        create_router_for_testing(),
        create_json_request("GET", "/health", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_check() {
    let (status, json) = send(
        create_router_for_testing(),
        create_json_request("GET", "/ready", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
    assert_eq!(json["extraction_client"], "static");
    assert_eq!(json["cache_enabled"], true);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (status, json) = send(
        create_router_for_testing(),
        create_json_request("GET", "/metrics", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["uptime_seconds"].is_u64());
    assert_eq!(json["analyses"], 0);
    assert!(json["cache"].is_object());
}

#[tokio::test]
async fn test_prometheus_metrics() {
    let app = create_router_for_testing();
    let response = app
        .oneshot(create_json_request("GET", "/metrics/prometheus", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("salience_analyses_total 0"));
    assert!(text.contains("salience_cache_hits_total"));
}

#[tokio::test]
async fn test_openapi_document() {
    let (status, json) = send(
        create_router_for_testing(),
        create_json_request("GET", "/api-docs/openapi.json", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/v1/analyze"].is_object());
}

// =============================================================================
// Analyze Tests
// =============================================================================

#[tokio::test]
async fn test_analyze_two_texts() {
    let (status, json) = analyze(json!({
        "original": ORIGINAL_TEXT,
        "variation_1": VARIATION_TEXT
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["columns"], json!(["Original", "Variation 1"]));
    assert!(json["message"].is_null());
    assert_eq!(json["warnings"], json!([]));

    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);

    assert_eq!(
        rows[0],
        json!({"Entity": "Paris", "Type": "LOCATION", "Original": "0.41", "Variation 1": "0.55"})
    );
    assert_eq!(
        rows[1],
        json!({"Entity": "France", "Type": "LOCATION", "Original": "0.30", "Variation 1": ""})
    );
    assert_eq!(
        rows[2],
        json!({"Entity": "Tour Eiffel", "Type": "LOCATION", "Original": "", "Variation 1": "0.10"})
    );
}

#[tokio::test]
async fn test_analyze_skips_blank_texts() {
    let (status, json) = analyze(json!({
        "original": ORIGINAL_TEXT,
        "variation_1": "   ",
        "variation_2": null
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["columns"], json!(["Original"]));
    assert_eq!(json["rows"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_analyze_no_texts() {
    let (status, json) = analyze(json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rows"], json!([]));
    assert_eq!(json["message"], "No entities found or no text provided.");
}

#[tokio::test]
async fn test_analyze_no_entities() {
    let (status, json) = analyze(json!({"original": "nothing to see here"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rows"], json!([]));
    assert_eq!(json["message"], "No entities found or no text provided.");
}

#[tokio::test]
async fn test_analyze_invalid_failure_policy() {
    let (status, json) = analyze(json!({
        "original": ORIGINAL_TEXT,
        "failure_policy": "sometimes"
    }))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_analyze_extraction_failure_aborts() {
    let (status, json) = analyze(json!({
        "original": ORIGINAL_TEXT,
        "variation_2": FAILING_TEXT
    }))
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "EXTRACTION_ERROR");
    assert!(json["details"].as_str().unwrap().contains("quota exhausted"));
}

#[tokio::test]
async fn test_analyze_extraction_failure_degrades() {
    let (status, json) = analyze(json!({
        "original": ORIGINAL_TEXT,
        "variation_2": FAILING_TEXT,
        "failure_policy": "degrade"
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["columns"], json!(["Original"]));

    let warnings = json["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().starts_with("Variation 2 omitted"));
}

#[tokio::test]
async fn test_analyze_malformed_salience() {
    let (status, json) = analyze(json!({
        "original": MALFORMED_TEXT,
        "failure_policy": "degrade"
    }))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "DATA_ERROR");
}

#[tokio::test]
async fn test_analyze_rejects_invalid_json() {
    let app = create_router_for_testing();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/analyze")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}
