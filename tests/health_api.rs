//! Health probes, API docs, security headers and dashboard serving

mod common;

use axum::http::{HeaderValue, StatusCode, header};
use serde_json::Value;

use common::*;

#[tokio::test]
async fn test_health_reports_every_check() {
    let server = empty_server().await;

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["checks"]["database"].is_object());
    assert!(body["checks"]["jwt"].is_object());
}

#[tokio::test]
async fn test_liveness() {
    let server = empty_server().await;

    let response = server.get("/health/live").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_openapi_document_lists_scheduling_paths() {
    let server = empty_server().await;

    let response = server.get("/api-docs/openapi.json").await;

    response.assert_status_ok();
    let doc: Value = response.json();
    assert!(doc["paths"]["/api/productionorders"].is_object());
    assert!(doc["paths"]["/api/productionorders/{id}/jobs/order"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn test_cors_allows_frontend_url_with_trailing_slash() {
    let config = TestConfigBuilder::new()
        .without_seed()
        .with_frontend_url("http://localhost:5173/")
        .build();
    let server = server_with(config).await;

    let response = server
        .get("/health/live")
        .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:5173"))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let server = empty_server().await;

    let response = server.get("/health/live").await;

    let headers = response.headers();
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert!(headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_dashboard_routes_fall_back_to_index() {
    let dist = tempfile::tempdir().unwrap();
    std::fs::write(dist.path().join("index.html"), "<div id=\"root\"></div>").unwrap();
    std::fs::write(dist.path().join("app.js"), "console.log('dashboard')").unwrap();
    let server = server_with(
        TestConfigBuilder::new()
            .without_seed()
            .with_spa_dir(dist.path().to_str().unwrap())
            .build(),
    )
    .await;

    let asset = server.get("/app.js").await;
    asset.assert_status_ok();
    assert_eq!(asset.text(), "console.log('dashboard')");

    let client_route = server.get("/orders/42").await;
    client_route.assert_status_ok();
    assert_eq!(client_route.text(), "<div id=\"root\"></div>");
    assert!(
        client_route
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );

    // API misses stay JSON even with the dashboard mounted
    let api_miss = server.get("/api/unknown").await;
    api_miss.assert_status(StatusCode::NOT_FOUND);
    let body: Value = api_miss.json();
    assert_eq!(body["code"], "NOT_FOUND");
}
