//! Google sign-in against a mocked identity provider

mod common;

use axum::http::{StatusCode, header};
use axum_test::{TestResponse, TestServer};
use serde_json::{Value, json};
use std::collections::HashMap;
use url::Url;
use wiremock::matchers::{body_string_contains, header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

fn location(response: &TestResponse) -> Url {
    let raw = response
        .headers()
        .get(header::LOCATION)
        .expect("redirect has a location")
        .to_str()
        .unwrap();
    Url::parse(raw).unwrap()
}

fn query(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

async fn signed_state(server: &TestServer) -> String {
    let response = server.get("/api/auth/google-login").await;
    response.assert_status(StatusCode::SEE_OTHER);
    query(&location(&response))["state"].clone()
}

async fn mock_google(userinfo: Value) -> MockServer {
    let google = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "google-access-token",
            "token_type": "Bearer",
            "expires_in": 3599
        })))
        .mount(&google)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/userinfo"))
        .and(header_matcher("authorization", "Bearer google-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(userinfo))
        .mount(&google)
        .await;
    google
}

#[tokio::test]
async fn test_google_login_redirects_to_consent_screen() {
    let google = MockServer::start().await;
    let server =
        server_with(TestConfigBuilder::new().with_google_base(&google.uri()).build()).await;

    let response = server.get("/api/auth/google-login").await;

    response.assert_status(StatusCode::SEE_OTHER);
    let target = location(&response);
    assert_eq!(target.path(), "/o/oauth2/v2/auth");
    let params = query(&target);
    assert_eq!(params["client_id"], "test-client");
    assert_eq!(params["response_type"], "code");
    assert_eq!(
        params["redirect_uri"],
        "http://localhost:5000/api/auth/oauth-success"
    );
    assert!(!params["state"].is_empty());
}

#[tokio::test]
async fn test_callback_creates_account_and_hands_token_to_dashboard() {
    let google = mock_google(json!({
        "sub": "1234567890",
        "email": "grace@example.com",
        "name": "Grace Hopper"
    }))
    .await;
    let server =
        server_with(TestConfigBuilder::new().with_google_base(&google.uri()).build()).await;
    let state = signed_state(&server).await;

    let response = server
        .get("/api/auth/oauth-success")
        .add_query_param("code", "auth-code")
        .add_query_param("state", &state)
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.as_str().starts_with(&format!("{}/oauth-success", FRONTEND_URL)));
    let token = query(&target)["token"].clone();

    let profile: Value = server
        .get("/api/auth/profile")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(profile["user"]["username"], "GraceHopper");
    assert_eq!(profile["user"]["email"], "grace@example.com");
}

#[tokio::test]
async fn test_callback_links_existing_account_by_email() {
    let google = mock_google(json!({ "email": "planner@example.com", "name": "Someone Else" })).await;
    let server =
        server_with(TestConfigBuilder::new().with_google_base(&google.uri()).build()).await;
    register(&server, "planner", "planner@example.com").await;
    let state = signed_state(&server).await;

    let response = server
        .get("/api/auth/oauth-success")
        .add_query_param("code", "auth-code")
        .add_query_param("state", &state)
        .await;

    let token = query(&location(&response))["token"].clone();
    let profile: Value = server
        .get("/api/auth/profile")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(profile["user"]["username"], "planner");
}

#[tokio::test]
async fn test_missing_email_is_reported_to_dashboard() {
    let google = mock_google(json!({ "name": "No Email" })).await;
    let server =
        server_with(TestConfigBuilder::new().with_google_base(&google.uri()).build()).await;
    let state = signed_state(&server).await;

    let response = server
        .get("/api/auth/oauth-success")
        .add_query_param("code", "auth-code")
        .add_query_param("state", &state)
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    let params = query(&location(&response));
    assert_eq!(params["error"], "No email returned from Google");
    assert!(!params.contains_key("token"));
}

#[tokio::test]
async fn test_tampered_state_is_rejected() {
    let google = mock_google(json!({ "email": "grace@example.com" })).await;
    let server =
        server_with(TestConfigBuilder::new().with_google_base(&google.uri()).build()).await;

    let response = server
        .get("/api/auth/oauth-success")
        .add_query_param("code", "auth-code")
        .add_query_param("state", "forged")
        .await;

    let params = query(&location(&response));
    assert_eq!(params["error"], "OAuth authentication failed");
}

#[tokio::test]
async fn test_provider_error_short_circuits() {
    let google = MockServer::start().await;
    let server =
        server_with(TestConfigBuilder::new().with_google_base(&google.uri()).build()).await;

    let response = server
        .get("/api/auth/oauth-success")
        .add_query_param("error", "access_denied")
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    let params = query(&location(&response));
    assert_eq!(params["error"], "OAuth authentication failed");
    assert!(google.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_code_is_reported_to_dashboard() {
    let google = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })))
        .mount(&google)
        .await;
    let server =
        server_with(TestConfigBuilder::new().with_google_base(&google.uri()).build()).await;
    let state = signed_state(&server).await;

    let response = server
        .get("/api/auth/oauth-success")
        .add_query_param("code", "stale")
        .add_query_param("state", &state)
        .await;

    let params = query(&location(&response));
    assert_eq!(params["error"], "OAuth authentication failed");
}
