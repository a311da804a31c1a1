//! Shared helpers for the HTTP integration tests
//!
//! Every test builds its own app in the `Testing` environment, so storage is
//! in-memory and isolated per test.

#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{Value, json};

use prodsched::config::{Config, Environment};
use prodsched::create_app;

pub const TEST_PASSWORD: &str = "Str0ngPassword";
pub const FRONTEND_URL: &str = "http://localhost:5173";

/// Test configuration builder for creating consistent test configurations
pub struct TestConfigBuilder {
    config: Config,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.environment = Environment::Testing;
        config.jwt.key = "integration-test-signing-key-0123456789".to_string();
        config.jwt.issuer = "prodsched".to_string();
        config.jwt.audience = "prodsched-dashboard".to_string();
        config.google.client_id = "test-client".to_string();
        config.google.client_secret = "test-secret".to_string();
        config.google.redirect_uri =
            Some("http://localhost:5000/api/auth/oauth-success".to_string());
        config.app.frontend_url = FRONTEND_URL.to_string();
        config.app.spa_dir = None;
        Self { config }
    }

    /// Start with empty scheduling tables
    pub fn without_seed(mut self) -> Self {
        self.config.seed.enabled = false;
        self
    }

    /// Point the Google client at a mock server
    pub fn with_google_base(mut self, base: &str) -> Self {
        self.config.google.auth_url = format!("{}/o/oauth2/v2/auth", base);
        self.config.google.token_url = format!("{}/token", base);
        self.config.google.userinfo_url = format!("{}/v1/userinfo", base);
        self
    }

    pub fn with_frontend_url(mut self, url: &str) -> Self {
        self.config.app.frontend_url = url.to_string();
        self
    }

    pub fn with_spa_dir(mut self, dir: &str) -> Self {
        self.config.app.spa_dir = Some(dir.to_string());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn server_with(config: Config) -> TestServer {
    let handle = create_app(config).await.expect("app should start");
    TestServer::new(handle.router).expect("test server should start")
}

/// Seeded app: five machines and three pending orders
pub async fn seeded_server() -> TestServer {
    server_with(TestConfigBuilder::new().build()).await
}

pub async fn empty_server() -> TestServer {
    server_with(TestConfigBuilder::new().without_seed().build()).await
}

pub async fn register(server: &TestServer, username: &str, email: &str) {
    server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .await
        .assert_status_ok();
}

/// Register a fresh account and return its bearer token
pub async fn login_token(server: &TestServer) -> String {
    register(server, "planner", "planner@example.com").await;
    let body: Value = server
        .post("/api/auth/login")
        .json(&json!({ "username": "planner", "password": TEST_PASSWORD }))
        .await
        .json();
    body["token"]
        .as_str()
        .expect("login returns a token")
        .to_string()
}

pub fn order_body(customer: &str) -> Value {
    json!({
        "customerName": customer,
        "productName": "Winter Tire 195/65R15",
        "quantity": 250,
        "dueDate": (chrono::Utc::now() + chrono::Duration::days(10)).to_rfc3339(),
        "priority": "high",
        "estimatedHours": 12.5,
        "notes": "Rush order"
    })
}
