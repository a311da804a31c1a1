//! HTTP middleware for the web server

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

use crate::config::{Environment, SecurityConfig};

/// Precomputed response hardening headers
#[derive(Clone)]
pub struct SecurityHeaders {
    /// Only sent in production, where TLS is terminated in front of us
    hsts: Option<HeaderValue>,
}

impl SecurityHeaders {
    pub fn new(security: &SecurityConfig, environment: &Environment) -> Self {
        let hsts = environment
            .is_production()
            .then(|| format!("max-age={}; includeSubDomains", security.hsts_max_age))
            .and_then(|value| HeaderValue::from_str(&value).ok());
        Self { hsts }
    }
}

/// Security headers middleware
pub async fn security_headers_middleware(
    State(security): State<SecurityHeaders>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    if let Some(hsts) = &security.hsts {
        headers.insert("strict-transport-security", hsts.clone());
    }
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    // Swagger UI and the dashboard bundle both need inline styles
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static(
            "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; connect-src 'self'; frame-ancestors 'none';",
        ),
    );
    headers.insert(
        "permissions-policy",
        HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
    );

    response
}

/// Request logging middleware with timing and request ID
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = Uuid::new_v4();
    let start_time = Instant::now();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
        "Processing request"
    );

    let response = next.run(request).await;
    let duration = start_time.elapsed();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
        status = %response.status(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsts_only_in_production() {
        let security = SecurityConfig::default();
        assert!(
            SecurityHeaders::new(&security, &Environment::Development)
                .hsts
                .is_none()
        );
        let production = SecurityHeaders::new(&security, &Environment::Production);
        assert_eq!(
            production.hsts.unwrap().to_str().unwrap(),
            "max-age=31536000; includeSubDomains"
        );
    }
}
