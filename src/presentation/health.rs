//! Health endpoints

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::infrastructure::health::{CheckResult, HealthCheck};
use crate::presentation::models::HealthResponse;

/// Probes run by `/health`
#[derive(Clone)]
pub struct HealthState {
    pub checks: Arc<Vec<Arc<dyn HealthCheck>>>,
}

impl HealthState {
    pub fn new(checks: Vec<Arc<dyn HealthCheck>>) -> Self {
        Self {
            checks: Arc::new(checks),
        }
    }
}

/// Readiness: every dependency probe must pass
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "All checks healthy", body = HealthResponse),
        (status = 503, description = "At least one check failed", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let mut probes = JoinSet::new();
    for check in state.checks.iter().cloned() {
        probes.spawn(async move { (check.name().to_string(), check.check().await) });
    }

    let mut results = BTreeMap::new();
    while let Some(joined) = probes.join_next().await {
        match joined {
            Ok((name, result)) => {
                results.insert(name, result);
            }
            Err(e) => {
                tracing::error!("Health check task failed: {}", e);
                results.insert("probe".to_string(), CheckResult::unhealthy(e.to_string()));
            }
        }
    }

    let healthy = results.values().all(|r| r.is_healthy());
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            checks: results,
        }),
    )
}

/// Liveness: the process is serving requests
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Process alive")
    )
)]
pub async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "alive" }))
}
