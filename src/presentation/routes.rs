//! Route definitions and server setup

use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use std::path::Path;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::app::AppState;
use crate::config::Config;
use crate::presentation::{
    auth::{
        controller::{google_login, login, logout, oauth_success, ping, profile, register},
        extractors::inject_auth_state_middleware,
    },
    health::{health_check, liveness},
    middleware::{SecurityHeaders, logging_middleware, security_headers_middleware},
    models::*,
    production::{
        jobs::{create_job, delete_job, list_jobs, reorder_jobs, update_job},
        machines::{get_machine, list_machines, machine_statistics, update_machine_status},
        orders::{
            create_order, delete_order, get_order, list_orders, order_statistics, update_order,
        },
    },
};

/// Registers the bearer scheme referenced by protected endpoints
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::auth::controller::register,
        crate::presentation::auth::controller::login,
        crate::presentation::auth::controller::profile,
        crate::presentation::auth::controller::logout,
        crate::presentation::auth::controller::google_login,
        crate::presentation::auth::controller::oauth_success,
        crate::presentation::auth::controller::ping,
        crate::presentation::production::orders::list_orders,
        crate::presentation::production::orders::get_order,
        crate::presentation::production::orders::create_order,
        crate::presentation::production::orders::update_order,
        crate::presentation::production::orders::delete_order,
        crate::presentation::production::orders::order_statistics,
        crate::presentation::production::machines::list_machines,
        crate::presentation::production::machines::get_machine,
        crate::presentation::production::machines::update_machine_status,
        crate::presentation::production::machines::machine_statistics,
        crate::presentation::production::jobs::list_jobs,
        crate::presentation::production::jobs::create_job,
        crate::presentation::production::jobs::update_job,
        crate::presentation::production::jobs::delete_job,
        crate::presentation::production::jobs::reorder_jobs,
        crate::presentation::health::health_check,
        crate::presentation::health::liveness
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            HealthResponse,
            crate::infrastructure::health::CheckResult,
            crate::presentation::auth::models::RegisterRequest,
            crate::presentation::auth::models::LoginRequest,
            crate::presentation::auth::models::LoginResponse,
            crate::presentation::auth::models::ProfileResponse,
            crate::presentation::auth::models::UserDto,
            crate::presentation::production::models::ProductionOrderDto,
            crate::presentation::production::models::ProductionJobDto,
            crate::presentation::production::models::CreateProductionOrderRequest,
            crate::presentation::production::models::UpdateProductionOrderRequest,
            crate::presentation::production::models::OrderStatisticsDto,
            crate::presentation::production::models::MachineDto,
            crate::presentation::production::models::UpdateMachineStatusRequest,
            crate::presentation::production::models::MachineStatisticsDto,
            crate::presentation::production::models::CreateProductionJobRequest,
            crate::presentation::production::models::UpdateProductionJobRequest,
            crate::presentation::production::models::ReorderJobsRequest,
            crate::domain::production::value_objects::Priority,
            crate::domain::production::value_objects::OrderStatus,
            crate::domain::production::value_objects::JobStatus,
            crate::domain::production::value_objects::MachineStatus
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "auth", description = "Registration, login and Google sign-in"),
        (name = "production-orders", description = "Customer production orders"),
        (name = "production-jobs", description = "Scheduling board jobs of an order"),
        (name = "machines", description = "Shop floor machines"),
        (name = "health", description = "Liveness and readiness probes")
    ),
    info(
        title = "prodsched API",
        version = "0.1.0",
        description = "Authentication and production scheduling for a tire plant dashboard.",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

const CORS_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Credentialed CORS for the configured origins
///
/// Credentials rule out wildcard headers, so the allowed headers are listed.
fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(&origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Invalid CORS origin in config; skipping");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            header::ACCESS_CONTROL_REQUEST_METHOD,
            header::ACCESS_CONTROL_REQUEST_HEADERS,
        ])
        .expose_headers([header::LOCATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("NOT_FOUND", "Resource not found", None)),
    )
}

/// Create the application router with the full middleware stack
pub fn create_router(app_state: AppState, config: &Config) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
        .route("/auth/logout", post(logout))
        .route("/auth/google-login", get(google_login))
        .route("/auth/oauth-success", get(oauth_success))
        .route("/auth/test", get(ping))
        .with_state(app_state.auth.clone());

    let production_routes = Router::new()
        .route("/productionorders", get(list_orders).post(create_order))
        .route("/productionorders/statistics", get(order_statistics))
        .route(
            "/productionorders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/productionorders/{id}/jobs", get(list_jobs).post(create_job))
        .route("/productionorders/{id}/jobs/order", put(reorder_jobs))
        .route("/productionjobs/{id}", put(update_job).delete(delete_job))
        .route("/machines", get(list_machines))
        .route("/machines/statistics", get(machine_statistics))
        .route("/machines/{id}", get(get_machine))
        .route("/machines/{id}/status", put(update_machine_status))
        .with_state(app_state.production.clone());

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(production_routes)
        .fallback(api_not_found)
        .layer(middleware::from_fn_with_state(
            app_state.auth_state.clone(),
            inject_auth_state_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .with_state(app_state.health.clone());

    let mut router = Router::new()
        .nest("/api", api_routes)
        .merge(health_routes);

    // Conditionally expose Swagger UI based on configuration
    if config.server.enable_docs {
        router =
            router.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    if let Some(spa_dir) = config.app.spa_dir.as_deref()
        && Path::new(spa_dir).is_dir()
    {
        let index = Path::new(spa_dir).join("index.html");
        tracing::info!(spa_dir, "Serving dashboard assets");
        router = router
            .fallback_service(ServeDir::new(spa_dir).fallback(ServeFile::new(index)));
    }

    if config.server.security.enable_security_headers {
        router = router.layer(middleware::from_fn_with_state(
            SecurityHeaders::new(&config.server.security, &config.environment),
            security_headers_middleware,
        ));
    }

    let service_builder = ServiceBuilder::new()
        // HTTP tracing
        .layer(TraceLayer::new_for_http())
        // CORS handling
        .layer(cors_layer(config))
        // Request timeout
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_seconds,
        )))
        // Custom logging middleware
        .layer(middleware::from_fn(logging_middleware));

    router.layer(service_builder)
}
