//! Application setup and wiring

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::application::auth::{
    CompleteOAuthLoginUseCase, GetProfileUseCase, LoginUseCase, LogoutUseCase,
    RegisterUserUseCase, StartOAuthLoginUseCase, ValidateTokenUseCase,
};
use crate::application::production::{
    CreateProductionJobUseCase, CreateProductionOrderUseCase, DeleteProductionJobUseCase,
    DeleteProductionOrderUseCase, GetMachineStatisticsUseCase, GetMachineUseCase,
    GetOrderStatisticsUseCase, GetProductionOrderUseCase, ListMachinesUseCase,
    ListOrderJobsUseCase, ListProductionOrdersUseCase, ReorderProductionJobsUseCase,
    UpdateMachineStatusUseCase, UpdateProductionJobUseCase, UpdateProductionOrderUseCase,
};
use crate::application::seeding::DatabaseSeeder;
use crate::config::{Config, Environment};
use crate::domain::auth::repositories::IUserRepository;
use crate::domain::production::repositories::{
    IMachineRepository, IProductionJobRepository, IProductionOrderRepository,
};
use crate::infrastructure::auth::{
    GoogleOAuthProvider, InMemoryTokenBlacklist, JwtService, OAuthProvider, PasswordHasher,
    SqlxUserRepository, TokenBlacklistService,
};
use crate::infrastructure::health::{
    DatabaseHealthCheck, HealthCheck, InMemoryHealthCheck, JwtHealthCheck,
};
use crate::infrastructure::persistence::{
    InMemoryScheduleStore, InMemoryUserRepository, SqlxMachineRepository,
    SqlxProductionJobRepository, SqlxProductionOrderRepository, connect_pool, run_migrations,
};
use crate::presentation::auth::{AuthAppState, AuthState};
use crate::presentation::health::HealthState;
use crate::presentation::production::ProductionAppState;
use crate::presentation::routes::create_router;

/// Handle returned from create_app for graceful shutdown coordination
pub struct AppHandle {
    pub router: Router,
    pub shutdown_token: CancellationToken,
}

/// Per-area router states
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthAppState,
    pub auth_state: AuthState,
    pub production: ProductionAppState,
    pub health: HealthState,
}

/// Storage backends the use cases run against
struct Repositories {
    users: Arc<dyn IUserRepository>,
    machines: Arc<dyn IMachineRepository>,
    orders: Arc<dyn IProductionOrderRepository>,
    jobs: Arc<dyn IProductionJobRepository>,
    storage_check: Arc<dyn HealthCheck>,
}

impl Repositories {
    fn in_memory() -> Self {
        let store = InMemoryScheduleStore::new();
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            machines: Arc::new(store.machines()),
            orders: Arc::new(store.orders()),
            jobs: Arc::new(store.jobs()),
            storage_check: Arc::new(InMemoryHealthCheck),
        }
    }

    async fn postgres(config: &Config) -> anyhow::Result<Self> {
        let pool = connect_pool(&config.database)
            .await
            .context("Failed to connect to PostgreSQL")?;
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        let pool = Arc::new(pool);

        Ok(Self {
            users: Arc::new(SqlxUserRepository::new(pool.clone())),
            machines: Arc::new(SqlxMachineRepository::new(pool.clone())),
            orders: Arc::new(SqlxProductionOrderRepository::new(pool.clone())),
            jobs: Arc::new(SqlxProductionJobRepository::new(pool.clone())),
            storage_check: Arc::new(DatabaseHealthCheck::new(pool)),
        })
    }
}

/// Create the application router and return an AppHandle for shutdown coordination
pub async fn create_app(config: Config) -> anyhow::Result<AppHandle> {
    let repositories = match config.environment {
        Environment::Testing => {
            tracing::info!("Testing environment: using in-memory storage");
            Repositories::in_memory()
        }
        _ => Repositories::postgres(&config).await?,
    };

    build_app(config, repositories).await
}

async fn build_app(config: Config, repositories: Repositories) -> anyhow::Result<AppHandle> {
    let Repositories {
        users,
        machines,
        orders,
        jobs,
        storage_check,
    } = repositories;

    if config.seed.enabled {
        let report = DatabaseSeeder::new(
            machines.clone(),
            orders.clone(),
            jobs.clone(),
            config.seed.clone(),
        )
        .seed()
        .await
        .context("Failed to seed scheduling data")?;
        tracing::info!(
            machines = report.machines,
            orders = report.orders,
            jobs = report.jobs,
            "Seeding finished"
        );
    }

    // Auth services
    let oauth_provider: Arc<dyn OAuthProvider> =
        Arc::new(GoogleOAuthProvider::new(&config.google)?);
    let jwt_service = Arc::new(JwtService::new(&config.jwt));
    let password_hasher = Arc::new(PasswordHasher::new());
    let token_blacklist: Arc<dyn TokenBlacklistService> =
        Arc::new(InMemoryTokenBlacklist::new());

    let validate_token_use_case = Arc::new(ValidateTokenUseCase::new(
        jwt_service.clone(),
        token_blacklist.clone(),
    ));

    let auth = AuthAppState {
        register_use_case: Arc::new(RegisterUserUseCase::new(
            users.clone(),
            password_hasher.clone(),
        )),
        login_use_case: Arc::new(LoginUseCase::new(
            users.clone(),
            password_hasher.clone(),
            jwt_service.clone(),
        )),
        profile_use_case: Arc::new(GetProfileUseCase::new(users.clone())),
        logout_use_case: Arc::new(LogoutUseCase::new(token_blacklist)),
        start_oauth_use_case: Arc::new(StartOAuthLoginUseCase::new(
            oauth_provider.clone(),
            jwt_service.clone(),
        )),
        complete_oauth_use_case: Arc::new(CompleteOAuthLoginUseCase::new(
            oauth_provider,
            users,
            password_hasher,
            jwt_service.clone(),
        )),
        frontend_url: config.app.frontend_url.trim_end_matches('/').to_string(),
        oauth_redirect_uri: config.google.redirect_uri.clone(),
    };

    let production = ProductionAppState {
        list_orders_use_case: Arc::new(ListProductionOrdersUseCase::new(
            orders.clone(),
            jobs.clone(),
        )),
        get_order_use_case: Arc::new(GetProductionOrderUseCase::new(orders.clone(), jobs.clone())),
        create_order_use_case: Arc::new(CreateProductionOrderUseCase::new(orders.clone())),
        update_order_use_case: Arc::new(UpdateProductionOrderUseCase::new(orders.clone())),
        delete_order_use_case: Arc::new(DeleteProductionOrderUseCase::new(orders.clone())),
        order_statistics_use_case: Arc::new(GetOrderStatisticsUseCase::new(orders.clone())),
        list_machines_use_case: Arc::new(ListMachinesUseCase::new(machines.clone())),
        get_machine_use_case: Arc::new(GetMachineUseCase::new(machines.clone())),
        update_machine_status_use_case: Arc::new(UpdateMachineStatusUseCase::new(
            machines.clone(),
        )),
        machine_statistics_use_case: Arc::new(GetMachineStatisticsUseCase::new(machines.clone())),
        list_jobs_use_case: Arc::new(ListOrderJobsUseCase::new(orders.clone(), jobs.clone())),
        create_job_use_case: Arc::new(CreateProductionJobUseCase::new(
            orders.clone(),
            machines.clone(),
            jobs.clone(),
        )),
        update_job_use_case: Arc::new(UpdateProductionJobUseCase::new(
            machines.clone(),
            jobs.clone(),
        )),
        delete_job_use_case: Arc::new(DeleteProductionJobUseCase::new(jobs.clone())),
        reorder_jobs_use_case: Arc::new(ReorderProductionJobsUseCase::new(orders, jobs)),
    };

    let health = HealthState::new(vec![
        storage_check,
        Arc::new(JwtHealthCheck::new(jwt_service)) as Arc<dyn HealthCheck>,
    ]);

    let app_state = AppState {
        auth,
        auth_state: AuthState {
            validate_token: validate_token_use_case,
        },
        production,
        health,
    };

    let router = create_router(app_state, &config);

    Ok(AppHandle {
        router,
        shutdown_token: CancellationToken::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.environment = Environment::Testing;
        config.jwt.key = "a-test-signing-key-that-is-long-enough".to_string();
        config.jwt.issuer = "prodsched".to_string();
        config.jwt.audience = "prodsched-dashboard".to_string();
        config.app.frontend_url = "http://localhost:5173/".to_string();
        config.app.spa_dir = None;
        config
    }

    #[tokio::test]
    async fn test_in_memory_app_reports_healthy() {
        let handle = create_app(test_config()).await.unwrap();

        let response = handle
            .router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_seeding_failure_aborts_startup() {
        let mut config = test_config();
        config.seed.machines = vec![crate::config::MachineSeed {
            name: "Press".to_string(),
            machine_type: "Press".to_string(),
            status: "exploded".to_string(),
            ..Default::default()
        }];

        assert!(create_app(config).await.is_err());
    }
}
