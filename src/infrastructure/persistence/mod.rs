//! Relational storage
//!
//! PostgreSQL through a pooled `sqlx` connection, plus in-memory
//! repositories used by the `Testing` environment and the test suite.

pub mod job_repository;
pub mod machine_repository;
pub mod memory;
pub mod order_repository;

pub use job_repository::SqlxProductionJobRepository;
pub use machine_repository::SqlxMachineRepository;
pub use memory::{
    InMemoryMachineRepository, InMemoryProductionJobRepository,
    InMemoryProductionOrderRepository, InMemoryUserRepository, InMemoryScheduleStore,
};
pub use order_repository::SqlxProductionOrderRepository;

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::domain::production::errors::ProductionError;

/// Open the connection pool sized from `database.*`
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!(
        max_connections = config.max_connections,
        "Initializing PostgreSQL database pool"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_idle.unwrap_or(0))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .max_lifetime(config.max_lifetime_seconds.map(Duration::from_secs))
        .idle_timeout(config.idle_timeout_seconds.map(Duration::from_secs))
        .test_before_acquire(config.enable_health_checks)
        .connect(&config.url)
        .await
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running database migrations");
    sqlx::migrate!("./migrations").run(pool).await
}

pub(crate) fn db_error(context: &str, e: sqlx::Error) -> ProductionError {
    tracing::error!("Database error {}: {}", context, e);
    ProductionError::database(format!("Database error {}: {}", context, e))
}

/// Parse an enum column, treating unknown text as corrupt data
pub(crate) fn parse_column<T>(column: &str, value: &str) -> Result<T, ProductionError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ProductionError::database(format!("Bad value in column {}: {}", column, e)))
}
