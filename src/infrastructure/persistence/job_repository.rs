//! SQLx implementation of the production job repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::{db_error, parse_column};
use crate::domain::production::{
    entities::{NewProductionJob, ProductionJob},
    errors::ProductionError,
    repositories::IProductionJobRepository,
};

#[derive(sqlx::FromRow)]
struct JobRow {
    id: i32,
    production_order_id: i32,
    job_name: String,
    machine_id: i32,
    machine_name: String,
    duration: f64,
    status: String,
    scheduled_start_time: Option<DateTime<Utc>>,
    scheduled_end_time: Option<DateTime<Utc>>,
    actual_start_time: Option<DateTime<Utc>>,
    actual_end_time: Option<DateTime<Utc>>,
    operator: Option<String>,
    notes: Option<String>,
    sort_order: i32,
    is_deleted: bool,
    deleted_date: Option<DateTime<Utc>>,
    created_date: DateTime<Utc>,
    updated_date: Option<DateTime<Utc>>,
}

impl TryFrom<JobRow> for ProductionJob {
    type Error = ProductionError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(ProductionJob {
            id: row.id,
            production_order_id: row.production_order_id,
            job_name: row.job_name,
            machine_id: row.machine_id,
            machine_name: row.machine_name,
            duration: row.duration,
            status: parse_column("production_jobs.status", &row.status)?,
            scheduled_start_time: row.scheduled_start_time,
            scheduled_end_time: row.scheduled_end_time,
            actual_start_time: row.actual_start_time,
            actual_end_time: row.actual_end_time,
            operator: row.operator,
            notes: row.notes,
            sort_order: row.sort_order,
            is_deleted: row.is_deleted,
            deleted_date: row.deleted_date,
            created_date: row.created_date,
            updated_date: row.updated_date,
        })
    }
}

const JOB_COLUMNS: &str = r#"
    j.id, j.production_order_id, j.job_name, j.machine_id, m.name AS machine_name, j.duration,
    j.status, j.scheduled_start_time, j.scheduled_end_time, j.actual_start_time,
    j.actual_end_time, j.operator, j.notes, j.sort_order, j.is_deleted, j.deleted_date,
    j.created_date, j.updated_date
"#;

pub struct SqlxProductionJobRepository {
    pool: Arc<PgPool>,
}

impl SqlxProductionJobRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IProductionJobRepository for SqlxProductionJobRepository {
    async fn list_for_order(&self, order_id: i32) -> Result<Vec<ProductionJob>, ProductionError> {
        self.list_for_orders(&[order_id]).await
    }

    async fn list_for_orders(
        &self,
        order_ids: &[i32],
    ) -> Result<Vec<ProductionJob>, ProductionError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT {}
            FROM production_jobs j
            JOIN machines m ON m.id = j.machine_id
            WHERE j.production_order_id = ANY($1) AND NOT j.is_deleted
            ORDER BY j.production_order_id, j.sort_order, j.id
            "#,
            JOB_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(order_ids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("listing production jobs", e))?;

        rows.into_iter().map(ProductionJob::try_from).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<Option<ProductionJob>, ProductionError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM production_jobs j
            JOIN machines m ON m.id = j.machine_id
            WHERE j.id = $1 AND NOT j.is_deleted
            "#,
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("finding production job", e))?;

        row.map(ProductionJob::try_from).transpose()
    }

    #[tracing::instrument(skip(self, job), fields(order_id = job.production_order_id))]
    async fn create(&self, job: &NewProductionJob) -> Result<ProductionJob, ProductionError> {
        let sql = format!(
            r#"
            WITH j AS (
                INSERT INTO production_jobs (production_order_id, job_name, machine_id, duration,
                                             status, scheduled_start_time, scheduled_end_time,
                                             operator, notes, sort_order, created_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
                RETURNING *
            )
            SELECT {}
            FROM j
            JOIN machines m ON m.id = j.machine_id
            "#,
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(job.production_order_id)
            .bind(&job.job_name)
            .bind(job.machine_id)
            .bind(job.duration)
            .bind(job.status.as_str())
            .bind(job.scheduled_start_time)
            .bind(job.scheduled_end_time)
            .bind(&job.operator)
            .bind(&job.notes)
            .bind(job.sort_order)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error()
                    && db_err.is_foreign_key_violation()
                {
                    return ProductionError::UnknownMachine { id: job.machine_id };
                }
                db_error("creating production job", e)
            })?;

        ProductionJob::try_from(row)
    }

    #[tracing::instrument(skip(self, job), fields(job_id = job.id))]
    async fn update(&self, job: &ProductionJob) -> Result<(), ProductionError> {
        sqlx::query(
            r#"
            UPDATE production_jobs
            SET job_name = $2, machine_id = $3, duration = $4, status = $5,
                scheduled_start_time = $6, scheduled_end_time = $7, actual_start_time = $8,
                actual_end_time = $9, operator = $10, notes = $11, updated_date = $12
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(job.id)
        .bind(&job.job_name)
        .bind(job.machine_id)
        .bind(job.duration)
        .bind(job.status.as_str())
        .bind(job.scheduled_start_time)
        .bind(job.scheduled_end_time)
        .bind(job.actual_start_time)
        .bind(job.actual_end_time)
        .bind(&job.operator)
        .bind(&job.notes)
        .bind(job.updated_date)
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("updating production job", e))?;

        Ok(())
    }

    async fn soft_delete(&self, id: i32, at: DateTime<Utc>) -> Result<bool, ProductionError> {
        let result = sqlx::query(
            r#"
            UPDATE production_jobs
            SET is_deleted = TRUE, deleted_date = $2, updated_date = $2
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("deleting production job", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, job_ids), fields(count = job_ids.len()))]
    async fn reorder(&self, order_id: i32, job_ids: &[i32]) -> Result<(), ProductionError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("starting transaction", e))?;

        for (position, job_id) in job_ids.iter().enumerate() {
            sqlx::query(
                r#"
                UPDATE production_jobs
                SET sort_order = $3, updated_date = NOW()
                WHERE id = $1 AND production_order_id = $2 AND NOT is_deleted
                "#,
            )
            .bind(job_id)
            .bind(order_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("reordering production jobs", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("committing job reorder", e))
    }

    async fn next_sort_order(&self, order_id: i32) -> Result<i32, ProductionError> {
        sqlx::query_scalar::<_, i32>(
            r#"
            SELECT COALESCE(MAX(sort_order) + 1, 0)
            FROM production_jobs
            WHERE production_order_id = $1 AND NOT is_deleted
            "#,
        )
        .bind(order_id)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| db_error("computing next sort order", e))
    }

    async fn count(&self) -> Result<i64, ProductionError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM production_jobs")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| db_error("counting production jobs", e))
    }

    async fn clear(&self) -> Result<(), ProductionError> {
        sqlx::query("DELETE FROM production_jobs")
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("clearing production jobs", e))?;
        Ok(())
    }
}
