//! SQLx implementation of the machine repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

use super::{db_error, parse_column};
use crate::domain::production::{
    entities::{Machine, NewMachine},
    errors::ProductionError,
    repositories::IMachineRepository,
};

#[derive(sqlx::FromRow)]
struct MachineRow {
    id: i32,
    name: String,
    machine_type: String,
    status: String,
    utilization: i32,
    last_maintenance: Option<DateTime<Utc>>,
    next_maintenance: Option<DateTime<Utc>>,
    notes: Option<String>,
    is_active: bool,
    is_deleted: bool,
    deleted_date: Option<DateTime<Utc>>,
    created_date: DateTime<Utc>,
    updated_date: Option<DateTime<Utc>>,
}

impl TryFrom<MachineRow> for Machine {
    type Error = ProductionError;

    fn try_from(row: MachineRow) -> Result<Self, Self::Error> {
        Ok(Machine {
            id: row.id,
            name: row.name,
            machine_type: row.machine_type,
            status: parse_column("machines.status", &row.status)?,
            utilization: row.utilization,
            last_maintenance: row.last_maintenance,
            next_maintenance: row.next_maintenance,
            notes: row.notes,
            is_active: row.is_active,
            is_deleted: row.is_deleted,
            deleted_date: row.deleted_date,
            created_date: row.created_date,
            updated_date: row.updated_date,
        })
    }
}

const SELECT_MACHINE: &str = r#"
    SELECT id, name, machine_type, status, utilization, last_maintenance, next_maintenance,
           notes, is_active, is_deleted, deleted_date, created_date, updated_date
    FROM machines
"#;

pub struct SqlxMachineRepository {
    pool: Arc<PgPool>,
}

impl SqlxMachineRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IMachineRepository for SqlxMachineRepository {
    async fn list_active(&self) -> Result<Vec<Machine>, ProductionError> {
        let sql = format!(
            "{} WHERE is_active AND NOT is_deleted ORDER BY id",
            SELECT_MACHINE
        );
        let rows = sqlx::query_as::<_, MachineRow>(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("listing machines", e))?;

        rows.into_iter().map(Machine::try_from).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<Option<Machine>, ProductionError> {
        let sql = format!("{} WHERE id = $1 AND NOT is_deleted", SELECT_MACHINE);
        let row = sqlx::query_as::<_, MachineRow>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("finding machine", e))?;

        row.map(Machine::try_from).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Machine>, ProductionError> {
        let sql = format!("{} WHERE name = $1 AND NOT is_deleted", SELECT_MACHINE);
        let row = sqlx::query_as::<_, MachineRow>(&sql)
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("finding machine by name", e))?;

        row.map(Machine::try_from).transpose()
    }

    #[tracing::instrument(skip(self, machine), fields(name = %machine.name))]
    async fn create(&self, machine: &NewMachine) -> Result<Machine, ProductionError> {
        let row = sqlx::query_as::<_, MachineRow>(
            r#"
            INSERT INTO machines (name, machine_type, status, utilization, last_maintenance,
                                  next_maintenance, notes, is_active, created_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING id, name, machine_type, status, utilization, last_maintenance,
                      next_maintenance, notes, is_active, is_deleted, deleted_date,
                      created_date, updated_date
            "#,
        )
        .bind(&machine.name)
        .bind(&machine.machine_type)
        .bind(machine.status.as_str())
        .bind(machine.utilization)
        .bind(machine.last_maintenance)
        .bind(machine.next_maintenance)
        .bind(&machine.notes)
        .bind(machine.is_active)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error()
                && db_err.is_unique_violation()
            {
                return ProductionError::DuplicateMachineName {
                    name: machine.name.clone(),
                };
            }
            db_error("creating machine", e)
        })?;

        Machine::try_from(row)
    }

    #[tracing::instrument(skip(self, machine), fields(machine_id = machine.id))]
    async fn update(&self, machine: &Machine) -> Result<(), ProductionError> {
        sqlx::query(
            r#"
            UPDATE machines
            SET machine_type = $2, status = $3, utilization = $4, last_maintenance = $5,
                next_maintenance = $6, notes = $7, is_active = $8, updated_date = $9
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(machine.id)
        .bind(&machine.machine_type)
        .bind(machine.status.as_str())
        .bind(machine.utilization)
        .bind(machine.last_maintenance)
        .bind(machine.next_maintenance)
        .bind(&machine.notes)
        .bind(machine.is_active)
        .bind(machine.updated_date)
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("updating machine", e))?;

        Ok(())
    }

    async fn count(&self) -> Result<i64, ProductionError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM machines")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| db_error("counting machines", e))
    }

    async fn current_jobs(&self) -> Result<HashMap<i32, String>, ProductionError> {
        let rows = sqlx::query_as::<_, (i32, String)>(
            r#"
            SELECT DISTINCT ON (machine_id) machine_id, job_name
            FROM production_jobs
            WHERE status = 'in-progress' AND NOT is_deleted
            ORDER BY machine_id, id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| db_error("loading current jobs", e))?;

        Ok(rows.into_iter().collect())
    }

    async fn clear(&self) -> Result<(), ProductionError> {
        sqlx::query("DELETE FROM machines")
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("clearing machines", e))?;
        Ok(())
    }
}
