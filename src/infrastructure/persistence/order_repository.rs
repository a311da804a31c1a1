//! SQLx implementation of the production order repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::{db_error, parse_column};
use crate::domain::production::{
    entities::{NewProductionOrder, ProductionOrder},
    errors::ProductionError,
    repositories::IProductionOrderRepository,
    value_objects::OrderNumber,
};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    customer_name: String,
    product_name: String,
    quantity: i32,
    due_date: DateTime<Utc>,
    priority: String,
    status: String,
    progress: i32,
    estimated_hours: f64,
    assigned_machine: Option<String>,
    notes: Option<String>,
    created_date: DateTime<Utc>,
    start_date: Option<DateTime<Utc>>,
    completed_date: Option<DateTime<Utc>>,
    created_by: Option<String>,
    is_deleted: bool,
    deleted_date: Option<DateTime<Utc>>,
    updated_date: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for ProductionOrder {
    type Error = ProductionError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(ProductionOrder {
            id: row.id,
            order_number: OrderNumber::new(row.order_number)
                .map_err(ProductionError::database)?,
            customer_name: row.customer_name,
            product_name: row.product_name,
            quantity: row.quantity,
            due_date: row.due_date,
            priority: parse_column("production_orders.priority", &row.priority)?,
            status: parse_column("production_orders.status", &row.status)?,
            progress: row.progress,
            estimated_hours: row.estimated_hours,
            assigned_machine: row.assigned_machine,
            notes: row.notes,
            created_date: row.created_date,
            start_date: row.start_date,
            completed_date: row.completed_date,
            created_by: row.created_by,
            is_deleted: row.is_deleted,
            deleted_date: row.deleted_date,
            updated_date: row.updated_date,
        })
    }
}

const ORDER_COLUMNS: &str = r#"
    id, order_number, customer_name, product_name, quantity, due_date, priority, status,
    progress, estimated_hours, assigned_machine, notes, created_date, start_date,
    completed_date, created_by, is_deleted, deleted_date, updated_date
"#;

pub struct SqlxProductionOrderRepository {
    pool: Arc<PgPool>,
}

impl SqlxProductionOrderRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IProductionOrderRepository for SqlxProductionOrderRepository {
    async fn list(&self) -> Result<Vec<ProductionOrder>, ProductionError> {
        let sql = format!(
            "SELECT {} FROM production_orders WHERE NOT is_deleted ORDER BY created_date DESC, id DESC",
            ORDER_COLUMNS
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("listing production orders", e))?;

        rows.into_iter().map(ProductionOrder::try_from).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<Option<ProductionOrder>, ProductionError> {
        let sql = format!(
            "SELECT {} FROM production_orders WHERE id = $1 AND NOT is_deleted",
            ORDER_COLUMNS
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("finding production order", e))?;

        row.map(ProductionOrder::try_from).transpose()
    }

    async fn find_by_order_number(
        &self,
        order_number: &OrderNumber,
    ) -> Result<Option<ProductionOrder>, ProductionError> {
        let sql = format!(
            "SELECT {} FROM production_orders WHERE order_number = $1 AND NOT is_deleted",
            ORDER_COLUMNS
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order_number.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("finding production order by number", e))?;

        row.map(ProductionOrder::try_from).transpose()
    }

    async fn count_all(&self) -> Result<i64, ProductionError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM production_orders")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| db_error("counting production orders", e))
    }

    #[tracing::instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn create(&self, order: &NewProductionOrder) -> Result<ProductionOrder, ProductionError> {
        let sql = format!(
            r#"
            INSERT INTO production_orders (order_number, customer_name, product_name, quantity,
                                           due_date, priority, status, progress, estimated_hours,
                                           notes, created_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $9, $10, $11)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order.order_number.as_str())
            .bind(&order.customer_name)
            .bind(&order.product_name)
            .bind(order.quantity)
            .bind(order.due_date)
            .bind(order.priority.as_str())
            .bind(order.status.as_str())
            .bind(order.estimated_hours)
            .bind(&order.notes)
            .bind(order.created_date)
            .bind(&order.created_by)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error()
                    && db_err.is_unique_violation()
                {
                    return ProductionError::DuplicateOrderNumber {
                        order_number: order.order_number.to_string(),
                    };
                }
                db_error("creating production order", e)
            })?;

        ProductionOrder::try_from(row)
    }

    #[tracing::instrument(skip(self, order), fields(order_id = order.id))]
    async fn update(&self, order: &ProductionOrder) -> Result<(), ProductionError> {
        sqlx::query(
            r#"
            UPDATE production_orders
            SET customer_name = $2, product_name = $3, quantity = $4, due_date = $5,
                priority = $6, status = $7, progress = $8, estimated_hours = $9,
                assigned_machine = $10, notes = $11, start_date = $12, completed_date = $13,
                updated_date = $14
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(order.id)
        .bind(&order.customer_name)
        .bind(&order.product_name)
        .bind(order.quantity)
        .bind(order.due_date)
        .bind(order.priority.as_str())
        .bind(order.status.as_str())
        .bind(order.progress)
        .bind(order.estimated_hours)
        .bind(&order.assigned_machine)
        .bind(&order.notes)
        .bind(order.start_date)
        .bind(order.completed_date)
        .bind(order.updated_date)
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("updating production order", e))?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn soft_delete(&self, id: i32, at: DateTime<Utc>) -> Result<bool, ProductionError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("starting transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE production_orders
            SET is_deleted = TRUE, deleted_date = $2, updated_date = $2
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("deleting production order", e))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE production_jobs
            SET is_deleted = TRUE, deleted_date = $2, updated_date = $2
            WHERE production_order_id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("deleting production jobs", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("committing order delete", e))?;

        Ok(true)
    }

    async fn clear(&self) -> Result<(), ProductionError> {
        sqlx::query("DELETE FROM production_orders")
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("clearing production orders", e))?;
        Ok(())
    }
}
