//! Production order use cases

use chrono::{DateTime, Datelike, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::production::{
    entities::{NewProductionOrder, ProductionJob, ProductionOrder, ProductionOrderChanges},
    errors::ProductionError,
    repositories::{IProductionJobRepository, IProductionOrderRepository},
    value_objects::{OrderNumber, OrderStatus, Priority},
};

/// Fallback `created_by` when the request carries no username
pub const SYSTEM_USER: &str = "System";

/// Tries at successive sequence numbers before giving up on a new order number
const ORDER_NUMBER_ATTEMPTS: i64 = 5;

/// An order together with its live jobs in board order
#[derive(Debug, Clone)]
pub struct ProductionOrderDetails {
    pub order: ProductionOrder,
    pub jobs: Vec<ProductionJob>,
}

/// Fields accepted when creating an order
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i32,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub estimated_hours: f64,
    pub notes: Option<String>,
}

/// Aggregate counters over live orders
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStatistics {
    pub total_orders: i64,
    pub active_orders: i64,
    pub completed_orders: i64,
    pub pending_orders: i64,
    pub delayed_orders: i64,
    pub completed_today: i64,
    /// Mean progress of in-progress orders, one decimal
    pub efficiency: f64,
}

impl OrderStatistics {
    pub fn compute(orders: &[ProductionOrder], now: DateTime<Utc>) -> Self {
        let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count() as i64;

        let today = now.date_naive();
        let completed_today = orders
            .iter()
            .filter(|o| {
                o.status == OrderStatus::Completed
                    && o.completed_date.is_some_and(|d| d.date_naive() == today)
            })
            .count() as i64;

        let in_progress: Vec<i32> = orders
            .iter()
            .filter(|o| o.status == OrderStatus::InProgress)
            .map(|o| o.progress)
            .collect();
        let efficiency = if in_progress.is_empty() {
            0.0
        } else {
            let mean = in_progress.iter().map(|p| f64::from(*p)).sum::<f64>()
                / in_progress.len() as f64;
            round_one_decimal(mean)
        };

        Self {
            total_orders: orders.len() as i64,
            active_orders: count(OrderStatus::InProgress),
            completed_orders: count(OrderStatus::Completed),
            pending_orders: count(OrderStatus::Pending),
            delayed_orders: count(OrderStatus::Delayed),
            completed_today,
            efficiency,
        }
    }
}

/// One decimal, halves to even
pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Use case for listing orders with their jobs
pub struct ListProductionOrdersUseCase {
    order_repository: Arc<dyn IProductionOrderRepository>,
    job_repository: Arc<dyn IProductionJobRepository>,
}

impl ListProductionOrdersUseCase {
    pub fn new(
        order_repository: Arc<dyn IProductionOrderRepository>,
        job_repository: Arc<dyn IProductionJobRepository>,
    ) -> Self {
        Self {
            order_repository,
            job_repository,
        }
    }

    pub async fn execute(&self) -> Result<Vec<ProductionOrderDetails>, ProductionError> {
        let orders = self.order_repository.list().await?;
        let ids: Vec<i32> = orders.iter().map(|o| o.id).collect();

        let mut jobs_by_order: HashMap<i32, Vec<ProductionJob>> = HashMap::new();
        for job in self.job_repository.list_for_orders(&ids).await? {
            jobs_by_order
                .entry(job.production_order_id)
                .or_default()
                .push(job);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let jobs = jobs_by_order.remove(&order.id).unwrap_or_default();
                ProductionOrderDetails { order, jobs }
            })
            .collect())
    }
}

/// Use case for fetching one order with its jobs
pub struct GetProductionOrderUseCase {
    order_repository: Arc<dyn IProductionOrderRepository>,
    job_repository: Arc<dyn IProductionJobRepository>,
}

impl GetProductionOrderUseCase {
    pub fn new(
        order_repository: Arc<dyn IProductionOrderRepository>,
        job_repository: Arc<dyn IProductionJobRepository>,
    ) -> Self {
        Self {
            order_repository,
            job_repository,
        }
    }

    pub async fn execute(&self, id: i32) -> Result<ProductionOrderDetails, ProductionError> {
        let order = self
            .order_repository
            .find_by_id(id)
            .await?
            .ok_or(ProductionError::OrderNotFound { id })?;
        let jobs = self.job_repository.list_for_order(id).await?;

        Ok(ProductionOrderDetails { order, jobs })
    }
}

/// Use case for creating an order with the next `PO-{year}-{seq}` number
pub struct CreateProductionOrderUseCase {
    order_repository: Arc<dyn IProductionOrderRepository>,
}

impl CreateProductionOrderUseCase {
    pub fn new(order_repository: Arc<dyn IProductionOrderRepository>) -> Self {
        Self { order_repository }
    }

    pub async fn execute(
        &self,
        input: CreateOrderInput,
        created_by: Option<String>,
    ) -> Result<ProductionOrder, ProductionError> {
        let now = Utc::now();
        let created_by = created_by
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| SYSTEM_USER.to_string());

        let mut new_order = NewProductionOrder {
            order_number: OrderNumber::for_sequence(now.year(), 1),
            customer_name: input.customer_name,
            product_name: input.product_name,
            quantity: input.quantity,
            due_date: input.due_date,
            priority: input.priority,
            status: OrderStatus::Pending,
            estimated_hours: input.estimated_hours,
            notes: input.notes,
            created_date: now,
            created_by: Some(created_by),
        };
        new_order.validate().map_err(ProductionError::validation)?;

        let first = self.order_repository.count_all().await? + 1;
        for sequence in first..first + ORDER_NUMBER_ATTEMPTS {
            new_order.order_number = OrderNumber::for_sequence(now.year(), sequence);
            match self.order_repository.create(&new_order).await {
                Ok(order) => {
                    tracing::info!(
                        order_id = order.id,
                        order_number = %order.order_number,
                        "Production order created"
                    );
                    return Ok(order);
                }
                Err(ProductionError::DuplicateOrderNumber { order_number }) => {
                    tracing::warn!(order_number = %order_number, "Order number taken, trying next");
                }
                Err(e) => return Err(e),
            }
        }

        Err(ProductionError::DuplicateOrderNumber {
            order_number: new_order.order_number.to_string(),
        })
    }
}

/// Use case for partial order updates
pub struct UpdateProductionOrderUseCase {
    order_repository: Arc<dyn IProductionOrderRepository>,
}

impl UpdateProductionOrderUseCase {
    pub fn new(order_repository: Arc<dyn IProductionOrderRepository>) -> Self {
        Self { order_repository }
    }

    pub async fn execute(
        &self,
        id: i32,
        changes: ProductionOrderChanges,
    ) -> Result<ProductionOrder, ProductionError> {
        changes.validate().map_err(ProductionError::validation)?;

        let mut order = self
            .order_repository
            .find_by_id(id)
            .await?
            .ok_or(ProductionError::OrderNotFound { id })?;

        let previous = order.status;
        changes.apply(&mut order, Utc::now());
        self.order_repository.update(&order).await?;

        if previous != order.status {
            tracing::info!(
                order_id = id,
                from = %previous,
                to = %order.status,
                "Production order status changed"
            );
        }
        Ok(order)
    }
}

/// Use case for soft-deleting an order and its jobs
pub struct DeleteProductionOrderUseCase {
    order_repository: Arc<dyn IProductionOrderRepository>,
}

impl DeleteProductionOrderUseCase {
    pub fn new(order_repository: Arc<dyn IProductionOrderRepository>) -> Self {
        Self { order_repository }
    }

    pub async fn execute(&self, id: i32) -> Result<(), ProductionError> {
        if !self.order_repository.soft_delete(id, Utc::now()).await? {
            return Err(ProductionError::OrderNotFound { id });
        }
        tracing::info!(order_id = id, "Production order deleted");
        Ok(())
    }
}

/// Use case for the order dashboard counters
pub struct GetOrderStatisticsUseCase {
    order_repository: Arc<dyn IProductionOrderRepository>,
}

impl GetOrderStatisticsUseCase {
    pub fn new(order_repository: Arc<dyn IProductionOrderRepository>) -> Self {
        Self { order_repository }
    }

    pub async fn execute(&self) -> Result<OrderStatistics, ProductionError> {
        let orders = self.order_repository.list().await?;
        Ok(OrderStatistics::compute(&orders, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::InMemoryScheduleStore;
    use chrono::Duration;

    fn input() -> CreateOrderInput {
        CreateOrderInput {
            customer_name: "AutoCorp Manufacturing".to_string(),
            product_name: "Premium All-Season Tire 205/55R16".to_string(),
            quantity: 1000,
            due_date: Utc::now() + Duration::days(7),
            priority: Priority::High,
            estimated_hours: 48.5,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_order_numbers_follow_row_count() {
        let store = InMemoryScheduleStore::new();
        let repo: Arc<dyn IProductionOrderRepository> = Arc::new(store.orders());
        let create = CreateProductionOrderUseCase::new(repo.clone());
        let year = Utc::now().year();

        let first = create.execute(input(), None).await.unwrap();
        assert_eq!(first.order_number.as_str(), format!("PO-{}-001", year));
        assert_eq!(first.created_by.as_deref(), Some("System"));
        assert_eq!(first.status, OrderStatus::Pending);

        // Deleted orders still count toward numbering
        DeleteProductionOrderUseCase::new(repo.clone())
            .execute(first.id)
            .await
            .unwrap();
        let second = create
            .execute(input(), Some("planner".to_string()))
            .await
            .unwrap();
        assert_eq!(second.order_number.as_str(), format!("PO-{}-002", year));
        assert_eq!(second.created_by.as_deref(), Some("planner"));
    }

    #[tokio::test]
    async fn test_number_collision_moves_to_next_sequence() {
        let store = InMemoryScheduleStore::new();
        let repo: Arc<dyn IProductionOrderRepository> = Arc::new(store.orders());
        let year = Utc::now().year();

        // A seeded row occupies the number the count would produce next
        let taken = NewProductionOrder {
            order_number: OrderNumber::for_sequence(year, 2),
            customer_name: "Seed".to_string(),
            product_name: "Seed".to_string(),
            quantity: 1,
            due_date: Utc::now(),
            priority: Priority::Low,
            status: OrderStatus::Pending,
            estimated_hours: 1.0,
            notes: None,
            created_date: Utc::now(),
            created_by: None,
        };
        repo.create(&taken).await.unwrap();

        let order = CreateProductionOrderUseCase::new(repo)
            .execute(input(), None)
            .await
            .unwrap();
        assert_eq!(order.order_number.as_str(), format!("PO-{}-003", year));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let store = InMemoryScheduleStore::new();
        let create = CreateProductionOrderUseCase::new(Arc::new(store.orders()));
        let err = create
            .execute(
                CreateOrderInput {
                    quantity: 0,
                    ..input()
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProductionError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_order_is_not_found() {
        let store = InMemoryScheduleStore::new();
        let update = UpdateProductionOrderUseCase::new(Arc::new(store.orders()));
        let err = update
            .execute(42, ProductionOrderChanges::default())
            .await
            .unwrap_err();
        assert_eq!(err, ProductionError::OrderNotFound { id: 42 });
    }

    #[test]
    fn test_statistics() {
        let now = Utc::now();
        let base = ProductionOrder {
            id: 0,
            order_number: OrderNumber::for_sequence(2025, 1),
            customer_name: "c".to_string(),
            product_name: "p".to_string(),
            quantity: 1,
            due_date: now,
            priority: Priority::Medium,
            status: OrderStatus::Pending,
            progress: 0,
            estimated_hours: 1.0,
            assigned_machine: None,
            notes: None,
            created_date: now,
            start_date: None,
            completed_date: None,
            created_by: None,
            is_deleted: false,
            deleted_date: None,
            updated_date: None,
        };
        let orders = vec![
            ProductionOrder {
                status: OrderStatus::InProgress,
                progress: 40,
                ..base.clone()
            },
            ProductionOrder {
                status: OrderStatus::InProgress,
                progress: 45,
                ..base.clone()
            },
            ProductionOrder {
                status: OrderStatus::InProgress,
                progress: 50,
                ..base.clone()
            },
            ProductionOrder {
                status: OrderStatus::Completed,
                completed_date: Some(now),
                progress: 100,
                ..base.clone()
            },
            ProductionOrder {
                status: OrderStatus::Completed,
                completed_date: Some(now - Duration::days(2)),
                progress: 100,
                ..base.clone()
            },
            ProductionOrder {
                status: OrderStatus::Delayed,
                ..base.clone()
            },
            base.clone(),
        ];

        let stats = OrderStatistics::compute(&orders, now);
        assert_eq!(stats.total_orders, 7);
        assert_eq!(stats.active_orders, 3);
        assert_eq!(stats.completed_orders, 2);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.delayed_orders, 1);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.efficiency, 45.0);

        assert_eq!(OrderStatistics::compute(&[], now).efficiency, 0.0);
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(33.333), 33.3);
        assert_eq!(round_one_decimal(66.666), 66.7);
        assert_eq!(round_one_decimal(45.25), 45.2);
        assert_eq!(round_one_decimal(45.75), 45.8);
    }

    #[test]
    fn test_efficiency_midpoint_rounds_to_even() {
        let now = Utc::now();
        let order = |progress| ProductionOrder {
            id: 0,
            order_number: OrderNumber::for_sequence(2025, 1),
            customer_name: "c".to_string(),
            product_name: "p".to_string(),
            quantity: 1,
            due_date: now,
            priority: Priority::Medium,
            status: OrderStatus::InProgress,
            progress,
            estimated_hours: 1.0,
            assigned_machine: None,
            notes: None,
            created_date: now,
            start_date: None,
            completed_date: None,
            created_by: None,
            is_deleted: false,
            deleted_date: None,
            updated_date: None,
        };
        let orders = vec![order(45), order(45), order(45), order(46)];

        assert_eq!(OrderStatistics::compute(&orders, now).efficiency, 45.2);
    }
}
