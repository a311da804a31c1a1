//! Production scheduling repository traits

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entities::{
    Machine, NewMachine, NewProductionJob, NewProductionOrder, ProductionJob, ProductionOrder,
};
use super::errors::ProductionError;
use super::value_objects::OrderNumber;

#[async_trait]
pub trait IMachineRepository: Send + Sync {
    /// Active, non-deleted machines ordered by id
    async fn list_active(&self) -> Result<Vec<Machine>, ProductionError>;

    /// Any non-deleted machine, active or not
    async fn find_by_id(&self, id: i32) -> Result<Option<Machine>, ProductionError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Machine>, ProductionError>;

    async fn create(&self, machine: &NewMachine) -> Result<Machine, ProductionError>;

    async fn update(&self, machine: &Machine) -> Result<(), ProductionError>;

    /// Number of rows, deleted ones included
    async fn count(&self) -> Result<i64, ProductionError>;

    /// Name of the first in-progress job per machine, keyed by machine id
    async fn current_jobs(&self) -> Result<HashMap<i32, String>, ProductionError>;

    /// Remove every machine row. Jobs must be cleared first.
    async fn clear(&self) -> Result<(), ProductionError>;
}

#[async_trait]
pub trait IProductionOrderRepository: Send + Sync {
    /// Non-deleted orders, newest first
    async fn list(&self) -> Result<Vec<ProductionOrder>, ProductionError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<ProductionOrder>, ProductionError>;

    async fn find_by_order_number(
        &self,
        order_number: &OrderNumber,
    ) -> Result<Option<ProductionOrder>, ProductionError>;

    /// Number of rows, deleted ones included. Drives order numbering.
    async fn count_all(&self) -> Result<i64, ProductionError>;

    /// Insert an order. Returns `DuplicateOrderNumber` when the number is taken.
    async fn create(&self, order: &NewProductionOrder) -> Result<ProductionOrder, ProductionError>;

    async fn update(&self, order: &ProductionOrder) -> Result<(), ProductionError>;

    /// Soft delete the order and its jobs. Returns false when no live order matched.
    async fn soft_delete(&self, id: i32, at: DateTime<Utc>) -> Result<bool, ProductionError>;

    async fn clear(&self) -> Result<(), ProductionError>;
}

#[async_trait]
pub trait IProductionJobRepository: Send + Sync {
    /// Non-deleted jobs of one order by sort order, machine name joined
    async fn list_for_order(&self, order_id: i32) -> Result<Vec<ProductionJob>, ProductionError>;

    /// Same as `list_for_order` for many orders at once
    async fn list_for_orders(
        &self,
        order_ids: &[i32],
    ) -> Result<Vec<ProductionJob>, ProductionError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<ProductionJob>, ProductionError>;

    async fn create(&self, job: &NewProductionJob) -> Result<ProductionJob, ProductionError>;

    async fn update(&self, job: &ProductionJob) -> Result<(), ProductionError>;

    async fn soft_delete(&self, id: i32, at: DateTime<Utc>) -> Result<bool, ProductionError>;

    /// Assign `sort_order = position` for each id, atomically
    async fn reorder(&self, order_id: i32, job_ids: &[i32]) -> Result<(), ProductionError>;

    /// Sort order for a job appended to the end of the order's list
    async fn next_sort_order(&self, order_id: i32) -> Result<i32, ProductionError>;

    async fn count(&self) -> Result<i64, ProductionError>;

    async fn clear(&self) -> Result<(), ProductionError>;
}
