//! In-memory repositories
//!
//! Back the `Testing` environment and the router tests. The three scheduling
//! repositories share one [`InMemoryScheduleStore`] so joins, cascades and
//! the machine foreign key behave like the relational schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::auth::{
    entities::User,
    errors::AuthError,
    repositories::IUserRepository,
    value_objects::{Email, UserId},
};
use crate::domain::production::{
    entities::{
        Machine, NewMachine, NewProductionJob, NewProductionOrder, ProductionJob, ProductionOrder,
    },
    errors::ProductionError,
    repositories::{IMachineRepository, IProductionJobRepository, IProductionOrderRepository},
    value_objects::{JobStatus, OrderNumber},
};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IUserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let wanted = username.trim();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username.as_str().eq_ignore_ascii_case(wanted))
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, AuthError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.as_str().eq_ignore_ascii_case(email.as_str()))
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), AuthError> {
        let mut users = self.users.write().await;
        let taken = users.values().any(|u| {
            u.username
                .as_str()
                .eq_ignore_ascii_case(user.username.as_str())
                || u.email.as_str().eq_ignore_ascii_case(user.email.as_str())
        });
        if taken || users.contains_key(&user.user_id) {
            return Err(AuthError::UserAlreadyExists);
        }
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn update_last_login(&self, user_id: &UserId, at: DateTime<Utc>) -> Result<(), AuthError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(user_id).ok_or(AuthError::UserNotFound)?;
        user.last_login_at = Some(at);
        user.updated_at = at;
        Ok(())
    }
}

#[derive(Default)]
struct ScheduleTables {
    machines: Vec<Machine>,
    orders: Vec<ProductionOrder>,
    jobs: Vec<ProductionJob>,
    next_machine_id: i32,
    next_order_id: i32,
    next_job_id: i32,
}

impl ScheduleTables {
    fn machine_name(&self, machine_id: i32) -> String {
        self.machines
            .iter()
            .find(|m| m.id == machine_id)
            .map(|m| m.name.clone())
            .unwrap_or_default()
    }

    /// Jobs as a join would return them, with the current machine name
    fn joined(&self, job: &ProductionJob) -> ProductionJob {
        ProductionJob {
            machine_name: self.machine_name(job.machine_id),
            ..job.clone()
        }
    }
}

/// Shared tables for the in-memory scheduling repositories
#[derive(Default, Clone)]
pub struct InMemoryScheduleStore {
    tables: Arc<RwLock<ScheduleTables>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn machines(&self) -> InMemoryMachineRepository {
        InMemoryMachineRepository {
            store: self.clone(),
        }
    }

    pub fn orders(&self) -> InMemoryProductionOrderRepository {
        InMemoryProductionOrderRepository {
            store: self.clone(),
        }
    }

    pub fn jobs(&self) -> InMemoryProductionJobRepository {
        InMemoryProductionJobRepository {
            store: self.clone(),
        }
    }
}

pub struct InMemoryMachineRepository {
    store: InMemoryScheduleStore,
}

#[async_trait]
impl IMachineRepository for InMemoryMachineRepository {
    async fn list_active(&self) -> Result<Vec<Machine>, ProductionError> {
        let tables = self.store.tables.read().await;
        let mut machines: Vec<Machine> = tables
            .machines
            .iter()
            .filter(|m| m.is_available())
            .cloned()
            .collect();
        machines.sort_by_key(|m| m.id);
        Ok(machines)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Machine>, ProductionError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .machines
            .iter()
            .find(|m| m.id == id && !m.is_deleted)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Machine>, ProductionError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .machines
            .iter()
            .find(|m| m.name == name && !m.is_deleted)
            .cloned())
    }

    async fn create(&self, machine: &NewMachine) -> Result<Machine, ProductionError> {
        let mut tables = self.store.tables.write().await;
        if tables.machines.iter().any(|m| m.name == machine.name) {
            return Err(ProductionError::DuplicateMachineName {
                name: machine.name.clone(),
            });
        }

        tables.next_machine_id += 1;
        let created = Machine {
            id: tables.next_machine_id,
            name: machine.name.clone(),
            machine_type: machine.machine_type.clone(),
            status: machine.status,
            utilization: machine.utilization,
            last_maintenance: machine.last_maintenance,
            next_maintenance: machine.next_maintenance,
            notes: machine.notes.clone(),
            is_active: machine.is_active,
            is_deleted: false,
            deleted_date: None,
            created_date: Utc::now(),
            updated_date: None,
        };
        tables.machines.push(created.clone());
        Ok(created)
    }

    async fn update(&self, machine: &Machine) -> Result<(), ProductionError> {
        let mut tables = self.store.tables.write().await;
        if let Some(stored) = tables
            .machines
            .iter_mut()
            .find(|m| m.id == machine.id && !m.is_deleted)
        {
            *stored = machine.clone();
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, ProductionError> {
        Ok(self.store.tables.read().await.machines.len() as i64)
    }

    async fn current_jobs(&self) -> Result<HashMap<i32, String>, ProductionError> {
        let tables = self.store.tables.read().await;
        let mut current = HashMap::new();
        for job in tables
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::InProgress && !j.is_deleted)
        {
            current
                .entry(job.machine_id)
                .or_insert_with(|| job.job_name.clone());
        }
        Ok(current)
    }

    async fn clear(&self) -> Result<(), ProductionError> {
        let mut tables = self.store.tables.write().await;
        if !tables.jobs.is_empty() {
            return Err(ProductionError::database(
                "Machines are still referenced by production jobs",
            ));
        }
        tables.machines.clear();
        Ok(())
    }
}

pub struct InMemoryProductionOrderRepository {
    store: InMemoryScheduleStore,
}

#[async_trait]
impl IProductionOrderRepository for InMemoryProductionOrderRepository {
    async fn list(&self) -> Result<Vec<ProductionOrder>, ProductionError> {
        let tables = self.store.tables.read().await;
        let mut orders: Vec<ProductionOrder> = tables
            .orders
            .iter()
            .filter(|o| !o.is_deleted)
            .cloned()
            .collect();
        orders.sort_by(|a, b| {
            b.created_date
                .cmp(&a.created_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(orders)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ProductionOrder>, ProductionError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .find(|o| o.id == id && !o.is_deleted)
            .cloned())
    }

    async fn find_by_order_number(
        &self,
        order_number: &OrderNumber,
    ) -> Result<Option<ProductionOrder>, ProductionError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .find(|o| &o.order_number == order_number && !o.is_deleted)
            .cloned())
    }

    async fn count_all(&self) -> Result<i64, ProductionError> {
        Ok(self.store.tables.read().await.orders.len() as i64)
    }

    async fn create(&self, order: &NewProductionOrder) -> Result<ProductionOrder, ProductionError> {
        let mut tables = self.store.tables.write().await;
        if tables
            .orders
            .iter()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(ProductionError::DuplicateOrderNumber {
                order_number: order.order_number.to_string(),
            });
        }

        tables.next_order_id += 1;
        let created = ProductionOrder {
            id: tables.next_order_id,
            order_number: order.order_number.clone(),
            customer_name: order.customer_name.clone(),
            product_name: order.product_name.clone(),
            quantity: order.quantity,
            due_date: order.due_date,
            priority: order.priority,
            status: order.status,
            progress: 0,
            estimated_hours: order.estimated_hours,
            assigned_machine: None,
            notes: order.notes.clone(),
            created_date: order.created_date,
            start_date: None,
            completed_date: None,
            created_by: order.created_by.clone(),
            is_deleted: false,
            deleted_date: None,
            updated_date: None,
        };
        tables.orders.push(created.clone());
        Ok(created)
    }

    async fn update(&self, order: &ProductionOrder) -> Result<(), ProductionError> {
        let mut tables = self.store.tables.write().await;
        if let Some(stored) = tables
            .orders
            .iter_mut()
            .find(|o| o.id == order.id && !o.is_deleted)
        {
            *stored = order.clone();
        }
        Ok(())
    }

    async fn soft_delete(&self, id: i32, at: DateTime<Utc>) -> Result<bool, ProductionError> {
        let mut tables = self.store.tables.write().await;
        let Some(order) = tables
            .orders
            .iter_mut()
            .find(|o| o.id == id && !o.is_deleted)
        else {
            return Ok(false);
        };

        order.is_deleted = true;
        order.deleted_date = Some(at);
        order.updated_date = Some(at);

        for job in tables
            .jobs
            .iter_mut()
            .filter(|j| j.production_order_id == id && !j.is_deleted)
        {
            job.is_deleted = true;
            job.deleted_date = Some(at);
            job.updated_date = Some(at);
        }
        Ok(true)
    }

    async fn clear(&self) -> Result<(), ProductionError> {
        let mut tables = self.store.tables.write().await;
        tables.orders.clear();
        tables.jobs.clear();
        Ok(())
    }
}

pub struct InMemoryProductionJobRepository {
    store: InMemoryScheduleStore,
}

#[async_trait]
impl IProductionJobRepository for InMemoryProductionJobRepository {
    async fn list_for_order(&self, order_id: i32) -> Result<Vec<ProductionJob>, ProductionError> {
        self.list_for_orders(&[order_id]).await
    }

    async fn list_for_orders(
        &self,
        order_ids: &[i32],
    ) -> Result<Vec<ProductionJob>, ProductionError> {
        let tables = self.store.tables.read().await;
        let mut jobs: Vec<ProductionJob> = tables
            .jobs
            .iter()
            .filter(|j| order_ids.contains(&j.production_order_id) && !j.is_deleted)
            .map(|j| tables.joined(j))
            .collect();
        jobs.sort_by_key(|j| (j.production_order_id, j.sort_order, j.id));
        Ok(jobs)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ProductionJob>, ProductionError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .jobs
            .iter()
            .find(|j| j.id == id && !j.is_deleted)
            .map(|j| tables.joined(j)))
    }

    async fn create(&self, job: &NewProductionJob) -> Result<ProductionJob, ProductionError> {
        let mut tables = self.store.tables.write().await;
        if !tables.machines.iter().any(|m| m.id == job.machine_id) {
            return Err(ProductionError::UnknownMachine { id: job.machine_id });
        }
        if !tables
            .orders
            .iter()
            .any(|o| o.id == job.production_order_id)
        {
            return Err(ProductionError::OrderNotFound {
                id: job.production_order_id,
            });
        }

        tables.next_job_id += 1;
        let created = ProductionJob {
            id: tables.next_job_id,
            production_order_id: job.production_order_id,
            job_name: job.job_name.clone(),
            machine_id: job.machine_id,
            machine_name: tables.machine_name(job.machine_id),
            duration: job.duration,
            status: job.status,
            scheduled_start_time: job.scheduled_start_time,
            scheduled_end_time: job.scheduled_end_time,
            actual_start_time: None,
            actual_end_time: None,
            operator: job.operator.clone(),
            notes: job.notes.clone(),
            sort_order: job.sort_order,
            is_deleted: false,
            deleted_date: None,
            created_date: Utc::now(),
            updated_date: None,
        };
        tables.jobs.push(created.clone());
        Ok(created)
    }

    async fn update(&self, job: &ProductionJob) -> Result<(), ProductionError> {
        let mut tables = self.store.tables.write().await;
        if let Some(stored) = tables
            .jobs
            .iter_mut()
            .find(|j| j.id == job.id && !j.is_deleted)
        {
            *stored = job.clone();
        }
        Ok(())
    }

    async fn soft_delete(&self, id: i32, at: DateTime<Utc>) -> Result<bool, ProductionError> {
        let mut tables = self.store.tables.write().await;
        let Some(job) = tables.jobs.iter_mut().find(|j| j.id == id && !j.is_deleted) else {
            return Ok(false);
        };
        job.is_deleted = true;
        job.deleted_date = Some(at);
        job.updated_date = Some(at);
        Ok(true)
    }

    async fn reorder(&self, order_id: i32, job_ids: &[i32]) -> Result<(), ProductionError> {
        let mut tables = self.store.tables.write().await;
        let now = Utc::now();
        for (position, job_id) in job_ids.iter().enumerate() {
            if let Some(job) = tables.jobs.iter_mut().find(|j| {
                j.id == *job_id && j.production_order_id == order_id && !j.is_deleted
            }) {
                job.sort_order = position as i32;
                job.updated_date = Some(now);
            }
        }
        Ok(())
    }

    async fn next_sort_order(&self, order_id: i32) -> Result<i32, ProductionError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .jobs
            .iter()
            .filter(|j| j.production_order_id == order_id && !j.is_deleted)
            .map(|j| j.sort_order + 1)
            .max()
            .unwrap_or(0))
    }

    async fn count(&self) -> Result<i64, ProductionError> {
        Ok(self.store.tables.read().await.jobs.len() as i64)
    }

    async fn clear(&self) -> Result<(), ProductionError> {
        self.store.tables.write().await.jobs.clear();
        Ok(())
    }
}
