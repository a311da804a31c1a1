//! Production job use cases: the persisted scheduling board of an order

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::production::{
    entities::{NewProductionJob, ProductionJob, ProductionJobChanges},
    errors::ProductionError,
    repositories::{IMachineRepository, IProductionJobRepository, IProductionOrderRepository},
    value_objects::JobStatus,
};

/// Fields accepted when adding a job to an order
#[derive(Debug, Clone)]
pub struct CreateJobInput {
    pub job_name: String,
    pub machine_id: i32,
    pub duration: f64,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub scheduled_end_time: Option<DateTime<Utc>>,
    pub operator: Option<String>,
    pub notes: Option<String>,
}

async fn require_order(
    orders: &dyn IProductionOrderRepository,
    order_id: i32,
) -> Result<(), ProductionError> {
    orders
        .find_by_id(order_id)
        .await?
        .map(|_| ())
        .ok_or(ProductionError::OrderNotFound { id: order_id })
}

async fn require_machine(
    machines: &dyn IMachineRepository,
    machine_id: i32,
) -> Result<(), ProductionError> {
    match machines.find_by_id(machine_id).await? {
        Some(machine) if machine.is_available() => Ok(()),
        _ => Err(ProductionError::UnknownMachine { id: machine_id }),
    }
}

pub struct ListOrderJobsUseCase {
    order_repository: Arc<dyn IProductionOrderRepository>,
    job_repository: Arc<dyn IProductionJobRepository>,
}

impl ListOrderJobsUseCase {
    pub fn new(
        order_repository: Arc<dyn IProductionOrderRepository>,
        job_repository: Arc<dyn IProductionJobRepository>,
    ) -> Self {
        Self {
            order_repository,
            job_repository,
        }
    }

    pub async fn execute(&self, order_id: i32) -> Result<Vec<ProductionJob>, ProductionError> {
        require_order(self.order_repository.as_ref(), order_id).await?;
        self.job_repository.list_for_order(order_id).await
    }
}

pub struct CreateProductionJobUseCase {
    order_repository: Arc<dyn IProductionOrderRepository>,
    machine_repository: Arc<dyn IMachineRepository>,
    job_repository: Arc<dyn IProductionJobRepository>,
}

impl CreateProductionJobUseCase {
    pub fn new(
        order_repository: Arc<dyn IProductionOrderRepository>,
        machine_repository: Arc<dyn IMachineRepository>,
        job_repository: Arc<dyn IProductionJobRepository>,
    ) -> Self {
        Self {
            order_repository,
            machine_repository,
            job_repository,
        }
    }

    /// Appends the job after the order's current last job
    pub async fn execute(
        &self,
        order_id: i32,
        input: CreateJobInput,
    ) -> Result<ProductionJob, ProductionError> {
        require_order(self.order_repository.as_ref(), order_id).await?;

        let mut new_job = NewProductionJob {
            production_order_id: order_id,
            job_name: input.job_name,
            machine_id: input.machine_id,
            duration: input.duration,
            status: JobStatus::Scheduled,
            scheduled_start_time: input.scheduled_start_time,
            scheduled_end_time: input.scheduled_end_time,
            operator: input.operator,
            notes: input.notes,
            sort_order: 0,
        };
        new_job.validate().map_err(ProductionError::validation)?;
        require_machine(self.machine_repository.as_ref(), new_job.machine_id).await?;

        new_job.sort_order = self.job_repository.next_sort_order(order_id).await?;
        let job = self.job_repository.create(&new_job).await?;

        tracing::info!(
            job_id = job.id,
            order_id,
            machine_id = job.machine_id,
            "Production job scheduled"
        );
        Ok(job)
    }
}

pub struct UpdateProductionJobUseCase {
    machine_repository: Arc<dyn IMachineRepository>,
    job_repository: Arc<dyn IProductionJobRepository>,
}

impl UpdateProductionJobUseCase {
    pub fn new(
        machine_repository: Arc<dyn IMachineRepository>,
        job_repository: Arc<dyn IProductionJobRepository>,
    ) -> Self {
        Self {
            machine_repository,
            job_repository,
        }
    }

    pub async fn execute(
        &self,
        id: i32,
        changes: ProductionJobChanges,
    ) -> Result<ProductionJob, ProductionError> {
        changes.validate().map_err(ProductionError::validation)?;

        let mut job = self
            .job_repository
            .find_by_id(id)
            .await?
            .ok_or(ProductionError::JobNotFound { id })?;

        if let Some(machine_id) = changes.machine_id
            && machine_id != job.machine_id
        {
            require_machine(self.machine_repository.as_ref(), machine_id).await?;
        }

        changes.apply(&mut job, Utc::now());
        if let (Some(start), Some(end)) = (job.scheduled_start_time, job.scheduled_end_time)
            && end < start
        {
            return Err(ProductionError::validation(vec![
                "ScheduledEndTime must not be before ScheduledStartTime".to_string(),
            ]));
        }

        self.job_repository.update(&job).await?;
        Ok(job)
    }
}

pub struct DeleteProductionJobUseCase {
    job_repository: Arc<dyn IProductionJobRepository>,
}

impl DeleteProductionJobUseCase {
    pub fn new(job_repository: Arc<dyn IProductionJobRepository>) -> Self {
        Self { job_repository }
    }

    pub async fn execute(&self, id: i32) -> Result<(), ProductionError> {
        if !self.job_repository.soft_delete(id, Utc::now()).await? {
            return Err(ProductionError::JobNotFound { id });
        }
        tracing::info!(job_id = id, "Production job deleted");
        Ok(())
    }
}

pub struct ReorderProductionJobsUseCase {
    order_repository: Arc<dyn IProductionOrderRepository>,
    job_repository: Arc<dyn IProductionJobRepository>,
}

impl ReorderProductionJobsUseCase {
    pub fn new(
        order_repository: Arc<dyn IProductionOrderRepository>,
        job_repository: Arc<dyn IProductionJobRepository>,
    ) -> Self {
        Self {
            order_repository,
            job_repository,
        }
    }

    /// `job_ids` must list every live job of the order exactly once
    pub async fn execute(&self, order_id: i32, job_ids: &[i32]) -> Result<(), ProductionError> {
        require_order(self.order_repository.as_ref(), order_id).await?;

        let current: HashSet<i32> = self
            .job_repository
            .list_for_order(order_id)
            .await?
            .iter()
            .map(|j| j.id)
            .collect();
        let requested: HashSet<i32> = job_ids.iter().copied().collect();

        if requested.len() != job_ids.len() {
            return Err(ProductionError::InvalidJobOrder {
                reason: "job ids must not repeat".to_string(),
            });
        }
        if requested != current {
            return Err(ProductionError::InvalidJobOrder {
                reason: format!(
                    "expected the {} jobs of order {}, got {}",
                    current.len(),
                    order_id,
                    job_ids.len()
                ),
            });
        }

        self.job_repository.reorder(order_id, job_ids).await?;
        tracing::info!(order_id, jobs = job_ids.len(), "Production jobs reordered");
        Ok(())
    }
}
