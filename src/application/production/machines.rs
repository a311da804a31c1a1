//! Machine use cases

use chrono::Utc;
use std::sync::Arc;

use super::orders::round_one_decimal;
use crate::domain::production::{
    entities::{Machine, MachineStatusUpdate},
    errors::ProductionError,
    repositories::IMachineRepository,
    value_objects::MachineStatus,
};

/// A machine with the job it is currently running, if any
#[derive(Debug, Clone)]
pub struct MachineOverview {
    pub machine: Machine,
    pub current_job: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MachineStatistics {
    pub total_machines: i64,
    pub running_machines: i64,
    pub idle_machines: i64,
    pub maintenance_machines: i64,
    pub error_machines: i64,
    /// Mean utilization, one decimal
    pub average_utilization: f64,
}

impl MachineStatistics {
    pub fn compute(machines: &[Machine]) -> Self {
        let count =
            |status: MachineStatus| machines.iter().filter(|m| m.status == status).count() as i64;

        let average_utilization = if machines.is_empty() {
            0.0
        } else {
            let total: f64 = machines.iter().map(|m| f64::from(m.utilization)).sum();
            round_one_decimal(total / machines.len() as f64)
        };

        Self {
            total_machines: machines.len() as i64,
            running_machines: count(MachineStatus::Running),
            idle_machines: count(MachineStatus::Idle),
            maintenance_machines: count(MachineStatus::Maintenance),
            error_machines: count(MachineStatus::Error),
            average_utilization,
        }
    }
}

pub struct ListMachinesUseCase {
    machine_repository: Arc<dyn IMachineRepository>,
}

impl ListMachinesUseCase {
    pub fn new(machine_repository: Arc<dyn IMachineRepository>) -> Self {
        Self { machine_repository }
    }

    pub async fn execute(&self) -> Result<Vec<MachineOverview>, ProductionError> {
        let machines = self.machine_repository.list_active().await?;
        let mut current = self.machine_repository.current_jobs().await?;

        Ok(machines
            .into_iter()
            .map(|machine| MachineOverview {
                current_job: current.remove(&machine.id),
                machine,
            })
            .collect())
    }
}

pub struct GetMachineUseCase {
    machine_repository: Arc<dyn IMachineRepository>,
}

impl GetMachineUseCase {
    pub fn new(machine_repository: Arc<dyn IMachineRepository>) -> Self {
        Self { machine_repository }
    }

    /// Inactive machines are reported as missing
    pub async fn execute(&self, id: i32) -> Result<MachineOverview, ProductionError> {
        let machine = self
            .machine_repository
            .find_by_id(id)
            .await?
            .filter(Machine::is_available)
            .ok_or(ProductionError::MachineNotFound { id })?;
        let current_job = self.machine_repository.current_jobs().await?.remove(&id);

        Ok(MachineOverview {
            machine,
            current_job,
        })
    }
}

pub struct UpdateMachineStatusUseCase {
    machine_repository: Arc<dyn IMachineRepository>,
}

impl UpdateMachineStatusUseCase {
    pub fn new(machine_repository: Arc<dyn IMachineRepository>) -> Self {
        Self { machine_repository }
    }

    pub async fn execute(
        &self,
        id: i32,
        update: MachineStatusUpdate,
    ) -> Result<Machine, ProductionError> {
        update.validate().map_err(ProductionError::validation)?;

        let mut machine = self
            .machine_repository
            .find_by_id(id)
            .await?
            .filter(Machine::is_available)
            .ok_or(ProductionError::MachineNotFound { id })?;

        update.apply(&mut machine, Utc::now());
        self.machine_repository.update(&machine).await?;

        tracing::info!(
            machine_id = id,
            status = %machine.status,
            utilization = machine.utilization,
            "Machine status updated"
        );
        Ok(machine)
    }
}

pub struct GetMachineStatisticsUseCase {
    machine_repository: Arc<dyn IMachineRepository>,
}

impl GetMachineStatisticsUseCase {
    pub fn new(machine_repository: Arc<dyn IMachineRepository>) -> Self {
        Self { machine_repository }
    }

    pub async fn execute(&self) -> Result<MachineStatistics, ProductionError> {
        let machines = self.machine_repository.list_active().await?;
        Ok(MachineStatistics::compute(&machines))
    }
}
