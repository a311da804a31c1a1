//! Production scheduling DTOs
//!
//! Field names are camelCase to match the dashboard client. Enum values
//! travel as their kebab-case names and are parsed leniently on input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::application::production::{
    CreateJobInput, CreateOrderInput, MachineOverview, MachineStatistics, OrderStatistics,
    ProductionOrderDetails,
};
use crate::domain::production::{
    entities::{MachineStatusUpdate, ProductionJob, ProductionJobChanges, ProductionOrderChanges},
    errors::ProductionError,
    value_objects::{JobStatus, MachineStatus, OrderStatus, Priority},
};

fn default_priority() -> String {
    Priority::default().as_str().to_string()
}

/// Parse an enum field, recording a validation message on failure
fn parse_field<T>(value: &str, errors: &mut Vec<String>) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    }
}

fn parse_optional<T>(value: Option<&str>, errors: &mut Vec<String>) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| parse_field(v, errors))
}

fn finish<T>(value: T, errors: Vec<String>) -> Result<T, ProductionError> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(ProductionError::validation(errors))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionJobDto {
    pub id: i32,
    pub production_order_id: i32,
    #[schema(example = "Green tire building")]
    pub job_name: String,
    pub machine_id: i32,
    #[schema(example = "Tire Building Machine 1")]
    pub machine_name: String,
    /// Hours
    pub duration: f64,
    pub status: JobStatus,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub scheduled_end_time: Option<DateTime<Utc>>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub operator: Option<String>,
    pub notes: Option<String>,
    pub sort_order: i32,
}

impl From<ProductionJob> for ProductionJobDto {
    fn from(job: ProductionJob) -> Self {
        Self {
            id: job.id,
            production_order_id: job.production_order_id,
            job_name: job.job_name,
            machine_id: job.machine_id,
            machine_name: job.machine_name,
            duration: job.duration,
            status: job.status,
            scheduled_start_time: job.scheduled_start_time,
            scheduled_end_time: job.scheduled_end_time,
            actual_start_time: job.actual_start_time,
            actual_end_time: job.actual_end_time,
            operator: job.operator,
            notes: job.notes,
            sort_order: job.sort_order,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionOrderDto {
    pub id: i32,
    #[schema(example = "PO-2025-001")]
    pub order_number: String,
    #[schema(example = "AutoCorp Manufacturing")]
    pub customer_name: String,
    #[schema(example = "Premium All-Season Tire 205/55R16")]
    pub product_name: String,
    pub quantity: i32,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub status: OrderStatus,
    pub progress: i32,
    pub estimated_hours: f64,
    pub assigned_machine: Option<String>,
    pub notes: Option<String>,
    pub created_date: DateTime<Utc>,
    pub start_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    /// Whole days until due, negative once past
    pub days_until_due: i64,
    pub is_overdue: bool,
    pub production_jobs: Vec<ProductionJobDto>,
}

impl ProductionOrderDto {
    pub fn from_details(details: ProductionOrderDetails, now: DateTime<Utc>) -> Self {
        let ProductionOrderDetails { order, jobs } = details;
        Self {
            days_until_due: order.days_until_due(now),
            is_overdue: order.is_overdue(now),
            id: order.id,
            order_number: order.order_number.to_string(),
            customer_name: order.customer_name,
            product_name: order.product_name,
            quantity: order.quantity,
            due_date: order.due_date,
            priority: order.priority,
            status: order.status,
            progress: order.progress,
            estimated_hours: order.estimated_hours,
            assigned_machine: order.assigned_machine,
            notes: order.notes,
            created_date: order.created_date,
            start_date: order.start_date,
            completed_date: order.completed_date,
            created_by: order.created_by,
            production_jobs: jobs.into_iter().map(ProductionJobDto::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductionOrderRequest {
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i32,
    pub due_date: DateTime<Utc>,
    #[serde(default = "default_priority")]
    #[schema(example = "high")]
    pub priority: String,
    #[serde(default)]
    pub estimated_hours: f64,
    pub notes: Option<String>,
}

impl CreateProductionOrderRequest {
    pub fn into_input(self) -> Result<CreateOrderInput, ProductionError> {
        let mut errors = Vec::new();
        let priority = parse_field::<Priority>(&self.priority, &mut errors);
        let input = CreateOrderInput {
            customer_name: self.customer_name,
            product_name: self.product_name,
            quantity: self.quantity,
            due_date: self.due_date,
            priority: priority.unwrap_or_default(),
            estimated_hours: self.estimated_hours,
            notes: self.notes,
        };
        finish(input, errors)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProductionOrderRequest {
    pub customer_name: Option<String>,
    pub product_name: Option<String>,
    pub quantity: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
    #[schema(example = "medium")]
    pub priority: Option<String>,
    #[schema(example = "in-progress")]
    pub status: Option<String>,
    pub progress: Option<i32>,
    pub estimated_hours: Option<f64>,
    pub assigned_machine: Option<String>,
    pub notes: Option<String>,
}

impl UpdateProductionOrderRequest {
    pub fn into_changes(self) -> Result<ProductionOrderChanges, ProductionError> {
        let mut errors = Vec::new();
        let changes = ProductionOrderChanges {
            priority: parse_optional(self.priority.as_deref(), &mut errors),
            status: parse_optional(self.status.as_deref(), &mut errors),
            customer_name: self.customer_name,
            product_name: self.product_name,
            quantity: self.quantity,
            due_date: self.due_date,
            progress: self.progress,
            estimated_hours: self.estimated_hours,
            assigned_machine: self.assigned_machine,
            notes: self.notes,
        };
        finish(changes, errors)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatisticsDto {
    pub total_orders: i64,
    pub active_orders: i64,
    pub completed_orders: i64,
    pub pending_orders: i64,
    pub delayed_orders: i64,
    pub completed_today: i64,
    pub efficiency: f64,
}

impl From<OrderStatistics> for OrderStatisticsDto {
    fn from(s: OrderStatistics) -> Self {
        Self {
            total_orders: s.total_orders,
            active_orders: s.active_orders,
            completed_orders: s.completed_orders,
            pending_orders: s.pending_orders,
            delayed_orders: s.delayed_orders,
            completed_today: s.completed_today,
            efficiency: s.efficiency,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineDto {
    pub id: i32,
    #[schema(example = "Tire Molding Press 1")]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "Molding Press")]
    pub machine_type: String,
    pub status: MachineStatus,
    pub utilization: i32,
    pub last_maintenance: Option<DateTime<Utc>>,
    pub next_maintenance: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_active: bool,
    /// Name of the in-progress job, if any
    pub current_job: Option<String>,
}

impl From<MachineOverview> for MachineDto {
    fn from(overview: MachineOverview) -> Self {
        let MachineOverview {
            machine,
            current_job,
        } = overview;
        Self {
            id: machine.id,
            name: machine.name,
            machine_type: machine.machine_type,
            status: machine.status,
            utilization: machine.utilization,
            last_maintenance: machine.last_maintenance,
            next_maintenance: machine.next_maintenance,
            notes: machine.notes,
            is_active: machine.is_active,
            current_job,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMachineStatusRequest {
    #[schema(example = "running")]
    pub status: String,
    pub utilization: i32,
    pub notes: Option<String>,
}

impl UpdateMachineStatusRequest {
    pub fn into_update(self) -> Result<MachineStatusUpdate, ProductionError> {
        let mut errors = Vec::new();
        let status = parse_field::<MachineStatus>(&self.status, &mut errors);
        let update = MachineStatusUpdate {
            status: status.unwrap_or(MachineStatus::Idle),
            utilization: self.utilization,
            notes: self.notes,
        };
        finish(update, errors)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatisticsDto {
    pub total_machines: i64,
    pub running_machines: i64,
    pub idle_machines: i64,
    pub maintenance_machines: i64,
    pub error_machines: i64,
    pub average_utilization: f64,
}

impl From<MachineStatistics> for MachineStatisticsDto {
    fn from(s: MachineStatistics) -> Self {
        Self {
            total_machines: s.total_machines,
            running_machines: s.running_machines,
            idle_machines: s.idle_machines,
            maintenance_machines: s.maintenance_machines,
            error_machines: s.error_machines,
            average_utilization: s.average_utilization,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductionJobRequest {
    pub job_name: String,
    pub machine_id: i32,
    #[serde(default)]
    pub duration: f64,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub scheduled_end_time: Option<DateTime<Utc>>,
    pub operator: Option<String>,
    pub notes: Option<String>,
}

impl From<CreateProductionJobRequest> for CreateJobInput {
    fn from(r: CreateProductionJobRequest) -> Self {
        Self {
            job_name: r.job_name,
            machine_id: r.machine_id,
            duration: r.duration,
            scheduled_start_time: r.scheduled_start_time,
            scheduled_end_time: r.scheduled_end_time,
            operator: r.operator,
            notes: r.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProductionJobRequest {
    pub job_name: Option<String>,
    pub machine_id: Option<i32>,
    pub duration: Option<f64>,
    #[schema(example = "in-progress")]
    pub status: Option<String>,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub scheduled_end_time: Option<DateTime<Utc>>,
    pub operator: Option<String>,
    pub notes: Option<String>,
}

impl UpdateProductionJobRequest {
    pub fn into_changes(self) -> Result<ProductionJobChanges, ProductionError> {
        let mut errors = Vec::new();
        let changes = ProductionJobChanges {
            status: parse_optional(self.status.as_deref(), &mut errors),
            job_name: self.job_name,
            machine_id: self.machine_id,
            duration: self.duration,
            scheduled_start_time: self.scheduled_start_time,
            scheduled_end_time: self.scheduled_end_time,
            operator: self.operator,
            notes: self.notes,
        };
        finish(changes, errors)
    }
}

/// New board order for an order's jobs
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderJobsRequest {
    #[schema(example = json!([12, 10, 11]))]
    pub job_ids: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_parses_priority_leniently() {
        let request: CreateProductionOrderRequest = serde_json::from_value(serde_json::json!({
            "customerName": "AutoCorp",
            "productName": "Tire",
            "quantity": 10,
            "dueDate": "2025-06-01T00:00:00Z",
            "priority": "High"
        }))
        .unwrap();
        let input = request.into_input().unwrap();
        assert_eq!(input.priority, Priority::High);
        assert_eq!(input.estimated_hours, 0.0);
    }

    #[test]
    fn test_invalid_machine_status_is_a_validation_error() {
        let request = UpdateMachineStatusRequest {
            status: "exploded".to_string(),
            utilization: 10,
            notes: None,
        };
        assert!(matches!(
            request.into_update(),
            Err(ProductionError::Validation { .. })
        ));
    }

    #[test]
    fn test_update_request_accepts_pascal_case_status() {
        let request: UpdateProductionOrderRequest =
            serde_json::from_value(serde_json::json!({ "status": "InProgress" })).unwrap();
        let changes = request.into_changes().unwrap();
        assert_eq!(changes.status, Some(OrderStatus::InProgress));
        assert!(changes.customer_name.is_none());
    }

    #[test]
    fn test_machine_dto_uses_type_key() {
        let now = Utc::now();
        let dto = MachineDto::from(MachineOverview {
            machine: crate::domain::production::entities::Machine {
                id: 1,
                name: "Tire Molding Press 1".to_string(),
                machine_type: "Molding Press".to_string(),
                status: MachineStatus::Running,
                utilization: 75,
                last_maintenance: None,
                next_maintenance: None,
                notes: None,
                is_active: true,
                is_deleted: false,
                deleted_date: None,
                created_date: now,
                updated_date: None,
            },
            current_job: Some("Curing".to_string()),
        });
        let json = serde_json::to_value(dto).unwrap();
        assert_eq!(json["type"], "Molding Press");
        assert_eq!(json["status"], "running");
        assert_eq!(json["currentJob"], "Curing");
    }
}
