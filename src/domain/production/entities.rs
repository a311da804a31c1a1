//! Production scheduling entities
//!
//! Rows are identified by database-assigned integer ids. Every entity carries a
//! soft-delete flag; deleted rows are invisible to reads but keep their
//! order numbers and names reserved.

use chrono::{DateTime, Utc};

use super::value_objects::{JobStatus, MachineStatus, OrderNumber, OrderStatus, Priority};

pub const NAME_MAX: usize = 100;
pub const MACHINE_FIELD_MAX: usize = 50;
pub const NOTES_MAX: usize = 500;

/// A machine on the shop floor
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    pub id: i32,
    pub name: String,
    pub machine_type: String,
    pub status: MachineStatus,
    /// 0..=100
    pub utilization: i32,
    pub last_maintenance: Option<DateTime<Utc>>,
    pub next_maintenance: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub deleted_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub updated_date: Option<DateTime<Utc>>,
}

impl Machine {
    /// Visible through the machine endpoints
    pub fn is_available(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

/// Insert model for a machine
#[derive(Debug, Clone)]
pub struct NewMachine {
    pub name: String,
    pub machine_type: String,
    pub status: MachineStatus,
    pub utilization: i32,
    pub last_maintenance: Option<DateTime<Utc>>,
    pub next_maintenance: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_active: bool,
}

impl NewMachine {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        require_text(&mut errors, "Name", &self.name, MACHINE_FIELD_MAX);
        require_text(&mut errors, "Type", &self.machine_type, MACHINE_FIELD_MAX);
        check_percent(&mut errors, "Utilization", self.utilization);
        check_optional_text(&mut errors, "Notes", self.notes.as_deref(), NOTES_MAX);
        into_result(errors)
    }
}

/// Status report for a machine
#[derive(Debug, Clone)]
pub struct MachineStatusUpdate {
    pub status: MachineStatus,
    pub utilization: i32,
    /// Replaces the stored notes only when non-empty
    pub notes: Option<String>,
}

impl MachineStatusUpdate {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        check_percent(&mut errors, "Utilization", self.utilization);
        check_optional_text(&mut errors, "Notes", self.notes.as_deref(), NOTES_MAX);
        into_result(errors)
    }

    pub fn apply(&self, machine: &mut Machine, now: DateTime<Utc>) {
        machine.status = self.status;
        machine.utilization = self.utilization;
        if let Some(notes) = self.notes.as_ref().filter(|n| !n.is_empty()) {
            machine.notes = Some(notes.clone());
        }
        machine.updated_date = Some(now);
    }
}

/// A customer production order
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionOrder {
    pub id: i32,
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i32,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub status: OrderStatus,
    /// 0..=100
    pub progress: i32,
    pub estimated_hours: f64,
    pub assigned_machine: Option<String>,
    pub notes: Option<String>,
    pub created_date: DateTime<Utc>,
    pub start_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub is_deleted: bool,
    pub deleted_date: Option<DateTime<Utc>>,
    pub updated_date: Option<DateTime<Utc>>,
}

impl ProductionOrder {
    /// Whole days until the due date, truncated toward zero
    pub fn days_until_due(&self, now: DateTime<Utc>) -> i64 {
        (self.due_date - now).num_days()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date < now && !self.status.is_closed()
    }

    /// Move to a new status, stamping start and completion dates
    pub fn transition_to(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        match status {
            OrderStatus::InProgress if self.start_date.is_none() => {
                self.start_date = Some(now);
            }
            OrderStatus::Completed => {
                if self.completed_date.is_none() {
                    self.completed_date = Some(now);
                }
                self.progress = 100;
            }
            _ => {}
        }
    }
}

/// Insert model for a production order
#[derive(Debug, Clone)]
pub struct NewProductionOrder {
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i32,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub status: OrderStatus,
    pub estimated_hours: f64,
    pub notes: Option<String>,
    pub created_date: DateTime<Utc>,
    pub created_by: Option<String>,
}

impl NewProductionOrder {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        require_text(&mut errors, "CustomerName", &self.customer_name, NAME_MAX);
        require_text(&mut errors, "ProductName", &self.product_name, NAME_MAX);
        if self.quantity < 1 {
            errors.push("Quantity must be at least 1".to_string());
        }
        check_hours(&mut errors, "EstimatedHours", self.estimated_hours);
        check_optional_text(&mut errors, "Notes", self.notes.as_deref(), NOTES_MAX);
        check_optional_text(&mut errors, "CreatedBy", self.created_by.as_deref(), NAME_MAX);
        into_result(errors)
    }
}

/// Partial update of a production order
///
/// Text fields are applied only when non-empty, all others when present.
#[derive(Debug, Clone, Default)]
pub struct ProductionOrderChanges {
    pub customer_name: Option<String>,
    pub product_name: Option<String>,
    pub quantity: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub status: Option<OrderStatus>,
    pub progress: Option<i32>,
    pub estimated_hours: Option<f64>,
    pub assigned_machine: Option<String>,
    pub notes: Option<String>,
}

impl ProductionOrderChanges {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if let Some(name) = &self.customer_name {
            check_max(&mut errors, "CustomerName", name, NAME_MAX);
        }
        if let Some(name) = &self.product_name {
            check_max(&mut errors, "ProductName", name, NAME_MAX);
        }
        if let Some(quantity) = self.quantity
            && quantity < 1
        {
            errors.push("Quantity must be at least 1".to_string());
        }
        if let Some(progress) = self.progress {
            check_percent(&mut errors, "Progress", progress);
        }
        if let Some(hours) = self.estimated_hours {
            check_hours(&mut errors, "EstimatedHours", hours);
        }
        check_optional_text(
            &mut errors,
            "AssignedMachine",
            self.assigned_machine.as_deref(),
            NAME_MAX,
        );
        check_optional_text(&mut errors, "Notes", self.notes.as_deref(), NOTES_MAX);
        into_result(errors)
    }

    pub fn apply(self, order: &mut ProductionOrder, now: DateTime<Utc>) {
        if let Some(name) = self.customer_name.filter(|s| !s.is_empty()) {
            order.customer_name = name;
        }
        if let Some(name) = self.product_name.filter(|s| !s.is_empty()) {
            order.product_name = name;
        }
        if let Some(quantity) = self.quantity {
            order.quantity = quantity;
        }
        if let Some(due_date) = self.due_date {
            order.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            order.priority = priority;
        }
        if let Some(status) = self.status {
            order.transition_to(status, now);
        }
        if let Some(progress) = self.progress {
            order.progress = progress;
        }
        if let Some(hours) = self.estimated_hours {
            order.estimated_hours = hours;
        }
        if let Some(machine) = self.assigned_machine {
            order.assigned_machine = Some(machine);
        }
        if let Some(notes) = self.notes {
            order.notes = Some(notes);
        }
        order.updated_date = Some(now);
    }
}

/// One step of a production order, run on a machine
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionJob {
    pub id: i32,
    pub production_order_id: i32,
    pub job_name: String,
    pub machine_id: i32,
    /// Denormalized from the machine row on read
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
    pub is_deleted: bool,
    pub deleted_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub updated_date: Option<DateTime<Utc>>,
}

impl ProductionJob {
    pub fn transition_to(&mut self, status: JobStatus, now: DateTime<Utc>) {
        self.status = status;
        match status {
            JobStatus::InProgress if self.actual_start_time.is_none() => {
                self.actual_start_time = Some(now);
            }
            JobStatus::Completed if self.actual_end_time.is_none() => {
                self.actual_end_time = Some(now);
            }
            _ => {}
        }
    }
}

/// Insert model for a production job
#[derive(Debug, Clone)]
pub struct NewProductionJob {
    pub production_order_id: i32,
    pub job_name: String,
    pub machine_id: i32,
    pub duration: f64,
    pub status: JobStatus,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub scheduled_end_time: Option<DateTime<Utc>>,
    pub operator: Option<String>,
    pub notes: Option<String>,
    pub sort_order: i32,
}

impl NewProductionJob {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        require_text(&mut errors, "JobName", &self.job_name, NAME_MAX);
        check_hours(&mut errors, "Duration", self.duration);
        check_schedule(
            &mut errors,
            self.scheduled_start_time,
            self.scheduled_end_time,
        );
        check_optional_text(&mut errors, "Operator", self.operator.as_deref(), NAME_MAX);
        check_optional_text(&mut errors, "Notes", self.notes.as_deref(), NOTES_MAX);
        into_result(errors)
    }
}

/// Partial update of a production job
#[derive(Debug, Clone, Default)]
pub struct ProductionJobChanges {
    pub job_name: Option<String>,
    pub machine_id: Option<i32>,
    pub duration: Option<f64>,
    pub status: Option<JobStatus>,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub scheduled_end_time: Option<DateTime<Utc>>,
    pub operator: Option<String>,
    pub notes: Option<String>,
}

impl ProductionJobChanges {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if let Some(name) = &self.job_name {
            check_max(&mut errors, "JobName", name, NAME_MAX);
        }
        if let Some(duration) = self.duration {
            check_hours(&mut errors, "Duration", duration);
        }
        check_schedule(
            &mut errors,
            self.scheduled_start_time,
            self.scheduled_end_time,
        );
        check_optional_text(&mut errors, "Operator", self.operator.as_deref(), NAME_MAX);
        check_optional_text(&mut errors, "Notes", self.notes.as_deref(), NOTES_MAX);
        into_result(errors)
    }

    pub fn apply(self, job: &mut ProductionJob, now: DateTime<Utc>) {
        if let Some(name) = self.job_name.filter(|s| !s.is_empty()) {
            job.job_name = name;
        }
        if let Some(machine_id) = self.machine_id {
            job.machine_id = machine_id;
        }
        if let Some(duration) = self.duration {
            job.duration = duration;
        }
        if let Some(status) = self.status {
            job.transition_to(status, now);
        }
        if let Some(start) = self.scheduled_start_time {
            job.scheduled_start_time = Some(start);
        }
        if let Some(end) = self.scheduled_end_time {
            job.scheduled_end_time = Some(end);
        }
        if let Some(operator) = self.operator {
            job.operator = Some(operator);
        }
        if let Some(notes) = self.notes {
            job.notes = Some(notes);
        }
        job.updated_date = Some(now);
    }
}

fn require_text(errors: &mut Vec<String>, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.push(format!("{} is required", field));
    } else {
        check_max(errors, field, value, max);
    }
}

fn check_max(errors: &mut Vec<String>, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(format!("{} must be at most {} characters", field, max));
    }
}

fn check_optional_text(errors: &mut Vec<String>, field: &str, value: Option<&str>, max: usize) {
    if let Some(value) = value {
        check_max(errors, field, value, max);
    }
}

fn check_percent(errors: &mut Vec<String>, field: &str, value: i32) {
    if !(0..=100).contains(&value) {
        errors.push(format!("{} must be between 0 and 100", field));
    }
}

fn check_hours(errors: &mut Vec<String>, field: &str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.push(format!("{} must be a non-negative number", field));
    }
}

fn check_schedule(
    errors: &mut Vec<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) {
    if let (Some(start), Some(end)) = (start, end)
        && end < start
    {
        errors.push("ScheduledEndTime must not be before ScheduledStartTime".to_string());
    }
}

fn into_result(errors: Vec<String>) -> Result<(), Vec<String>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
