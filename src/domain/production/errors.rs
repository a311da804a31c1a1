//! Production scheduling domain errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProductionError {
    #[error("Production order not found: {id}")]
    OrderNotFound { id: i32 },

    #[error("Machine not found: {id}")]
    MachineNotFound { id: i32 },

    #[error("Production job not found: {id}")]
    JobNotFound { id: i32 },

    #[error("Validation failed")]
    Validation { errors: Vec<String> },

    #[error("Machine {id} does not exist or is inactive")]
    UnknownMachine { id: i32 },

    #[error("Order number already exists: {order_number}")]
    DuplicateOrderNumber { order_number: String },

    #[error("Machine name already exists: {name}")]
    DuplicateMachineName { name: String },

    #[error("Invalid job order: {reason}")]
    InvalidJobOrder { reason: String },

    #[error("Database error: {message}")]
    DatabaseError { message: String },
}

impl ProductionError {
    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation { errors }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::DatabaseError {
            message: message.into(),
        }
    }
}
