//! Production scheduling domain module
//!
//! Machines, production orders and the jobs that make up each order.

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use repositories::*;
pub use value_objects::*;
