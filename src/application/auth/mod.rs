//! Authentication application services

pub mod accounts;
pub mod use_cases;

pub use use_cases::*;
