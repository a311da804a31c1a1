//! Application layer: use cases orchestrating the domain and infrastructure

pub mod auth;
pub mod errors;
pub mod production;
pub mod seeding;

pub use errors::ApplicationError;
