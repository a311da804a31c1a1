//! Presentation layer: HTTP handlers, DTOs and routing

pub mod auth;
pub mod health;
pub mod middleware;
pub mod models;
pub mod production;
pub mod routes;

pub use routes::{ApiDoc, create_router};
