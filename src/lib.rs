//! prodsched - authentication and production scheduling API
//!
//! Layers follow the usual split: `domain` holds entities and repository
//! traits, `application` the use cases, `infrastructure` storage and
//! outbound clients, and `presentation` the axum surface.

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

pub use app::{AppHandle, create_app};
pub use config::Config;
pub use logging::init_tracing;
