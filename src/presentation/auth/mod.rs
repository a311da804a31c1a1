//! Authentication presentation layer

pub mod controller;
pub mod extractors;
pub mod models;

pub use controller::*;
pub use extractors::*;
pub use models::*;
