//! Infrastructure layer: storage, token services and outbound HTTP

pub mod auth;
pub mod health;
pub mod persistence;
