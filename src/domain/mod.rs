//! Domain Layer - Core business entities and rules
//!
//! `auth` covers user accounts, `production` covers machines, production
//! orders and the jobs scheduled for them.

pub mod auth;
pub mod production;
