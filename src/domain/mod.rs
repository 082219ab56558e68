//! Domain layer for the stride goal tracker
//!
//! This module contains core business logic and domain models.

pub mod errors;
pub mod models;
pub mod ports;
pub mod time;

pub use errors::{DomainError, DomainResult};
