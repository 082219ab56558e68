//! Stride - Goal Tracking REST Backend
//!
//! Stride is a multi-tenant goal tracker: users define goals (fixed-target,
//! manually completed, or containers of other goals), log progress against
//! them, and read aggregated statistics per unit of measure and time period.
//! Completion state propagates synchronously up container chains, and every
//! progress event is kept in an append-only ledger.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure business logic, models, and port traits
//! - **Service Layer** (`services`): Use case orchestration over the ports
//! - **Adapters** (`adapters`): SQLite repositories and the axum HTTP surface
//! - **Infrastructure Layer** (`infrastructure`): Configuration loading
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use stride::adapters::http::{ApiServer, AppState};
//! use stride::adapters::sqlite::initialize_database;
//! use stride::domain::ports::SystemClock;
//! use stride::infrastructure::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = ConfigLoader::load()?;
//!     let url = format!("sqlite:{}", config.database.path);
//!     let pool = initialize_database(&url, None).await?;
//!     let state = AppState::new(pool, Arc::new(SystemClock));
//!     ApiServer::new(state, config.server).serve().await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::http::{ApiServer, AppState};
pub use domain::models::{
    Config, DatabaseConfig, Goal, GoalType, LoggingConfig, ServerConfig, Unit,
};
pub use domain::ports::{AuthUser, Clock, SystemClock};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{GoalService, ProgressService, StatsService, UnitService};
