//! Use case services orchestrating the domain ports.
//!
//! Services validate input and enforce ownership; repositories own the
//! transactional write paths they delegate to.

pub mod goal_service;
pub mod progress_service;
pub mod stats_service;
pub mod unit_service;

pub use goal_service::GoalService;
pub use progress_service::ProgressService;
pub use stats_service::StatsService;
pub use unit_service::UnitService;
