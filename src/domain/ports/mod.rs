//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces that infrastructure adapters must
//! implement:
//! - `GoalRepository`: goal persistence, including transactional rollups
//! - `ProgressRepository`: the append-only progress ledger
//! - `StatsRepository`: ledger aggregation queries
//! - `UnitRepository`: the shared unit catalog
//! - `SessionRepository`: bearer-token verification
//! - `Clock`: time source
//!
//! Services depend on these traits, never on concrete implementations.

pub mod clock;
pub mod goal_repository;
pub mod progress_repository;
pub mod session_repository;
pub mod stats_repository;
pub mod unit_repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use goal_repository::{GoalFilter, GoalPage, GoalRepository, PageRequest};
pub use progress_repository::{ProgressRepository, RecordedProgress};
pub use session_repository::{AuthUser, SessionRepository};
pub use stats_repository::StatsRepository;
pub use unit_repository::UnitRepository;
