//! Shared request-handler state.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::adapters::sqlite::{
    SqliteGoalRepository, SqliteProgressRepository, SqliteSessionRepository,
    SqliteStatsRepository, SqliteUnitRepository,
};
use crate::domain::ports::Clock;
use crate::services::{GoalService, ProgressService, StatsService, UnitService};

/// Everything the handlers need, wired over one connection pool.
pub struct AppState {
    /// Goal CRUD, manual completion and creation-window counts
    pub goals: GoalService<SqliteGoalRepository, SqliteUnitRepository>,
    /// Progress recording and per-goal history
    pub progress: ProgressService<SqliteGoalRepository, SqliteProgressRepository>,
    /// Per-unit statistics and the user stats report
    pub stats: StatsService<SqliteStatsRepository, SqliteUnitRepository>,
    /// Unit catalog administration
    pub units: UnitService<SqliteUnitRepository>,
    /// Bearer-token verification
    pub sessions: SqliteSessionRepository,
    /// Time source shared with the services
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wire all services and repositories over `pool`.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        let goal_repo = Arc::new(SqliteGoalRepository::new(pool.clone()));
        let unit_repo = Arc::new(SqliteUnitRepository::new(pool.clone()));
        let progress_repo = Arc::new(SqliteProgressRepository::new(pool.clone()));
        let stats_repo = Arc::new(SqliteStatsRepository::new(pool.clone()));

        Self {
            goals: GoalService::new(goal_repo.clone(), unit_repo.clone(), clock.clone()),
            progress: ProgressService::new(goal_repo, progress_repo, clock.clone()),
            stats: StatsService::new(stats_repo, unit_repo.clone()),
            units: UnitService::new(unit_repo, clock.clone()),
            sessions: SqliteSessionRepository::new(pool),
            clock,
        }
    }
}
