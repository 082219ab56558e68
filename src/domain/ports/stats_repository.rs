//! Statistics read-side port.
//!
//! Pure aggregation queries over the ledgers. All of them are caller-scoped:
//! a unit's charts only ever aggregate the requesting user's rows.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DayCount, DayValue, GoalTotal, StatsWindow};

/// Repository interface for ledger aggregation.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Sum credited values grouped by unit over a window.
    async fn sum_by_unit(
        &self,
        user_id: Uuid,
        window: &StatsWindow,
    ) -> DomainResult<Vec<(Uuid, f64)>>;

    /// Daily progress sums for goals of one unit over a window, ascending
    /// by day.
    async fn unit_daily_progress(
        &self,
        unit_id: Uuid,
        user_id: Uuid,
        window: &StatsWindow,
    ) -> DomainResult<Vec<DayValue>>;

    /// Daily progress event counts for goals of one unit over a window,
    /// ascending by day.
    async fn unit_daily_activity(
        &self,
        unit_id: Uuid,
        user_id: Uuid,
        window: &StatsWindow,
    ) -> DomainResult<Vec<DayCount>>;

    /// Per-goal progress totals for one unit over a window, largest first.
    async fn unit_goal_totals(
        &self,
        unit_id: Uuid,
        user_id: Uuid,
        window: &StatsWindow,
    ) -> DomainResult<Vec<GoalTotal>>;
}
