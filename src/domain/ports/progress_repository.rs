//! Progress ledger port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DailyProgress, Goal, ProgressEntry};

/// Outcome of recording one progress event.
#[derive(Debug, Clone)]
pub struct RecordedProgress {
    /// The appended ledger row
    pub entry: ProgressEntry,
    /// Goal state after the event was applied
    pub goal: Goal,
}

/// Repository interface for the append-only progress ledger.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Append a ledger row for `goal_id` and apply every derived update
    /// (goal totals, completion latch, unit credit, completion bonus, parent
    /// chain rollup) in one transaction.
    ///
    /// `amount` must already be the effective value: `Some` for target
    /// goals, `None` for manual goals.
    async fn record(
        &self,
        goal_id: Uuid,
        amount: Option<f64>,
        now: DateTime<Utc>,
    ) -> DomainResult<RecordedProgress>;

    /// Day-bucketed sums of a goal's ledger, ascending by day.
    async fn daily_history(&self, goal_id: Uuid) -> DomainResult<Vec<DailyProgress>>;
}
