//! Statistics service.
//!
//! Read-only aggregation over the credit and progress ledgers. The window
//! math lives in `domain/models/stats.rs`; this service stitches the
//! repository sums into report rows and chart series.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    change_percentage, DayTotal, PeriodType, StatsWindow, UnitStatLine, UnitStatistics,
};
use crate::domain::ports::{StatsRepository, UnitRepository};

pub struct StatsService<S: StatsRepository, U: UnitRepository> {
    stats: Arc<S>,
    units: Arc<U>,
}

impl<S: StatsRepository, U: UnitRepository> StatsService<S, U> {
    pub fn new(stats: Arc<S>, units: Arc<U>) -> Self {
        Self { stats, units }
    }

    /// Per-unit credit totals for the window, compared against the previous
    /// window of identical duration.
    ///
    /// The result covers the union of units seen in either window; a side
    /// without credits contributes 0. Units deleted since their credits were
    /// written are dropped from the report.
    pub async fn user_stats(
        &self,
        caller: Uuid,
        window: StatsWindow,
        period: PeriodType,
    ) -> DomainResult<Vec<UnitStatLine>> {
        let current = self.stats.sum_by_unit(caller, &window).await?;
        // `all` has no baseline, so the previous-window query is never issued.
        let previous = if period == PeriodType::All {
            Vec::new()
        } else {
            self.stats.sum_by_unit(caller, &window.previous()).await?
        };

        let current: HashMap<Uuid, f64> = current.into_iter().collect();
        let previous: HashMap<Uuid, f64> = previous.into_iter().collect();

        let mut unit_ids: Vec<Uuid> = current.keys().chain(previous.keys()).copied().collect();
        unit_ids.sort_unstable();
        unit_ids.dedup();

        let units = self.units.get_many(&unit_ids).await?;
        let mut lines = Vec::with_capacity(units.len());
        for unit in units {
            let current_period = current.get(&unit.id).copied().unwrap_or(0.0);
            let last_period = previous.get(&unit.id).copied().unwrap_or(0.0);
            let percentage = if period == PeriodType::All {
                0.0
            } else {
                change_percentage(current_period, last_period)
            };
            lines.push(UnitStatLine { unit, percentage, current_period, last_period });
        }
        Ok(lines)
    }

    /// Chart bundle for one unit over a window, restricted to the caller's
    /// goals.
    pub async fn unit_statistics(
        &self,
        caller: Uuid,
        unit_id: Uuid,
        window: StatsWindow,
    ) -> DomainResult<UnitStatistics> {
        if self.units.get(unit_id).await?.is_none() {
            return Err(DomainError::UnitNotFound(unit_id));
        }

        let progress_over_time = self.stats.unit_daily_progress(unit_id, caller, &window).await?;
        let activity_count = self.stats.unit_daily_activity(unit_id, caller, &window).await?;
        let progress_by_goal = self.stats.unit_goal_totals(unit_id, caller, &window).await?;

        // Running total over the daily series.
        let mut running = 0.0;
        let cumulative_progress = progress_over_time
            .iter()
            .map(|day| {
                running += day.value;
                DayTotal { date: day.date.clone(), total: running }
            })
            .collect();

        Ok(UnitStatistics {
            unit_id,
            start: window.start,
            end: window.end,
            progress_over_time,
            cumulative_progress,
            activity_count,
            progress_by_goal,
        })
    }
}
