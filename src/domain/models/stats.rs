//! Statistics window math and aggregation result types.
//!
//! The previous-period comparison steps back by the exact duration of the
//! requested window, not by calendar weeks or months: the previous window
//! ends one millisecond before the current one starts and spans the same
//! length, so adjacent windows never share a ledger row.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::unit::Unit;

/// Comparison period requested for user statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Week,
    Month,
    Year,
    /// No previous-period comparison; percentage is always 0.
    All,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// An inclusive `[start, end]` aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl StatsWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, String> {
        if start > end {
            return Err("start date must be before or equal to end date".to_string());
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The window of identical duration ending 1ms before this one starts.
    pub fn previous(&self) -> Self {
        let end = self.start - Duration::milliseconds(1);
        Self { start: end - self.duration(), end }
    }
}

/// Percentage change between two period totals, rounded to 2 decimals
/// (half away from zero). Zero when there is nothing to compare against.
pub fn change_percentage(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    let raw = ((current - previous) / previous) * 100.0;
    (raw * 100.0).round() / 100.0
}

/// One line of the user statistics report.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitStatLine {
    /// Full unit record, for display
    pub unit: Unit,
    /// Change vs the previous period, percent
    pub percentage: f64,
    /// Total credited in the current window
    pub current_period: f64,
    /// Total credited in the previous window (0 for `all`)
    pub last_period: f64,
}

/// Goal counts over a creation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoalCounts {
    pub total_goals: i64,
    pub completed_goals: i64,
}

impl GoalCounts {
    pub fn pending_goals(&self) -> i64 {
        self.total_goals - self.completed_goals
    }
}

/// Day-bucketed progress sum (line chart).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayValue {
    pub date: String,
    pub value: f64,
}

/// Day-bucketed running total (area chart).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotal {
    pub date: String,
    pub total: f64,
}

/// Day-bucketed event count (activity chart).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: String,
    pub count: i64,
}

/// Per-goal progress total over a window, ranked descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalTotal {
    pub goal_id: Uuid,
    pub goal_title: String,
    pub total_progress: f64,
}

/// Chart bundle for one unit over one window.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitStatistics {
    pub unit_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub progress_over_time: Vec<DayValue>,
    pub cumulative_progress: Vec<DayTotal>,
    pub activity_count: Vec<DayCount>,
    pub progress_by_goal: Vec<GoalTotal>,
}
