pub mod config;
pub mod goal;
pub mod ledger;
pub mod stats;
pub mod unit;

pub use config::{Config, DatabaseConfig, LoggingConfig, ServerConfig};
pub use goal::{ContainerRollup, Goal, GoalType, GoalUpdate, IncrementOutcome, NewGoal};
pub use ledger::{DailyProgress, ProgressEntry, StatEntry};
pub use stats::{
    change_percentage, DayCount, DayTotal, DayValue, GoalCounts, GoalTotal, PeriodType,
    StatsWindow, UnitStatLine, UnitStatistics,
};
pub use unit::{NewUnit, Unit, UnitUpdate};
