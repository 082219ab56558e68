//! Append-only ledger rows.
//!
//! `ProgressEntry` is the raw record of a progress event against a goal;
//! `StatEntry` is the per-unit credit derived from it (or from a completion
//! bonus). Neither is ever updated or deleted by application code; all goal
//! state and statistics derive from replaying or aggregating these rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recorded progress event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Goal the event was recorded against
    pub goal_id: Uuid,
    /// Increment amount; NULL for manual goals (the event itself is the signal)
    pub progress: Option<f64>,
    /// When the event was recorded
    pub created_at: DateTime<Utc>,
}

/// One per-unit credit for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Credited user
    pub user_id: Uuid,
    /// Credited unit
    pub unit_id: Uuid,
    /// Credit amount
    pub value: f64,
    /// When the credit was granted
    pub created_at: DateTime<Utc>,
}

/// Day-bucketed sum of progress for one goal, for history charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    /// UTC day bucket, `YYYY-MM-DD`
    pub date: String,
    /// Sum of increments recorded that day
    pub progress: f64,
}
