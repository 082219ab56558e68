//! Goal domain model.
//!
//! A goal completes in one of three ways: automatically when its accumulated
//! progress reaches a numeric target, by an explicit user action, or (for
//! container goals) when every direct child is complete. Completion latches
//! for target and manual goals: once set it is never cleared. Container
//! completion is derived state and can be lost when a child is added or
//! un-completed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a goal reaches completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Completed automatically when accumulated progress reaches `target`.
    Target,
    /// Completed by an explicit user action.
    Manual,
    /// Container whose completion derives from its direct children.
    Goals,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Manual => "manual",
            Self::Goals => "goals",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "target" => Some(Self::Target),
            "manual" => Some(Self::Manual),
            "goals" => Some(Self::Goals),
            _ => None,
        }
    }

    /// Containers never receive direct progress.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Goals)
    }
}

/// A user's goal.
///
/// For container goals, `target` tracks the live count of direct children
/// and `current_progress` the completed fraction in `[0, 1]`. For target
/// goals, `current_progress` is the accumulated progress total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Container this goal is a direct child of, if any
    pub parent_goal_id: Option<Uuid>,
    /// Unit credited by progress increments (required for target goals)
    pub unit_id: Option<Uuid>,
    /// Unit credited once on completion, if a bonus is configured
    pub unit_id_completed: Option<Uuid>,
    /// Amount of the completion bonus credit
    pub unit_completed_amount: Option<f64>,
    /// Short human-readable title
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Completion mode
    pub goal_type: GoalType,
    /// Numeric target (target goals) or live child count (containers)
    pub target: Option<f64>,
    /// Accumulated progress (target goals) or completed fraction (containers)
    pub current_progress: Option<f64>,
    /// When the completion criterion was first met
    pub completed_at: Option<DateTime<Utc>>,
    /// When this goal was created
    pub created_at: DateTime<Utc>,
    /// When this goal was last updated
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Apply a progress increment to a target goal.
    ///
    /// Completion latches: crossing the target sets `completed_at` once;
    /// later increments keep accumulating without touching it.
    pub fn apply_increment(&mut self, amount: f64, now: DateTime<Utc>) -> IncrementOutcome {
        let new_total = self.current_progress.unwrap_or(0.0) + amount;
        self.current_progress = Some(new_total);
        let newly_completed =
            self.completed_at.is_none() && self.target.is_some_and(|t| new_total >= t);
        if newly_completed {
            self.completed_at = Some(now);
        }
        self.updated_at = now;
        IncrementOutcome { new_total, newly_completed }
    }

    /// Apply child counts to a container goal. Returns true when the rollup
    /// newly completed it.
    ///
    /// A container that re-completes keeps its original `completed_at`; one
    /// that falls below 100% loses it.
    pub fn apply_rollup(&mut self, rollup: ContainerRollup, now: DateTime<Utc>) -> bool {
        #[allow(clippy::cast_precision_loss)]
        {
            self.target = Some(rollup.total_children as f64);
        }
        self.current_progress = Some(rollup.fraction());
        self.updated_at = now;
        if rollup.is_complete() {
            if self.completed_at.is_some() {
                false
            } else {
                self.completed_at = Some(now);
                true
            }
        } else {
            self.completed_at = None;
            false
        }
    }

    /// Secondary credit granted on completion, when configured.
    pub fn completion_bonus(&self) -> Option<(Uuid, f64)> {
        match (self.unit_id_completed, self.unit_completed_amount) {
            (Some(unit_id), Some(amount)) => Some((unit_id, amount)),
            _ => None,
        }
    }
}

/// Result of applying a progress increment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncrementOutcome {
    /// Accumulated progress after the increment
    pub new_total: f64,
    /// True when this increment crossed the target for the first time
    pub newly_completed: bool,
}

/// Direct-child completion counts for a container goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerRollup {
    pub total_children: i64,
    pub completed_children: i64,
}

impl ContainerRollup {
    pub fn new(total_children: i64, completed_children: i64) -> Self {
        Self { total_children, completed_children }
    }

    /// Completed fraction in `[0, 1]`. A container with no children is 0%
    /// complete, never NaN.
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total_children <= 0 {
            0.0
        } else {
            self.completed_children as f64 / self.total_children as f64
        }
    }

    /// Complete means: has children and all of them are complete.
    pub fn is_complete(&self) -> bool {
        self.total_children > 0 && self.completed_children >= self.total_children
    }
}

/// Payload for creating a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub user_id: Uuid,
    pub parent_goal_id: Option<Uuid>,
    pub unit_id: Option<Uuid>,
    pub unit_id_completed: Option<Uuid>,
    pub unit_completed_amount: Option<f64>,
    pub title: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target: Option<f64>,
}

impl NewGoal {
    /// Validate this payload.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Goal title cannot be empty".to_string());
        }
        if self.title.len() > 255 {
            return Err("Goal title cannot exceed 255 characters".to_string());
        }
        if self.goal_type == GoalType::Target {
            if self.unit_id.is_none() {
                return Err("A unit is required for target goals".to_string());
            }
            match self.target {
                Some(t) if t.is_finite() && t > 0.0 => {}
                _ => return Err("A positive finite target is required for target goals".to_string()),
            }
        }
        match (self.unit_id_completed, self.unit_completed_amount) {
            (None, None) => {}
            (Some(_), Some(amount)) => {
                if !amount.is_finite() || amount <= 0.0 {
                    return Err("Completion bonus amount must be positive and finite".to_string());
                }
            }
            _ => {
                return Err(
                    "Completion bonus requires both a unit and an amount".to_string(),
                )
            }
        }
        Ok(())
    }

    /// Materialize a goal, assigning an id and per-type initial state.
    pub fn into_goal(self, now: DateTime<Utc>) -> Goal {
        let (target, current_progress) = match self.goal_type {
            GoalType::Target => (self.target, Some(0.0)),
            GoalType::Manual => (None, None),
            // Containers start as an empty rollup.
            GoalType::Goals => (Some(0.0), Some(0.0)),
        };
        Goal {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            parent_goal_id: self.parent_goal_id,
            unit_id: self.unit_id,
            unit_id_completed: self.unit_id_completed,
            unit_completed_amount: self.unit_completed_amount,
            title: self.title,
            description: self.description,
            goal_type: self.goal_type,
            target,
            current_progress,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Editable fields of an existing goal. Structural fields (type, parent,
/// unit, target) are fixed at creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl GoalUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err("Goal title cannot be empty".to_string());
            }
            if title.len() > 255 {
                return Err("Goal title cannot exceed 255 characters".to_string());
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}
