//! Goal repository port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Goal, GoalCounts, GoalType, GoalUpdate, StatsWindow};

/// Filter criteria for listing goals. Clauses combine with AND; the user
/// scope is mandatory so a query can never span tenants.
#[derive(Debug, Clone)]
pub struct GoalFilter {
    pub user_id: Uuid,
    /// Inclusive creation-window lower bound
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive creation-window upper bound
    pub created_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring over title and description
    pub search: Option<String>,
    pub completed: Option<bool>,
    pub goal_type: Option<GoalType>,
    /// Exclude goals that live inside a container
    pub roots_only: bool,
}

impl GoalFilter {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            created_from: None,
            created_to: None,
            search: None,
            completed: None,
            goal_type: None,
            roots_only: false,
        }
    }
}

/// 1-based pagination request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PageRequest {
    /// Clamp page and limit to at least 1.
    pub fn normalized(self) -> Self {
        Self { page: self.page.max(1), limit: self.limit.max(1) }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// One page of goals plus the over-fetch signal.
#[derive(Debug, Clone)]
pub struct GoalPage {
    pub data: Vec<Goal>,
    /// Rows fetched before truncation (at most `limit + 1`)
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

/// Repository interface for Goal persistence.
///
/// Methods that touch more than one row (create/delete under a parent,
/// manual completion) are single operations here so implementations can run
/// the whole sequence in one transaction.
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// Persist a new goal. When it has a parent, the parent chain rollup
    /// runs in the same transaction.
    async fn create(&self, goal: &Goal) -> DomainResult<()>;

    /// Get a goal by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Goal>>;

    /// Direct children of a container, in creation order.
    async fn children(&self, parent_id: Uuid) -> DomainResult<Vec<Goal>>;

    /// List goals matching the filter, fetching up to `limit + 1` rows so
    /// the caller can derive `has_more`.
    async fn list(&self, filter: &GoalFilter, page: PageRequest) -> DomainResult<Vec<Goal>>;

    /// Update title/description and return the new state.
    async fn update_details(
        &self,
        id: Uuid,
        update: &GoalUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<Goal>;

    /// Delete a goal. When it had a parent, the parent chain rollup runs in
    /// the same transaction.
    async fn delete(&self, id: Uuid, now: DateTime<Utc>) -> DomainResult<()>;

    /// One-way completion of a manual goal: latch `completed_at`, credit any
    /// configured bonus, update the parent chain, all atomically. Fails with
    /// `InvalidOperation` when the goal is already complete.
    async fn complete_manual(&self, id: Uuid, now: DateTime<Utc>) -> DomainResult<Goal>;

    /// Goal counts over a creation window.
    async fn count_in_window(&self, user_id: Uuid, window: &StatsWindow)
        -> DomainResult<GoalCounts>;
}
