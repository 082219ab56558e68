//! Goal service implementing business logic.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Goal, GoalCounts, GoalType, GoalUpdate, NewGoal, StatsWindow};
use crate::domain::ports::{Clock, GoalFilter, GoalPage, GoalRepository, PageRequest, UnitRepository};

pub struct GoalService<G: GoalRepository, U: UnitRepository> {
    goals: Arc<G>,
    units: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<G: GoalRepository, U: UnitRepository> GoalService<G, U> {
    pub fn new(goals: Arc<G>, units: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { goals, units, clock }
    }

    /// Create a new goal for the user named in the payload.
    ///
    /// The parent, when given, must exist, belong to the same user and be a
    /// container. Referenced units must exist; the schema would catch a
    /// dangling id too, but checking first turns it into a client error.
    pub async fn create_goal(&self, new_goal: NewGoal) -> DomainResult<Goal> {
        new_goal.validate().map_err(DomainError::ValidationFailed)?;

        if let Some(parent_id) = new_goal.parent_goal_id {
            let parent = self
                .goals
                .get(parent_id)
                .await?
                .ok_or(DomainError::GoalNotFound(parent_id))?;
            if parent.user_id != new_goal.user_id {
                return Err(DomainError::Forbidden("goal belongs to another user".to_string()));
            }
            if !parent.goal_type.is_container() {
                return Err(DomainError::InvalidOperation(
                    "parent goal is not a container".to_string(),
                ));
            }
        }

        for unit_id in [new_goal.unit_id, new_goal.unit_id_completed].into_iter().flatten() {
            if self.units.get(unit_id).await?.is_none() {
                return Err(DomainError::UnitNotFound(unit_id));
            }
        }

        let goal = new_goal.into_goal(self.clock.now());
        self.goals.create(&goal).await?;
        Ok(goal)
    }

    /// Get a goal with, for containers, its direct children.
    pub async fn get_goal(&self, caller: Uuid, id: Uuid) -> DomainResult<(Goal, Vec<Goal>)> {
        let goal = self.owned_goal(caller, id).await?;
        let children = if goal.goal_type.is_container() {
            self.goals.children(goal.id).await?
        } else {
            Vec::new()
        };
        Ok((goal, children))
    }

    /// List goals matching the filter, one page at a time.
    pub async fn list_goals(
        &self,
        filter: GoalFilter,
        page: PageRequest,
    ) -> DomainResult<GoalPage> {
        let page = page.normalized();
        let mut rows = self.goals.list(&filter, page).await?;

        // The repository over-fetched one row; its presence is the signal
        // that another page exists.
        #[allow(clippy::cast_possible_wrap)]
        let total = rows.len() as i64;
        let has_more = total > page.limit;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        rows.truncate(page.limit as usize);

        Ok(GoalPage { data: rows, total, page: page.page, limit: page.limit, has_more })
    }

    /// Edit title and description. Structural fields never change after
    /// creation.
    pub async fn update_goal(
        &self,
        caller: Uuid,
        id: Uuid,
        update: GoalUpdate,
    ) -> DomainResult<Goal> {
        update.validate().map_err(DomainError::ValidationFailed)?;
        self.owned_goal(caller, id).await?;
        self.goals.update_details(id, &update, self.clock.now()).await
    }

    /// Mark a manual goal complete. One-way: completing an already-complete
    /// goal is an error, and there is no path back to incomplete.
    pub async fn toggle_completion(&self, caller: Uuid, id: Uuid) -> DomainResult<Goal> {
        let goal = self.owned_goal(caller, id).await?;
        if goal.goal_type != GoalType::Manual {
            return Err(DomainError::InvalidOperation(
                "only manual goals can be completed directly".to_string(),
            ));
        }
        self.goals.complete_manual(id, self.clock.now()).await
    }

    /// Delete a goal. Children and ledger rows cascade with it.
    pub async fn delete_goal(&self, caller: Uuid, id: Uuid) -> DomainResult<()> {
        self.owned_goal(caller, id).await?;
        self.goals.delete(id, self.clock.now()).await
    }

    /// Goal counts over a creation window.
    pub async fn statistics(&self, caller: Uuid, window: StatsWindow) -> DomainResult<GoalCounts> {
        self.goals.count_in_window(caller, &window).await
    }

    async fn owned_goal(&self, caller: Uuid, id: Uuid) -> DomainResult<Goal> {
        let goal = self.goals.get(id).await?.ok_or(DomainError::GoalNotFound(id))?;
        if goal.user_id != caller {
            return Err(DomainError::Forbidden("goal belongs to another user".to_string()));
        }
        Ok(goal)
    }
}
