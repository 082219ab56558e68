//! Progress ledger service.
//!
//! Validates progress events before they reach the ledger. Everything that
//! happens after validation (the appended row, goal totals, completion,
//! credits, parent rollups) is one atomic repository operation.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DailyProgress, GoalType};
use crate::domain::ports::{Clock, GoalRepository, ProgressRepository, RecordedProgress};

pub struct ProgressService<G: GoalRepository, P: ProgressRepository> {
    goals: Arc<G>,
    ledger: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<G: GoalRepository, P: ProgressRepository> ProgressService<G, P> {
    pub fn new(goals: Arc<G>, ledger: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self { goals, ledger, clock }
    }

    /// Record one progress event against a goal.
    ///
    /// Containers derive their progress from children and never accept
    /// direct events. Manual goals accept the event as a bare marker; the
    /// stored amount is always NULL for them.
    pub async fn record_progress(
        &self,
        caller: Uuid,
        goal_id: Uuid,
        amount: Option<f64>,
    ) -> DomainResult<RecordedProgress> {
        let goal = self.goals.get(goal_id).await?.ok_or(DomainError::GoalNotFound(goal_id))?;
        if goal.user_id != caller {
            return Err(DomainError::Forbidden("goal belongs to another user".to_string()));
        }
        if goal.goal_type.is_container() {
            return Err(DomainError::InvalidOperation(
                "container goals derive progress from their children".to_string(),
            ));
        }
        if let Some(amount) = amount {
            // Negative increments would open an un-latch path for completed
            // goals, so they are refused outright.
            if !amount.is_finite() || amount < 0.0 {
                return Err(DomainError::ValidationFailed(
                    "progress amount must be a non-negative finite number".to_string(),
                ));
            }
        }

        let effective = match goal.goal_type {
            GoalType::Target => Some(amount.unwrap_or(0.0)),
            _ => None,
        };
        self.ledger.record(goal_id, effective, self.clock.now()).await
    }

    /// Day-bucketed progress history of a target goal. Other goal types have
    /// no meaningful series and yield an empty one.
    pub async fn goal_history(
        &self,
        caller: Uuid,
        goal_id: Uuid,
    ) -> DomainResult<Vec<DailyProgress>> {
        let goal = self.goals.get(goal_id).await?.ok_or(DomainError::GoalNotFound(goal_id))?;
        if goal.user_id != caller {
            return Err(DomainError::Forbidden("goal belongs to another user".to_string()));
        }
        if goal.goal_type != GoalType::Target {
            return Ok(Vec::new());
        }
        self.ledger.daily_history(goal_id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use sqlx::SqlitePool;

    use super::*;
    use crate::adapters::sqlite::testing::{seed_unit, seed_user, test_pool};
    use crate::adapters::sqlite::{SqliteGoalRepository, SqliteProgressRepository};
    use crate::domain::models::NewGoal;
    use crate::domain::ports::FixedClock;

    struct Fixture {
        pool: SqlitePool,
        service: ProgressService<SqliteGoalRepository, SqliteProgressRepository>,
        goals: Arc<SqliteGoalRepository>,
        user_id: Uuid,
        unit_id: Uuid,
    }

    fn base_time() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    }

    async fn setup() -> Fixture {
        let pool = test_pool().await;
        let user_id = seed_user(&pool).await;
        let unit_id = seed_unit(&pool).await;
        let goals = Arc::new(SqliteGoalRepository::new(pool.clone()));
        let service = ProgressService::new(
            goals.clone(),
            Arc::new(SqliteProgressRepository::new(pool.clone())),
            Arc::new(FixedClock(base_time())),
        );
        Fixture { pool, service, goals, user_id, unit_id }
    }

    async fn create(fx: &Fixture, goal_type: GoalType) -> Uuid {
        let goal = NewGoal {
            user_id: fx.user_id,
            parent_goal_id: None,
            unit_id: (goal_type == GoalType::Target).then_some(fx.unit_id),
            unit_id_completed: None,
            unit_completed_amount: None,
            title: "Goal".to_string(),
            description: None,
            goal_type,
            target: (goal_type == GoalType::Target).then_some(100.0),
        }
        .into_goal(base_time());
        fx.goals.create(&goal).await.unwrap();
        goal.id
    }

    async fn ledger_rows(fx: &Fixture, goal_id: Uuid) -> i64 {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM goal_progress WHERE goal_id = ?")
                .bind(goal_id.to_string())
                .fetch_one(&fx.pool)
                .await
                .unwrap();
        count
    }

    #[tokio::test]
    async fn test_container_rejects_direct_progress() {
        let fx = setup().await;
        let container = create(&fx, GoalType::Goals).await;

        let err = fx
            .service
            .record_progress(fx.user_id, container, Some(5.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidOperation(_)));
        // Nothing was appended.
        assert_eq!(ledger_rows(&fx, container).await, 0);
    }

    #[tokio::test]
    async fn test_rejects_negative_and_non_finite_amounts() {
        let fx = setup().await;
        let goal = create(&fx, GoalType::Target).await;

        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = fx
                .service
                .record_progress(fx.user_id, goal, Some(bad))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::ValidationFailed(_)));
        }
        assert_eq!(ledger_rows(&fx, goal).await, 0);
    }

    #[tokio::test]
    async fn test_manual_event_stores_null_amount() {
        let fx = setup().await;
        let goal = create(&fx, GoalType::Manual).await;

        // An amount on a manual goal is ignored, not stored.
        let recorded = fx
            .service
            .record_progress(fx.user_id, goal, Some(7.0))
            .await
            .unwrap();
        assert_eq!(recorded.entry.progress, None);
        assert_eq!(ledger_rows(&fx, goal).await, 1);
    }

    #[tokio::test]
    async fn test_missing_amount_on_target_counts_as_zero() {
        let fx = setup().await;
        let goal = create(&fx, GoalType::Target).await;

        let recorded = fx.service.record_progress(fx.user_id, goal, None).await.unwrap();
        assert_eq!(recorded.entry.progress, Some(0.0));
        assert_eq!(recorded.goal.current_progress, Some(0.0));
    }

    #[tokio::test]
    async fn test_record_progress_is_owner_scoped() {
        let fx = setup().await;
        let goal = create(&fx, GoalType::Target).await;

        let err = fx
            .service
            .record_progress(Uuid::new_v4(), goal, Some(1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_history_is_empty_for_non_target_goals() {
        let fx = setup().await;
        let manual = create(&fx, GoalType::Manual).await;
        fx.service.record_progress(fx.user_id, manual, None).await.unwrap();

        let history = fx.service.goal_history(fx.user_id, manual).await.unwrap();
        assert!(history.is_empty());

        let target = create(&fx, GoalType::Target).await;
        fx.service.record_progress(fx.user_id, target, Some(4.0)).await.unwrap();
        let history = fx.service.goal_history(fx.user_id, target).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].progress, 4.0);
    }
}
