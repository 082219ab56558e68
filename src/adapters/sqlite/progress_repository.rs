//! SQLite implementation of the ProgressRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DailyProgress, GoalType, ProgressEntry};
use crate::domain::ports::{ProgressRepository, RecordedProgress};
use crate::domain::time::format_utc;

use super::goal_repository::{fetch_goal, persist_goal_state};
use super::propagation::recompute_chain;
use super::stats_repository::append_stat_credit;

#[derive(Clone)]
pub struct SqliteProgressRepository {
    pool: SqlitePool,
}

impl SqliteProgressRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressRepository for SqliteProgressRepository {
    async fn record(
        &self,
        goal_id: Uuid,
        amount: Option<f64>,
        now: DateTime<Utc>,
    ) -> DomainResult<RecordedProgress> {
        let mut tx = self.pool.begin().await?;

        // Re-read inside the transaction; the service's copy may be stale.
        let Some(mut goal) = fetch_goal(&mut tx, goal_id).await? else {
            return Err(DomainError::GoalNotFound(goal_id));
        };

        let entry = ProgressEntry { id: Uuid::new_v4(), goal_id, progress: amount, created_at: now };
        sqlx::query(
            "INSERT INTO goal_progress (id, goal_id, progress, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.goal_id.to_string())
        .bind(entry.progress)
        .bind(format_utc(entry.created_at))
        .execute(&mut *tx)
        .await?;

        if goal.goal_type == GoalType::Target {
            let amount = amount.unwrap_or(0.0);
            let outcome = goal.apply_increment(amount, now);
            persist_goal_state(&mut tx, &goal).await?;

            if let Some(unit_id) = goal.unit_id {
                append_stat_credit(&mut tx, goal.user_id, unit_id, amount, now).await?;
            }
            if outcome.newly_completed {
                if let Some((unit_id, bonus)) = goal.completion_bonus() {
                    append_stat_credit(&mut tx, goal.user_id, unit_id, bonus, now).await?;
                }
            }
        }

        recompute_chain(&mut tx, goal.parent_goal_id, now).await?;

        tx.commit().await?;
        Ok(RecordedProgress { entry, goal })
    }

    async fn daily_history(&self, goal_id: Uuid) -> DomainResult<Vec<DailyProgress>> {
        let rows: Vec<(String, f64)> = sqlx::query_as(
            "SELECT date(created_at), COALESCE(SUM(progress), 0) FROM goal_progress \
             WHERE goal_id = ? \
             GROUP BY date(created_at) ORDER BY date(created_at)",
        )
        .bind(goal_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(date, progress)| DailyProgress { date, progress }).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use sqlx::SqlitePool;

    use super::*;
    use crate::adapters::sqlite::testing::{seed_unit, seed_user, test_pool};
    use crate::adapters::sqlite::SqliteGoalRepository;
    use crate::domain::models::{Goal, NewGoal};
    use crate::domain::ports::GoalRepository;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    }

    fn target_goal(user_id: Uuid, unit_id: Uuid, target: f64) -> Goal {
        NewGoal {
            user_id,
            parent_goal_id: None,
            unit_id: Some(unit_id),
            unit_id_completed: None,
            unit_completed_amount: None,
            title: "Run 100 km".to_string(),
            description: None,
            goal_type: GoalType::Target,
            target: Some(target),
        }
        .into_goal(base_time())
    }

    async fn stat_total(pool: &SqlitePool, unit_id: Uuid) -> f64 {
        let (total,): (f64,) =
            sqlx::query_as("SELECT COALESCE(SUM(value), 0.0) FROM user_stats WHERE unit_id = ?")
                .bind(unit_id.to_string())
                .fetch_one(pool)
                .await
                .unwrap();
        total
    }

    #[tokio::test]
    async fn test_record_appends_and_accumulates() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let km = seed_unit(&pool).await;
        let goals = SqliteGoalRepository::new(pool.clone());
        let repo = SqliteProgressRepository::new(pool.clone());

        let goal = target_goal(user, km, 100.0);
        goals.create(&goal).await.unwrap();

        let first = repo.record(goal.id, Some(30.0), base_time()).await.unwrap();
        assert_eq!(first.goal.current_progress, Some(30.0));
        assert!(!first.goal.is_completed());
        assert_eq!(first.entry.progress, Some(30.0));

        let second = repo
            .record(goal.id, Some(20.0), base_time() + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(second.goal.current_progress, Some(50.0));

        // One ledger row per event, one credit per event.
        let (events,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM goal_progress WHERE goal_id = ?")
                .bind(goal.id.to_string())
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(events, 2);
        assert_eq!(stat_total(&pool, km).await, 50.0);
    }

    #[tokio::test]
    async fn test_record_latches_completion_and_credits_bonus() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let km = seed_unit(&pool).await;
        let badge = seed_unit(&pool).await;
        let goals = SqliteGoalRepository::new(pool.clone());
        let repo = SqliteProgressRepository::new(pool.clone());

        let mut goal = target_goal(user, km, 50.0);
        goal.unit_id_completed = Some(badge);
        goal.unit_completed_amount = Some(1.0);
        goals.create(&goal).await.unwrap();

        let outcome = repo.record(goal.id, Some(50.0), base_time()).await.unwrap();
        assert_eq!(outcome.goal.completed_at, Some(base_time()));
        assert_eq!(stat_total(&pool, badge).await, 1.0);

        // Progress past the target keeps accumulating without a second bonus.
        let later = base_time() + chrono::Duration::hours(2);
        let outcome = repo.record(goal.id, Some(10.0), later).await.unwrap();
        assert_eq!(outcome.goal.current_progress, Some(60.0));
        assert_eq!(outcome.goal.completed_at, Some(base_time()));
        assert_eq!(stat_total(&pool, badge).await, 1.0);
        assert_eq!(stat_total(&pool, km).await, 60.0);
    }

    #[tokio::test]
    async fn test_record_manual_event_has_no_side_effects() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let km = seed_unit(&pool).await;
        let goals = SqliteGoalRepository::new(pool.clone());
        let repo = SqliteProgressRepository::new(pool.clone());

        let mut goal = target_goal(user, km, 100.0);
        goal.goal_type = GoalType::Manual;
        goal.unit_id = None;
        goal.target = None;
        goal.current_progress = None;
        goals.create(&goal).await.unwrap();

        let outcome = repo.record(goal.id, None, base_time()).await.unwrap();
        assert_eq!(outcome.entry.progress, None);
        assert_eq!(outcome.goal.current_progress, None);
        assert!(!outcome.goal.is_completed());
        assert_eq!(stat_total(&pool, km).await, 0.0);
    }

    #[tokio::test]
    async fn test_record_completion_propagates_to_parent() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let km = seed_unit(&pool).await;
        let goals = SqliteGoalRepository::new(pool.clone());
        let repo = SqliteProgressRepository::new(pool.clone());

        let container = NewGoal {
            user_id: user,
            parent_goal_id: None,
            unit_id: None,
            unit_id_completed: None,
            unit_completed_amount: None,
            title: "Season".to_string(),
            description: None,
            goal_type: GoalType::Goals,
            target: None,
        }
        .into_goal(base_time());
        goals.create(&container).await.unwrap();

        let mut child = target_goal(user, km, 10.0);
        child.parent_goal_id = Some(container.id);
        goals.create(&child).await.unwrap();

        // Half-way: the parent fraction reflects zero completed children.
        repo.record(child.id, Some(5.0), base_time()).await.unwrap();
        let parent = goals.get(container.id).await.unwrap().unwrap();
        assert_eq!(parent.target, Some(1.0));
        assert_eq!(parent.current_progress, Some(0.0));

        // Crossing the target completes the child and then the parent.
        repo.record(child.id, Some(5.0), base_time()).await.unwrap();
        let parent = goals.get(container.id).await.unwrap().unwrap();
        assert_eq!(parent.current_progress, Some(1.0));
        assert!(parent.is_completed());
    }

    #[tokio::test]
    async fn test_record_unknown_goal_is_not_found() {
        let pool = test_pool().await;
        let repo = SqliteProgressRepository::new(pool);
        let err = repo.record(Uuid::new_v4(), Some(1.0), base_time()).await.unwrap_err();
        assert!(matches!(err, DomainError::GoalNotFound(_)));
    }

    #[tokio::test]
    async fn test_daily_history_buckets_by_utc_day() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let km = seed_unit(&pool).await;
        let goals = SqliteGoalRepository::new(pool.clone());
        let repo = SqliteProgressRepository::new(pool.clone());

        let goal = target_goal(user, km, 1000.0);
        goals.create(&goal).await.unwrap();

        let day1 = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let day1_later = Utc.with_ymd_and_hms(2024, 1, 15, 22, 30, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2024, 1, 16, 7, 0, 0).unwrap();
        repo.record(goal.id, Some(5.0), day1).await.unwrap();
        repo.record(goal.id, Some(3.0), day1_later).await.unwrap();
        repo.record(goal.id, Some(2.0), day2).await.unwrap();

        let history = repo.daily_history(goal.id).await.unwrap();
        assert_eq!(
            history,
            vec![
                DailyProgress { date: "2024-01-15".to_string(), progress: 8.0 },
                DailyProgress { date: "2024-01-16".to_string(), progress: 2.0 },
            ]
        );
    }
}
