//! SQLite implementation of the GoalRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Goal, GoalCounts, GoalType, GoalUpdate, StatsWindow};
use crate::domain::ports::{GoalFilter, GoalRepository, PageRequest};
use crate::domain::time::format_utc;

use super::predicates::{Predicates, SqlValue};
use super::propagation::recompute_chain;
use super::stats_repository::append_stat_credit;
use super::{parse_datetime, parse_optional_datetime, parse_optional_uuid, parse_uuid};

const GOAL_COLUMNS: &str = "id, user_id, parent_goal_id, unit_id, unit_id_completed, \
     unit_completed_amount, title, description, goal_type, target, current_progress, \
     completed_at, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteGoalRepository {
    pool: SqlitePool,
}

impl SqliteGoalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GoalRepository for SqliteGoalRepository {
    async fn create(&self, goal: &Goal) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO goals (id, user_id, parent_goal_id, unit_id, unit_id_completed, \
             unit_completed_amount, title, description, goal_type, target, current_progress, \
             completed_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(goal.id.to_string())
        .bind(goal.user_id.to_string())
        .bind(goal.parent_goal_id.map(|id| id.to_string()))
        .bind(goal.unit_id.map(|id| id.to_string()))
        .bind(goal.unit_id_completed.map(|id| id.to_string()))
        .bind(goal.unit_completed_amount)
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.goal_type.as_str())
        .bind(goal.target)
        .bind(goal.current_progress)
        .bind(goal.completed_at.map(format_utc))
        .bind(format_utc(goal.created_at))
        .bind(format_utc(goal.updated_at))
        .execute(&mut *tx)
        .await?;

        // A new child changes its parent's completion fraction.
        recompute_chain(&mut tx, goal.parent_goal_id, goal.created_at).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Goal>> {
        let mut conn = self.pool.acquire().await?;
        fetch_goal(&mut conn, id).await
    }

    async fn children(&self, parent_id: Uuid) -> DomainResult<Vec<Goal>> {
        let rows: Vec<GoalRow> = sqlx::query_as(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE parent_goal_id = ? \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(parent_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Goal::try_from).collect()
    }

    async fn list(&self, filter: &GoalFilter, page: PageRequest) -> DomainResult<Vec<Goal>> {
        let mut predicates = Predicates::new();
        predicates.eq("user_id", filter.user_id.to_string());
        if let Some(from) = filter.created_from {
            predicates.gte("created_at", format_utc(from));
        }
        if let Some(to) = filter.created_to {
            predicates.lte("created_at", format_utc(to));
        }
        if let Some(search) = &filter.search {
            predicates.search(&["title", "description"], search);
        }
        match filter.completed {
            Some(true) => {
                predicates.raw("completed_at IS NOT NULL");
            }
            Some(false) => {
                predicates.raw("completed_at IS NULL");
            }
            None => {}
        }
        if let Some(goal_type) = filter.goal_type {
            predicates.eq("goal_type", goal_type.as_str());
        }
        if filter.roots_only {
            predicates.raw("parent_goal_id IS NULL");
        }

        let page = page.normalized();
        let sql = format!(
            "SELECT {GOAL_COLUMNS} FROM goals{} ORDER BY created_at DESC, id DESC \
             LIMIT ? OFFSET ?",
            predicates.where_sql()
        );

        let mut query = sqlx::query_as::<_, GoalRow>(&sql);
        for value in predicates.binds() {
            query = match value {
                SqlValue::Text(text) => query.bind(text.clone()),
                SqlValue::Integer(int) => query.bind(*int),
            };
        }
        let rows = query
            // Over-fetch one row so the caller can tell whether more pages exist.
            .bind(page.limit + 1)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Goal::try_from).collect()
    }

    async fn update_details(
        &self,
        id: Uuid,
        update: &GoalUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<Goal> {
        let mut tx = self.pool.begin().await?;

        let Some(mut goal) = fetch_goal(&mut tx, id).await? else {
            return Err(DomainError::GoalNotFound(id));
        };
        if let Some(title) = &update.title {
            goal.title = title.clone();
        }
        if let Some(description) = &update.description {
            goal.description = Some(description.clone());
        }
        goal.updated_at = now;

        sqlx::query("UPDATE goals SET title = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(&goal.title)
            .bind(&goal.description)
            .bind(format_utc(goal.updated_at))
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(goal)
    }

    async fn delete(&self, id: Uuid, now: DateTime<Utc>) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        let Some(goal) = fetch_goal(&mut tx, id).await? else {
            return Err(DomainError::GoalNotFound(id));
        };

        // Descendants and their ledger rows go with it via FK cascade.
        sqlx::query("DELETE FROM goals WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        recompute_chain(&mut tx, goal.parent_goal_id, now).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn complete_manual(&self, id: Uuid, now: DateTime<Utc>) -> DomainResult<Goal> {
        let mut tx = self.pool.begin().await?;

        let Some(mut goal) = fetch_goal(&mut tx, id).await? else {
            return Err(DomainError::GoalNotFound(id));
        };

        // Guarded latch: a racing second completion loses on the WHERE
        // clause, so the bonus can never be credited twice.
        let result = sqlx::query(
            "UPDATE goals SET completed_at = ?, updated_at = ? \
             WHERE id = ? AND completed_at IS NULL",
        )
        .bind(format_utc(now))
        .bind(format_utc(now))
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DomainError::InvalidOperation(
                "goal is already completed".to_string(),
            ));
        }

        if let Some((unit_id, amount)) = goal.completion_bonus() {
            append_stat_credit(&mut tx, goal.user_id, unit_id, amount, now).await?;
        }

        recompute_chain(&mut tx, goal.parent_goal_id, now).await?;

        tx.commit().await?;

        goal.completed_at = Some(now);
        goal.updated_at = now;
        Ok(goal)
    }

    async fn count_in_window(
        &self,
        user_id: Uuid,
        window: &StatsWindow,
    ) -> DomainResult<GoalCounts> {
        let (total_goals, completed_goals): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(completed_at) FROM goals \
             WHERE user_id = ? AND created_at >= ? AND created_at <= ?",
        )
        .bind(user_id.to_string())
        .bind(format_utc(window.start))
        .bind(format_utc(window.end))
        .fetch_one(&self.pool)
        .await?;

        Ok(GoalCounts { total_goals, completed_goals })
    }
}

/// Fetch one goal through an open connection or transaction.
pub(super) async fn fetch_goal(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> DomainResult<Option<Goal>> {
    let row: Option<GoalRow> =
        sqlx::query_as(&format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await?;
    row.map(Goal::try_from).transpose()
}

/// Write back the fields that increments and rollups mutate.
pub(super) async fn persist_goal_state(
    conn: &mut SqliteConnection,
    goal: &Goal,
) -> DomainResult<()> {
    sqlx::query(
        "UPDATE goals SET target = ?, current_progress = ?, completed_at = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(goal.target)
    .bind(goal.current_progress)
    .bind(goal.completed_at.map(format_utc))
    .bind(format_utc(goal.updated_at))
    .bind(goal.id.to_string())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct GoalRow {
    id: String,
    user_id: String,
    parent_goal_id: Option<String>,
    unit_id: Option<String>,
    unit_id_completed: Option<String>,
    unit_completed_amount: Option<f64>,
    title: String,
    description: Option<String>,
    goal_type: String,
    target: Option<f64>,
    current_progress: Option<f64>,
    completed_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<GoalRow> for Goal {
    type Error = DomainError;

    fn try_from(row: GoalRow) -> Result<Self, Self::Error> {
        Ok(Goal {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            parent_goal_id: parse_optional_uuid(row.parent_goal_id)?,
            unit_id: parse_optional_uuid(row.unit_id)?,
            unit_id_completed: parse_optional_uuid(row.unit_id_completed)?,
            unit_completed_amount: row.unit_completed_amount,
            title: row.title,
            description: row.description,
            goal_type: GoalType::from_str(&row.goal_type).ok_or_else(|| {
                DomainError::SerializationError(format!("unknown goal type: {}", row.goal_type))
            })?,
            target: row.target,
            current_progress: row.current_progress,
            completed_at: parse_optional_datetime(row.completed_at)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
