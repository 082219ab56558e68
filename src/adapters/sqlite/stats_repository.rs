//! SQLite implementation of the StatsRepository.
//!
//! Read-side aggregation over the two append-only ledgers. Timestamps are
//! stored as fixed-width UTC strings, so window bounds compare correctly as
//! text and `date()` buckets rows by UTC day.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DayCount, DayValue, GoalTotal, StatEntry, StatsWindow};
use crate::domain::ports::StatsRepository;
use crate::domain::time::format_utc;

use super::parse_uuid;

#[derive(Clone)]
pub struct SqliteStatsRepository {
    pool: SqlitePool,
}

impl SqliteStatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for SqliteStatsRepository {
    async fn sum_by_unit(
        &self,
        user_id: Uuid,
        window: &StatsWindow,
    ) -> DomainResult<Vec<(Uuid, f64)>> {
        let rows: Vec<(String, f64)> = sqlx::query_as(
            "SELECT unit_id, COALESCE(SUM(value), 0) FROM user_stats \
             WHERE user_id = ? AND created_at >= ? AND created_at <= ? \
             GROUP BY unit_id ORDER BY unit_id",
        )
        .bind(user_id.to_string())
        .bind(format_utc(window.start))
        .bind(format_utc(window.end))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(unit_id, total)| Ok((parse_uuid(&unit_id)?, total)))
            .collect()
    }

    async fn unit_daily_progress(
        &self,
        unit_id: Uuid,
        user_id: Uuid,
        window: &StatsWindow,
    ) -> DomainResult<Vec<DayValue>> {
        let rows: Vec<(String, f64)> = sqlx::query_as(
            "SELECT date(gp.created_at), COALESCE(SUM(gp.progress), 0) \
             FROM goal_progress gp \
             INNER JOIN goals g ON g.id = gp.goal_id \
             WHERE g.unit_id = ? AND g.user_id = ? \
               AND gp.created_at >= ? AND gp.created_at <= ? \
             GROUP BY date(gp.created_at) ORDER BY date(gp.created_at)",
        )
        .bind(unit_id.to_string())
        .bind(user_id.to_string())
        .bind(format_utc(window.start))
        .bind(format_utc(window.end))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(date, value)| DayValue { date, value }).collect())
    }

    async fn unit_daily_activity(
        &self,
        unit_id: Uuid,
        user_id: Uuid,
        window: &StatsWindow,
    ) -> DomainResult<Vec<DayCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT date(gp.created_at), COUNT(*) \
             FROM goal_progress gp \
             INNER JOIN goals g ON g.id = gp.goal_id \
             WHERE g.unit_id = ? AND g.user_id = ? \
               AND gp.created_at >= ? AND gp.created_at <= ? \
             GROUP BY date(gp.created_at) ORDER BY date(gp.created_at)",
        )
        .bind(unit_id.to_string())
        .bind(user_id.to_string())
        .bind(format_utc(window.start))
        .bind(format_utc(window.end))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(date, count)| DayCount { date, count }).collect())
    }

    async fn unit_goal_totals(
        &self,
        unit_id: Uuid,
        user_id: Uuid,
        window: &StatsWindow,
    ) -> DomainResult<Vec<GoalTotal>> {
        let rows: Vec<(String, String, f64)> = sqlx::query_as(
            "SELECT g.id, g.title, COALESCE(SUM(gp.progress), 0) AS total \
             FROM goal_progress gp \
             INNER JOIN goals g ON g.id = gp.goal_id \
             WHERE g.unit_id = ? AND g.user_id = ? \
               AND gp.created_at >= ? AND gp.created_at <= ? \
             GROUP BY g.id, g.title ORDER BY total DESC",
        )
        .bind(unit_id.to_string())
        .bind(user_id.to_string())
        .bind(format_utc(window.start))
        .bind(format_utc(window.end))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(goal_id, goal_title, total_progress)| {
                Ok(GoalTotal { goal_id: parse_uuid(&goal_id)?, goal_title, total_progress })
            })
            .collect()
    }
}

/// Append one credit row to the user stats ledger.
///
/// Every write to `user_stats` in the system goes through here, inside
/// whichever transaction produced the credit.
pub(super) async fn append_stat_credit(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    unit_id: Uuid,
    value: f64,
    now: DateTime<Utc>,
) -> DomainResult<StatEntry> {
    let entry = StatEntry { id: Uuid::new_v4(), user_id, unit_id, value, created_at: now };

    sqlx::query(
        "INSERT INTO user_stats (id, user_id, unit_id, value, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(entry.id.to_string())
    .bind(entry.user_id.to_string())
    .bind(entry.unit_id.to_string())
    .bind(entry.value)
    .bind(format_utc(entry.created_at))
    .execute(&mut *conn)
    .await?;

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use sqlx::SqlitePool;

    use super::*;
    use crate::adapters::sqlite::testing::{seed_unit, seed_user, test_pool};

    fn day(d: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, hour, 0, 0).unwrap()
    }

    async fn credit(pool: &SqlitePool, user: Uuid, unit: Uuid, value: f64, at: DateTime<Utc>) {
        let mut conn = pool.acquire().await.unwrap();
        append_stat_credit(&mut conn, user, unit, value, at).await.unwrap();
    }

    #[tokio::test]
    async fn test_sum_by_unit_respects_window_bounds() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let km = seed_unit(&pool).await;
        let pages = seed_unit(&pool).await;

        credit(&pool, user, km, 5.0, day(10, 8)).await;
        credit(&pool, user, km, 3.0, day(12, 8)).await;
        credit(&pool, user, pages, 40.0, day(12, 9)).await;
        // Outside the window.
        credit(&pool, user, km, 99.0, day(20, 8)).await;

        let repo = SqliteStatsRepository::new(pool);
        let window = StatsWindow::new(day(10, 0), day(15, 0)).unwrap();
        let sums = repo.sum_by_unit(user, &window).await.unwrap();

        assert_eq!(sums.len(), 2);
        let km_total = sums.iter().find(|(id, _)| *id == km).unwrap().1;
        let pages_total = sums.iter().find(|(id, _)| *id == pages).unwrap().1;
        assert_eq!(km_total, 8.0);
        assert_eq!(pages_total, 40.0);
    }

    #[tokio::test]
    async fn test_sum_by_unit_is_user_scoped() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let other = seed_user(&pool).await;
        let km = seed_unit(&pool).await;

        credit(&pool, user, km, 5.0, day(10, 8)).await;
        credit(&pool, other, km, 100.0, day(10, 9)).await;

        let repo = SqliteStatsRepository::new(pool);
        let window = StatsWindow::new(day(1, 0), day(31, 0)).unwrap();
        let sums = repo.sum_by_unit(user, &window).await.unwrap();

        assert_eq!(sums, vec![(km, 5.0)]);
    }

    #[tokio::test]
    async fn test_window_boundaries_are_inclusive() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let km = seed_unit(&pool).await;

        let start = day(10, 0);
        let end = day(15, 0);
        credit(&pool, user, km, 1.0, start).await;
        credit(&pool, user, km, 2.0, end).await;
        credit(&pool, user, km, 4.0, end + chrono::Duration::milliseconds(1)).await;

        let repo = SqliteStatsRepository::new(pool);
        let window = StatsWindow::new(start, end).unwrap();
        let sums = repo.sum_by_unit(user, &window).await.unwrap();
        assert_eq!(sums, vec![(km, 3.0)]);
    }
}
