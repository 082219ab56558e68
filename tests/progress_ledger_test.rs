mod helpers;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use stride::adapters::sqlite::{
    SqliteGoalRepository, SqliteProgressRepository, SqliteStatsRepository, SqliteUnitRepository,
};
use stride::domain::errors::DomainError;
use stride::domain::models::{DailyProgress, GoalType, NewGoal, PeriodType, StatsWindow};
use stride::domain::ports::FixedClock;
use stride::services::{GoalService, ProgressService, StatsService};

use helpers::database::{seed_unit, seed_user, setup_test_db, teardown_test_db};

fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap()
}

fn goal_service(
    pool: &SqlitePool,
    now: DateTime<Utc>,
) -> GoalService<SqliteGoalRepository, SqliteUnitRepository> {
    GoalService::new(
        Arc::new(SqliteGoalRepository::new(pool.clone())),
        Arc::new(SqliteUnitRepository::new(pool.clone())),
        Arc::new(FixedClock(now)),
    )
}

fn progress_service(
    pool: &SqlitePool,
    now: DateTime<Utc>,
) -> ProgressService<SqliteGoalRepository, SqliteProgressRepository> {
    ProgressService::new(
        Arc::new(SqliteGoalRepository::new(pool.clone())),
        Arc::new(SqliteProgressRepository::new(pool.clone())),
        Arc::new(FixedClock(now)),
    )
}

fn stats_service(pool: &SqlitePool) -> StatsService<SqliteStatsRepository, SqliteUnitRepository> {
    StatsService::new(
        Arc::new(SqliteStatsRepository::new(pool.clone())),
        Arc::new(SqliteUnitRepository::new(pool.clone())),
    )
}

async fn credit_sum(pool: &SqlitePool, user: Uuid, unit: Uuid) -> f64 {
    let (sum,): (f64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(value), 0.0) FROM user_stats WHERE user_id = ? AND unit_id = ?",
    )
    .bind(user.to_string())
    .bind(unit.to_string())
    .fetch_one(pool)
    .await
    .expect("failed to sum credits");
    sum
}

async fn credit_rows(pool: &SqlitePool, user: Uuid) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_stats WHERE user_id = ?")
        .bind(user.to_string())
        .fetch_one(pool)
        .await
        .expect("failed to count credits");
    count
}

#[tokio::test]
async fn test_completion_bonus_credited_exactly_once() {
    let pool = setup_test_db().await;
    let user = seed_user(&pool).await;
    let km = seed_unit(&pool, "kilometer").await;
    let points = seed_unit(&pool, "point").await;

    let goal = goal_service(&pool, jan(15))
        .create_goal(NewGoal {
            user_id: user,
            parent_goal_id: None,
            unit_id: Some(km),
            unit_id_completed: Some(points),
            unit_completed_amount: Some(5.0),
            title: "Run 10 km".to_string(),
            description: None,
            goal_type: GoalType::Target,
            target: Some(10.0),
        })
        .await
        .expect("failed to create goal");

    // Short of the target: only the increment is credited.
    let recorded = progress_service(&pool, jan(16))
        .record_progress(user, goal.id, Some(6.0))
        .await
        .expect("record");
    assert!(recorded.goal.completed_at.is_none());
    assert_eq!(credit_sum(&pool, user, km).await, 6.0);
    assert_eq!(credit_sum(&pool, user, points).await, 0.0);

    // Crossing the target latches completion and credits the bonus.
    let recorded = progress_service(&pool, jan(17))
        .record_progress(user, goal.id, Some(4.0))
        .await
        .expect("record");
    assert_eq!(recorded.goal.completed_at, Some(jan(17)));
    assert_eq!(credit_sum(&pool, user, km).await, 10.0);
    assert_eq!(credit_sum(&pool, user, points).await, 5.0);

    // Further progress accumulates without a second bonus.
    let recorded = progress_service(&pool, jan(18))
        .record_progress(user, goal.id, Some(5.0))
        .await
        .expect("record");
    assert_eq!(recorded.goal.completed_at, Some(jan(17)));
    assert_eq!(recorded.goal.current_progress, Some(15.0));
    assert_eq!(credit_sum(&pool, user, km).await, 15.0);
    assert_eq!(credit_sum(&pool, user, points).await, 5.0);
    assert_eq!(credit_rows(&pool, user).await, 4);

    // The credits surface through the stats report.
    let window = StatsWindow::new(jan(1), jan(31)).expect("window");
    let lines = stats_service(&pool)
        .user_stats(user, window, PeriodType::All)
        .await
        .expect("user stats");
    let km_line = lines.iter().find(|l| l.unit.id == km).expect("km line");
    assert_eq!(km_line.current_period, 15.0);
    let points_line = lines.iter().find(|l| l.unit.id == points).expect("points line");
    assert_eq!(points_line.current_period, 5.0);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_manual_completion_credits_bonus_once() {
    let pool = setup_test_db().await;
    let user = seed_user(&pool).await;
    let points = seed_unit(&pool, "point").await;

    let goal = goal_service(&pool, jan(15))
        .create_goal(NewGoal {
            user_id: user,
            parent_goal_id: None,
            unit_id: None,
            unit_id_completed: Some(points),
            unit_completed_amount: Some(3.0),
            title: "Sign up for the marathon".to_string(),
            description: None,
            goal_type: GoalType::Manual,
            target: None,
        })
        .await
        .expect("failed to create goal");

    let done = goal_service(&pool, jan(16))
        .toggle_completion(user, goal.id)
        .await
        .expect("toggle");
    assert_eq!(done.completed_at, Some(jan(16)));
    assert_eq!(credit_sum(&pool, user, points).await, 3.0);
    assert_eq!(credit_rows(&pool, user).await, 1);

    // Completion is one-way; a second toggle changes nothing.
    let err = goal_service(&pool, jan(17))
        .toggle_completion(user, goal.id)
        .await
        .expect_err("second toggle should fail");
    assert!(matches!(err, DomainError::InvalidOperation(_)));
    assert_eq!(credit_sum(&pool, user, points).await, 3.0);
    assert_eq!(credit_rows(&pool, user).await, 1);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_history_survives_unrelated_writes() {
    let pool = setup_test_db().await;
    let user = seed_user(&pool).await;
    let km = seed_unit(&pool, "kilometer").await;

    let goals = goal_service(&pool, jan(10));
    let tracked = goals
        .create_goal(NewGoal {
            user_id: user,
            parent_goal_id: None,
            unit_id: Some(km),
            unit_id_completed: None,
            unit_completed_amount: None,
            title: "Tracked".to_string(),
            description: None,
            goal_type: GoalType::Target,
            target: Some(100.0),
        })
        .await
        .expect("create tracked goal");
    let other = goals
        .create_goal(NewGoal {
            user_id: user,
            parent_goal_id: None,
            unit_id: Some(km),
            unit_id_completed: None,
            unit_completed_amount: None,
            title: "Other".to_string(),
            description: None,
            goal_type: GoalType::Target,
            target: Some(100.0),
        })
        .await
        .expect("create other goal");

    progress_service(&pool, jan(15))
        .record_progress(user, tracked.id, Some(5.0))
        .await
        .expect("record");
    progress_service(&pool, jan(16))
        .record_progress(user, tracked.id, Some(3.0))
        .await
        .expect("record");

    let history = progress_service(&pool, jan(16))
        .goal_history(user, tracked.id)
        .await
        .expect("history");
    assert_eq!(
        history,
        vec![
            DailyProgress { date: "2024-01-15".to_string(), progress: 5.0 },
            DailyProgress { date: "2024-01-16".to_string(), progress: 3.0 },
        ]
    );

    // Writes to a sibling goal, including one that completes it, leave the
    // tracked series untouched.
    progress_service(&pool, jan(15))
        .record_progress(user, other.id, Some(40.0))
        .await
        .expect("record");
    progress_service(&pool, jan(16))
        .record_progress(user, other.id, Some(60.0))
        .await
        .expect("record");

    let after = progress_service(&pool, jan(20))
        .goal_history(user, tracked.id)
        .await
        .expect("history");
    assert_eq!(after, history);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM goal_progress WHERE goal_id = ?")
        .bind(tracked.id.to_string())
        .fetch_one(&pool)
        .await
        .expect("count ledger rows");
    assert_eq!(count, 2);

    teardown_test_db(pool).await;
}
