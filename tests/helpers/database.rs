//! Shared database fixtures for integration tests.

use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use stride::adapters::sqlite::create_migrated_test_pool;
use stride::domain::time::format_utc;

/// Create an in-memory SQLite database for testing
///
/// Creates a fresh in-memory database with all migrations applied. Each call
/// returns a completely isolated database instance.
pub async fn setup_test_db() -> SqlitePool {
    create_migrated_test_pool()
        .await
        .expect("failed to create test database")
}

/// Teardown test database
///
/// Closes the connection pool and cleans up resources.
pub async fn teardown_test_db(pool: SqlitePool) {
    pool.close().await;
}

/// Fixed reference instant the fixtures stamp rows with.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
}

/// Insert a user row and return its id.
pub async fn seed_user(pool: &SqlitePool) -> Uuid {
    let id = Uuid::new_v4();
    let now = format_utc(base_time());
    sqlx::query(
        "INSERT INTO users (id, name, email, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind("Test User")
    .bind(format!("{id}@example.com"))
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("failed to seed user");
    id
}

/// Insert a unit row and return its id.
pub async fn seed_unit(pool: &SqlitePool, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    let now = format_utc(base_time());
    sqlx::query(
        "INSERT INTO units (id, name, plural_name, completed_word, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(name)
    .bind(format!("{name}s"))
    .bind("logged")
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("failed to seed unit");
    id
}
