//! SQLite persistence layer.
//!
//! One repository per aggregate, all sharing a [`SqlitePool`]. Ids and
//! timestamps are stored as TEXT; the helpers here turn row fields back
//! into [`Uuid`] and [`DateTime<Utc>`] values.

pub mod connection;
pub mod goal_repository;
pub mod migrations;
pub mod predicates;
pub mod progress_repository;
pub mod propagation;
pub mod session_repository;
pub mod stats_repository;
pub mod unit_repository;

pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use goal_repository::SqliteGoalRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use progress_repository::SqliteProgressRepository;
pub use session_repository::SqliteSessionRepository;
pub use stats_repository::SqliteStatsRepository;
pub use unit_repository::SqliteUnitRepository;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Decode a stored uuid column.
pub fn parse_uuid(s: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(s).map_err(|err| DomainError::SerializationError(err.to_string()))
}

/// Decode a nullable uuid column.
pub fn parse_optional_uuid(s: Option<String>) -> DomainResult<Option<Uuid>> {
    s.as_deref().map(parse_uuid).transpose()
}

/// Decode a stored timestamp column. Stored values were written by
/// [`crate::domain::time::format_utc`], so plain RFC 3339 parsing is
/// enough here.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(s)
        .map_err(|err| DomainError::SerializationError(err.to_string()))?;
    Ok(parsed.with_timezone(&Utc))
}

/// Decode a nullable timestamp column.
pub fn parse_optional_datetime(s: Option<String>) -> DomainResult<Option<DateTime<Utc>>> {
    s.as_deref().map(parse_datetime).transpose()
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("connection: {0}")]
    Connection(#[from] ConnectionError),

    #[error("migration: {0}")]
    Migration(#[from] MigrationError),

    #[error("query: {0}")]
    Query(#[from] sqlx::Error),
}

/// Open a pool against `database_url` and bring the schema up to date.
pub async fn initialize_database(
    database_url: &str,
    pool_config: Option<PoolConfig>,
) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, pool_config).await?;
    Migrator::new(pool.clone()).run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

/// In-memory pool with the full schema applied, for tests.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    Migrator::new(pool.clone()).run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}
