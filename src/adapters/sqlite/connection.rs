//! Pool construction and connection health checks.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::domain::models::DatabaseConfig;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("cannot parse database url {0:?}")]
    BadUrl(String),

    #[error("cannot create database directory")]
    CreateDirectory(#[source] std::io::Error),

    #[error("cannot open connection pool")]
    OpenPool(#[source] sqlx::Error),

    #[error("database did not answer health check")]
    Ping(#[source] sqlx::Error),
}

/// Pool sizing knobs, decoupled from the serde config so callers can
/// tune pools without a full [`DatabaseConfig`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&DatabaseConfig> for PoolConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self { max_connections: config.max_connections, ..Self::default() }
    }
}

/// Base connect options used by every pool: WAL journaling, NORMAL
/// sync, and foreign keys on. SQLite only enforces the FK constraints
/// in the schema when the pragma is set per connection.
fn sqlite_options(url: &str) -> Result<SqliteConnectOptions, ConnectionError> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|_| ConnectionError::BadUrl(url.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(30));
    Ok(options)
}

/// File path behind a sqlite url, or `None` for in-memory databases.
fn database_file(url: &str) -> Option<&Path> {
    let raw = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:")).unwrap_or(url);
    if raw.is_empty() || raw == ":memory:" {
        None
    } else {
        Some(Path::new(raw))
    }
}

/// Open a pool against `database_url`, creating the parent directory
/// for file-backed databases if it does not exist yet.
pub async fn create_pool(
    database_url: &str,
    config: Option<PoolConfig>,
) -> Result<SqlitePool, ConnectionError> {
    let config = config.unwrap_or_default();

    if let Some(parent) = database_file(database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(ConnectionError::CreateDirectory)?;
        }
    }

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(sqlite_options(database_url)?)
        .await
        .map_err(ConnectionError::OpenPool)
}

/// Single-connection in-memory pool. One connection keeps the database
/// alive for the pool's lifetime and private to the test that made it.
pub async fn create_test_pool() -> Result<SqlitePool, ConnectionError> {
    let options = sqlite_options("sqlite::memory:")?.shared_cache(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(ConnectionError::OpenPool)
}

/// Round-trip a trivial query to prove the pool is usable.
pub async fn verify_connection(pool: &SqlitePool) -> Result<(), ConnectionError> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(ConnectionError::Ping)?;
    Ok(())
}
