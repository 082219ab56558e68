//! Embedded schema migrations.
//!
//! Revisions are compiled into the binary and applied in order on
//! startup. The `schema_migrations` table records what already ran, so
//! restarting against an up-to-date database is a no-op.

use sqlx::SqlitePool;
use thiserror::Error;

const VERSION_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (version INTEGER PRIMARY KEY, applied_at TEXT NOT NULL DEFAULT (datetime('now')), description TEXT)";

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration {0} failed")]
    Apply(i64, #[source] sqlx::Error),

    #[error("cannot read schema version")]
    Version(#[source] sqlx::Error),
}

/// One schema revision.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub label: &'static str,
    pub sql: &'static str,
}

/// Every schema revision, oldest first.
pub fn all_embedded_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        label: "initial schema",
        sql: include_str!("../../../migrations/001_initial_schema.sql"),
    }]
}

/// Applies pending [`Migration`]s and tracks the installed version.
pub struct Migrator {
    pool: SqlitePool,
}

impl Migrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply every migration newer than the installed version.
    /// Returns how many ran.
    pub async fn run_embedded_migrations(
        &self,
        migrations: Vec<Migration>,
    ) -> Result<usize, MigrationError> {
        sqlx::query(VERSION_TABLE_DDL)
            .execute(&self.pool)
            .await
            .map_err(|err| MigrationError::Apply(0, err))?;

        let installed = self.get_current_version().await?;
        let mut applied = 0;
        for migration in migrations {
            if migration.version <= installed {
                continue;
            }
            self.apply(migration).await?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Highest applied migration version, 0 for a fresh database.
    pub async fn get_current_version(&self) -> Result<i64, MigrationError> {
        sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(MigrationError::Version)
    }

    async fn apply(&self, migration: Migration) -> Result<(), MigrationError> {
        sqlx::raw_sql(migration.sql)
            .execute(&self.pool)
            .await
            .map_err(|err| MigrationError::Apply(migration.version, err))?;

        sqlx::query("INSERT INTO schema_migrations (version, description) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.label)
            .execute(&self.pool)
            .await
            .map_err(|err| MigrationError::Apply(migration.version, err))?;
        Ok(())
    }
}
