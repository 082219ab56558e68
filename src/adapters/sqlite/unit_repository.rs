//! SQLite implementation of the UnitRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Unit, UnitUpdate};
use crate::domain::ports::UnitRepository;
use crate::domain::time::format_utc;

use super::{parse_datetime, parse_uuid};

const UNIT_COLUMNS: &str = "id, name, plural_name, completed_word, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteUnitRepository {
    pool: SqlitePool,
}

impl SqliteUnitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitRepository for SqliteUnitRepository {
    async fn create(&self, unit: &Unit) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO units (id, name, plural_name, completed_word, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(unit.id.to_string())
        .bind(&unit.name)
        .bind(&unit.plural_name)
        .bind(&unit.completed_word)
        .bind(format_utc(unit.created_at))
        .bind(format_utc(unit.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Unit>> {
        let row: Option<UnitRow> =
            sqlx::query_as(&format!("SELECT {UNIT_COLUMNS} FROM units WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Unit::try_from).transpose()
    }

    async fn list(&self) -> DomainResult<Vec<Unit>> {
        let rows: Vec<UnitRow> = sqlx::query_as(&format!(
            "SELECT {UNIT_COLUMNS} FROM units ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Unit::try_from).collect()
    }

    async fn get_many(&self, ids: &[Uuid]) -> DomainResult<Vec<Unit>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql =
            format!("SELECT {UNIT_COLUMNS} FROM units WHERE id IN ({placeholders}) ORDER BY id");
        let mut query = sqlx::query_as::<_, UnitRow>(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Unit::try_from).collect()
    }

    async fn update(
        &self,
        id: Uuid,
        update: &UnitUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<Unit> {
        let mut tx = self.pool.begin().await?;

        let row: Option<UnitRow> =
            sqlx::query_as(&format!("SELECT {UNIT_COLUMNS} FROM units WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&mut *tx)
                .await?;
        let Some(mut unit) = row.map(Unit::try_from).transpose()? else {
            return Err(DomainError::UnitNotFound(id));
        };

        if let Some(name) = &update.name {
            unit.name = name.clone();
        }
        if let Some(plural_name) = &update.plural_name {
            unit.plural_name = Some(plural_name.clone());
        }
        if let Some(completed_word) = &update.completed_word {
            unit.completed_word = Some(completed_word.clone());
        }
        unit.updated_at = now;

        sqlx::query(
            "UPDATE units SET name = ?, plural_name = ?, completed_word = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&unit.name)
        .bind(&unit.plural_name)
        .bind(&unit.completed_word)
        .bind(format_utc(unit.updated_at))
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(unit)
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        // Goals hold meaningful history against their unit, so deletion is
        // refused rather than cascaded.
        let (references,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM goals WHERE unit_id = ? OR unit_id_completed = ?",
        )
        .bind(id.to_string())
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await?;

        if references > 0 {
            tx.rollback().await?;
            return Err(DomainError::InvalidOperation(format!(
                "unit is still referenced by {references} goal(s)"
            )));
        }

        let result = sqlx::query("DELETE FROM units WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DomainError::UnitNotFound(id));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct UnitRow {
    id: String,
    name: String,
    plural_name: Option<String>,
    completed_word: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<UnitRow> for Unit {
    type Error = DomainError;

    fn try_from(row: UnitRow) -> Result<Self, Self::Error> {
        Ok(Unit {
            id: parse_uuid(&row.id)?,
            name: row.name,
            plural_name: row.plural_name,
            completed_word: row.completed_word,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
