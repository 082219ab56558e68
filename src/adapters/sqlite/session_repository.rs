//! SQLite implementation of the SessionRepository.
//!
//! Sessions are written by the external auth layer; this adapter only reads
//! them to resolve bearer tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::ports::{AuthUser, SessionRepository};
use crate::domain::time::format_utc;

use super::parse_uuid;

#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn verify(&self, token: &str, now: DateTime<Utc>) -> DomainResult<Option<AuthUser>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT id, user_id FROM sessions WHERE token = ? AND expires_at > ?")
                .bind(token)
                .bind(format_utc(now))
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(session_id, user_id)| {
            Ok(AuthUser { user_id: parse_uuid(&user_id)?, session_id: parse_uuid(&session_id)? })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::adapters::sqlite::testing::{seed_session, seed_user, test_pool};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_verify_resolves_live_token() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool).await;
        let expires = base_time() + chrono::Duration::days(7);
        let session_id = seed_session(&pool, user_id, "live-token", expires).await;
        let repo = SqliteSessionRepository::new(pool);

        let auth = repo.verify("live-token", base_time()).await.unwrap().unwrap();
        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.session_id, session_id);
    }

    #[tokio::test]
    async fn test_verify_rejects_unknown_and_expired_tokens() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool).await;
        let expires = base_time() + chrono::Duration::days(7);
        seed_session(&pool, user_id, "live-token", expires).await;
        let repo = SqliteSessionRepository::new(pool);

        assert!(repo.verify("wrong-token", base_time()).await.unwrap().is_none());
        // Expiry boundary: a session is dead at its exact expiry instant.
        assert!(repo.verify("live-token", expires).await.unwrap().is_none());
        assert!(repo
            .verify("live-token", expires - chrono::Duration::milliseconds(1))
            .await
            .unwrap()
            .is_some());
    }
}
