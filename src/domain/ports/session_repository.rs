//! Session verification port.
//!
//! Authentication itself (signup, login, token issuance) happens outside
//! this system. The only contract here is resolving an opaque bearer token
//! to a caller identity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;

/// Verified caller identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
}

/// Repository interface for session lookup.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Resolve a bearer token to its user. `None` when the token is unknown
    /// or the session expired before `now`.
    async fn verify(&self, token: &str, now: DateTime<Utc>) -> DomainResult<Option<AuthUser>>;
}
