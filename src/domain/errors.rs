//! Error types shared across services and adapters.

use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced by domain operations.
///
/// Variants map one-to-one onto HTTP statuses in the API layer, so
/// services pick the variant by what the caller did wrong rather than
/// by where the failure happened.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No goal with this id, or it belongs to another user.
    #[error("goal {0} does not exist")]
    GoalNotFound(Uuid),

    /// No unit with this id.
    #[error("unit {0} does not exist")]
    UnitNotFound(Uuid),

    /// The caller is authenticated but does not own the resource.
    #[error("not permitted: {0}")]
    Forbidden(String),

    /// The request is well-formed but the operation is not allowed in
    /// the goal's current state.
    #[error("operation not allowed: {0}")]
    InvalidOperation(String),

    /// The request payload failed a domain rule.
    #[error("invalid input: {0}")]
    ValidationFailed(String),

    /// Stored data contradicts a structural invariant, e.g. a cycle in
    /// the goal hierarchy.
    #[error("data integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("storage failure: {0}")]
    DatabaseError(String),

    #[error("serialization failure: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
