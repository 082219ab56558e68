//! Unit repository port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Unit, UnitUpdate};

/// Repository interface for the shared unit catalog.
#[async_trait]
pub trait UnitRepository: Send + Sync {
    /// Persist a new unit.
    async fn create(&self, unit: &Unit) -> DomainResult<()>;

    /// Get a unit by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Unit>>;

    /// List all units, in creation order.
    async fn list(&self) -> DomainResult<Vec<Unit>>;

    /// Fetch several units at once. Unknown ids are simply absent from the
    /// result.
    async fn get_many(&self, ids: &[Uuid]) -> DomainResult<Vec<Unit>>;

    /// Update display fields and return the new state.
    async fn update(&self, id: Uuid, update: &UnitUpdate, now: DateTime<Utc>)
        -> DomainResult<Unit>;

    /// Delete a unit. Fails with `InvalidOperation` while any goal still
    /// references it.
    async fn delete(&self, id: Uuid) -> DomainResult<()>;
}
