//! Unit catalog service.
//!
//! Units are shared across users, so none of these operations take a
//! caller; visibility scoping only applies to statistics, not the catalog.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NewUnit, Unit, UnitUpdate};
use crate::domain::ports::{Clock, UnitRepository};

pub struct UnitService<U: UnitRepository> {
    units: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U: UnitRepository> UnitService<U> {
    pub fn new(units: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { units, clock }
    }

    pub async fn create_unit(&self, new_unit: NewUnit) -> DomainResult<Unit> {
        new_unit.validate().map_err(DomainError::ValidationFailed)?;
        let unit = new_unit.into_unit(self.clock.now());
        self.units.create(&unit).await?;
        Ok(unit)
    }

    pub async fn get_unit(&self, id: Uuid) -> DomainResult<Unit> {
        self.units.get(id).await?.ok_or(DomainError::UnitNotFound(id))
    }

    pub async fn list_units(&self) -> DomainResult<Vec<Unit>> {
        self.units.list().await
    }

    pub async fn update_unit(&self, id: Uuid, update: UnitUpdate) -> DomainResult<Unit> {
        update.validate().map_err(DomainError::ValidationFailed)?;
        self.units.update(id, &update, self.clock.now()).await
    }

    /// Delete a unit. Refused while any goal references it.
    pub async fn delete_unit(&self, id: Uuid) -> DomainResult<()> {
        self.units.delete(id).await
    }
}
