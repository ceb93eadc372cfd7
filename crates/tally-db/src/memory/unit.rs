//! In-memory unit store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::Table;
use tally_core::validation::validate_unit;
use tally_core::{StoreError, StoreResult, Unit, UnitRepository, UNIT};

/// Units kept in a map for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryUnitRepository {
    units: RwLock<Table<Unit>>,
}

impl MemoryUnitRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnitRepository for MemoryUnitRepository {
    async fn create(&self, unit: &Unit) -> StoreResult<()> {
        validate_unit(unit)?;

        let mut units = self.units.write().await;

        // Full scan; the set of units is small.
        if units.values().any(|existing| existing.name == unit.name) {
            warn!(name = %unit.name, "Unit name already taken");
            return Err(StoreError::already_exists(UNIT, "name", &unit.name));
        }
        if units.contains(&unit.id) {
            return Err(StoreError::already_exists(UNIT, "id", &unit.id));
        }

        debug!(id = %unit.id, name = %unit.name, "Inserting unit");
        units.insert(unit.id.clone(), unit.clone());
        Ok(())
    }

    async fn read(&self, id: &str) -> StoreResult<Unit> {
        self.units
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(UNIT, "id", id))
    }

    async fn read_all(&self) -> StoreResult<Vec<Unit>> {
        Ok(self.units.read().await.values().cloned().collect())
    }
}
