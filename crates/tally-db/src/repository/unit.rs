//! # Unit Repository
//!
//! SQLite storage for measurement units. Name uniqueness is enforced by the
//! `UNIQUE(name)` constraint and translated back into `AlreadyExists`.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbError;
use tally_core::validation::validate_unit;
use tally_core::{StoreError, StoreResult, Unit, UnitRepository, UNIT};

/// Repository for unit database operations.
#[derive(Debug, Clone)]
pub struct SqliteUnitRepository {
    pool: SqlitePool,
}

impl SqliteUnitRepository {
    /// Creates a new SqliteUnitRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteUnitRepository { pool }
    }
}

#[async_trait]
impl UnitRepository for SqliteUnitRepository {
    async fn create(&self, unit: &Unit) -> StoreResult<()> {
        validate_unit(unit)?;

        debug!(id = %unit.id, name = %unit.name, "Inserting unit");

        sqlx::query("INSERT INTO units (id, name) VALUES (?1, ?2)")
            .bind(&unit.id)
            .bind(&unit.name)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                err if err.is_unique_on("units.name") => {
                    warn!(name = %unit.name, "Unit name already taken");
                    StoreError::already_exists(UNIT, "name", &unit.name)
                }
                err if err.is_unique_on("units.id") => {
                    StoreError::already_exists(UNIT, "id", &unit.id)
                }
                other => other.into(),
            })?;

        Ok(())
    }

    async fn read(&self, id: &str) -> StoreResult<Unit> {
        let unit = sqlx::query_as::<_, Unit>("SELECT id, name FROM units WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;

        unit.ok_or_else(|| StoreError::not_found(UNIT, "id", id))
    }

    async fn read_all(&self) -> StoreResult<Vec<Unit>> {
        let units = sqlx::query_as::<_, Unit>("SELECT id, name FROM units ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        debug!(count = units.len(), "Read all units");
        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> SqliteUnitRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().units()
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let units = repo().await;
        let kg = Unit::new("kg");

        units.create(&kg).await.unwrap();

        assert_eq!(units.read(&kg.id).await.unwrap(), kg);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_translated() {
        let units = repo().await;
        units.create(&Unit::new("kg")).await.unwrap();

        let err = units.create(&Unit::new("kg")).await.unwrap_err();

        assert_eq!(err, StoreError::already_exists("Unit", "name", "kg"));
        assert_eq!(units.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_read_unknown() {
        let units = repo().await;
        let err = units.read("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Unit with id<missing> does not exist.");
    }

    #[tokio::test]
    async fn test_read_all_in_insertion_order() {
        let units = repo().await;
        assert!(units.read_all().await.unwrap().is_empty());

        let kg = Unit::new("kg");
        let pcs = Unit::new("pcs");
        units.create(&kg).await.unwrap();
        units.create(&pcs).await.unwrap();

        assert_eq!(units.read_all().await.unwrap(), vec![kg, pcs]);
    }
}
