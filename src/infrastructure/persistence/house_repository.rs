//! House repository implementation for SQLite

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::connection::SqliteConnection;
use super::{lord_to_column, write_error};
use crate::application::ports::outbound::{HouseFilter, HouseRepositoryPort, RepoError};
use crate::domain::entities::House;
use crate::domain::value_objects::{CharacterId, HouseId};

/// Repository for House operations
pub struct SqliteHouseRepository {
    connection: SqliteConnection,
}

impl SqliteHouseRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl HouseRepositoryPort for SqliteHouseRepository {
    async fn insert(&self, house: &House) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO houses
            (id, name, region, foundation_year, current_lord, created_at)
            VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(house.id.to_string())
        .bind(house.name.as_str())
        .bind(house.region.as_str())
        .bind(house.foundation_year.as_str())
        .bind(lord_to_column(house.current_lord))
        .bind(house.created_at)
        .execute(self.connection.writer())
        .await
        .map_err(|e| write_error("insert house", e))?;

        tracing::debug!("Created house: {}", house.name);
        Ok(())
    }

    async fn list(&self, filter: &HouseFilter) -> Result<Vec<House>, RepoError> {
        let rows = sqlx::query(
            "SELECT id, name, region, foundation_year, current_lord,
                created_at, updated_at, deleted_at
            FROM houses
            WHERE deleted_at IS NULL AND (?1 IS NULL OR name = ?1)
            ORDER BY created_at DESC
            LIMIT ?2 OFFSET ?3",
        )
        .bind(filter.name.as_deref())
        .bind(i64::from(filter.page.limit))
        .bind(i64::from(filter.page.offset))
        .fetch_all(self.connection.reader())
        .await
        .map_err(|e| RepoError::database("list houses", e))?;

        rows.into_iter().map(row_to_house).collect()
    }

    async fn get(&self, id: HouseId) -> Result<Option<House>, RepoError> {
        let row = sqlx::query(
            "SELECT id, name, region, foundation_year, current_lord,
                created_at, updated_at, deleted_at
            FROM houses
            WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id.to_string())
        .fetch_optional(self.connection.reader())
        .await
        .map_err(|e| RepoError::database("get house", e))?;

        row.map(row_to_house).transpose()
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<House>, RepoError> {
        let row = sqlx::query(
            "SELECT id, name, region, foundation_year, current_lord,
                created_at, updated_at, deleted_at
            FROM houses
            WHERE name = ? AND deleted_at IS NULL",
        )
        .bind(name)
        .fetch_optional(self.connection.reader())
        .await
        .map_err(|e| RepoError::database("get house by name", e))?;

        row.map(row_to_house).transpose()
    }

    async fn update(&self, house: &House) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE houses
            SET name = ?, region = ?, foundation_year = ?, current_lord = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(house.name.as_str())
        .bind(house.region.as_str())
        .bind(house.foundation_year.as_str())
        .bind(lord_to_column(house.current_lord))
        .bind(house.updated_at)
        .bind(house.id.to_string())
        .execute(self.connection.writer())
        .await
        .map_err(|e| write_error("update house", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("House", house.id));
        }
        tracing::debug!("Updated house: {}", house.name);
        Ok(())
    }

    async fn soft_delete(&self, id: HouseId, at: DateTime<Utc>) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE houses
            SET deleted_at = ?
            WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(at)
        .bind(id.to_string())
        .execute(self.connection.writer())
        .await
        .map_err(|e| RepoError::database("delete house", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("House", id));
        }
        tracing::debug!("Soft-deleted house: {}", id);
        Ok(())
    }

    async fn clear_lord_references(
        &self,
        lord_id: CharacterId,
        at: DateTime<Utc>,
    ) -> Result<u64, RepoError> {
        let result = sqlx::query(
            "UPDATE houses
            SET current_lord = '', updated_at = ?
            WHERE current_lord = ?",
        )
        .bind(at)
        .bind(lord_id.to_string())
        .execute(self.connection.writer())
        .await
        .map_err(|e| RepoError::database("clear lord references", e))?;

        Ok(result.rows_affected())
    }
}

fn row_to_house(row: SqliteRow) -> Result<House, RepoError> {
    let decode = |e: sqlx::Error| RepoError::serialization(e);

    let id_str: String = row.try_get("id").map_err(decode)?;
    let current_lord_str: String = row.try_get("current_lord").map_err(decode)?;

    let id = HouseId::parse(&id_str).map_err(RepoError::serialization)?;
    let current_lord = if current_lord_str.is_empty() {
        None
    } else {
        Some(CharacterId::parse(&current_lord_str).map_err(RepoError::serialization)?)
    };

    Ok(House {
        id,
        name: row.try_get("name").map_err(decode)?,
        region: row.try_get("region").map_err(decode)?,
        foundation_year: row.try_get("foundation_year").map_err(decode)?,
        current_lord,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
        deleted_at: row.try_get("deleted_at").map_err(decode)?,
    })
}
