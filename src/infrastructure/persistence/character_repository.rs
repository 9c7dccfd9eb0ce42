//! Character repository implementation for SQLite

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::connection::SqliteConnection;
use super::write_error;
use crate::application::ports::outbound::{
    CharacterDeletionPort, CharacterRepositoryPort, RepoError,
};
use crate::domain::entities::Character;
use crate::domain::value_objects::CharacterId;

/// Repository for Character operations
pub struct SqliteCharacterRepository {
    connection: SqliteConnection,
}

impl SqliteCharacterRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl CharacterRepositoryPort for SqliteCharacterRepository {
    async fn insert(&self, character: &Character) -> Result<(), RepoError> {
        let tv_series_json =
            serde_json::to_string(&character.tv_series).map_err(RepoError::serialization)?;

        sqlx::query(
            "INSERT INTO characters (id, name, tv_series, created_at)
            VALUES (?, ?, ?, ?)",
        )
        .bind(character.id.to_string())
        .bind(character.name.as_str())
        .bind(tv_series_json)
        .bind(character.created_at)
        .execute(self.connection.writer())
        .await
        .map_err(|e| write_error("insert character", e))?;

        tracing::debug!("Created character: {}", character.name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Character>, RepoError> {
        let rows = sqlx::query(
            "SELECT id, name, tv_series, created_at, updated_at, deleted_at
            FROM characters
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC",
        )
        .fetch_all(self.connection.reader())
        .await
        .map_err(|e| RepoError::database("list characters", e))?;

        rows.into_iter().map(row_to_character).collect()
    }

    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        let row = sqlx::query(
            "SELECT id, name, tv_series, created_at, updated_at, deleted_at
            FROM characters
            WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id.to_string())
        .fetch_optional(self.connection.reader())
        .await
        .map_err(|e| RepoError::database("get character", e))?;

        row.map(row_to_character).transpose()
    }

    async fn get_including_deleted(
        &self,
        id: CharacterId,
    ) -> Result<Option<Character>, RepoError> {
        let row = sqlx::query(
            "SELECT id, name, tv_series, created_at, updated_at, deleted_at
            FROM characters
            WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.connection.reader())
        .await
        .map_err(|e| RepoError::database("get character", e))?;

        row.map(row_to_character).transpose()
    }

    async fn update(&self, character: &Character) -> Result<(), RepoError> {
        let tv_series_json =
            serde_json::to_string(&character.tv_series).map_err(RepoError::serialization)?;

        let result = sqlx::query(
            "UPDATE characters
            SET name = ?, tv_series = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(character.name.as_str())
        .bind(tv_series_json)
        .bind(character.updated_at)
        .bind(character.id.to_string())
        .execute(self.connection.writer())
        .await
        .map_err(|e| write_error("update character", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Character", character.id));
        }
        tracing::debug!("Updated character: {}", character.name);
        Ok(())
    }

    async fn soft_delete(&self, id: CharacterId, at: DateTime<Utc>) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE characters
            SET deleted_at = ?
            WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(at)
        .bind(id.to_string())
        .execute(self.connection.writer())
        .await
        .map_err(|e| RepoError::database("delete character", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Character", id));
        }
        tracing::debug!("Soft-deleted character: {}", id);
        Ok(())
    }
}

#[async_trait]
impl CharacterDeletionPort for SqliteCharacterRepository {
    async fn delete_with_lord_references(
        &self,
        id: CharacterId,
        at: DateTime<Utc>,
    ) -> Result<u64, RepoError> {
        let mut tx = self
            .connection
            .writer()
            .begin()
            .await
            .map_err(|e| RepoError::database("begin character delete", e))?;

        let deleted = sqlx::query(
            "UPDATE characters
            SET deleted_at = ?
            WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(at)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::database("delete character", e))?;

        // Dropping the transaction rolls it back
        if deleted.rows_affected() == 0 {
            return Err(RepoError::not_found("Character", id));
        }

        let cleared = sqlx::query(
            "UPDATE houses
            SET current_lord = '', updated_at = ?
            WHERE current_lord = ?",
        )
        .bind(at)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::database("clear lord references", e))?;

        tx.commit()
            .await
            .map_err(|e| RepoError::database("commit character delete", e))?;

        tracing::debug!(
            "Soft-deleted character {} and cleared {} lord reference(s)",
            id,
            cleared.rows_affected()
        );
        Ok(cleared.rows_affected())
    }
}

fn row_to_character(row: SqliteRow) -> Result<Character, RepoError> {
    let decode = |e: sqlx::Error| RepoError::serialization(e);

    let id_str: String = row.try_get("id").map_err(decode)?;
    let tv_series_json: String = row.try_get("tv_series").map_err(decode)?;

    Ok(Character {
        id: CharacterId::parse(&id_str).map_err(RepoError::serialization)?,
        name: row.try_get("name").map_err(decode)?,
        tv_series: serde_json::from_str(&tv_series_json).map_err(RepoError::serialization)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
        deleted_at: row.try_get("deleted_at").map_err(decode)?,
    })
}
