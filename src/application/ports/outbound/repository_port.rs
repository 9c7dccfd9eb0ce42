//! Repository ports - Interfaces for data persistence
//!
//! These traits define the contracts that infrastructure repositories must implement.
//! Application services depend on these traits, not concrete implementations.
//!
//! Every read excludes soft-deleted records; absence is `Ok(None)`, never an error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{Character, House};
use crate::domain::value_objects::{CharacterId, HouseId, Pagination};

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A write targeted a record that does not exist (or is deleted).
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// A stored value could not be mapped back onto an entity.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A storage-level constraint (e.g. the unique house name index) rejected the write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl RepoError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    pub fn constraint(message: impl ToString) -> Self {
        Self::ConstraintViolation(message.to_string())
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation(_))
    }
}

/// Selection for listing houses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HouseFilter {
    /// Exact, case-sensitive name match
    pub name: Option<String>,
    pub page: Pagination,
}

impl HouseFilter {
    pub fn new(name: Option<String>, page: Pagination) -> Self {
        // An empty name means "no filter"
        Self {
            name: name.filter(|n| !n.is_empty()),
            page,
        }
    }
}

// =============================================================================
// House Repository Port
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HouseRepositoryPort: Send + Sync {
    /// Persist a new house
    async fn insert(&self, house: &House) -> Result<(), RepoError>;

    /// List houses, most recently created first
    async fn list(&self, filter: &HouseFilter) -> Result<Vec<House>, RepoError>;

    async fn get(&self, id: HouseId) -> Result<Option<House>, RepoError>;

    async fn get_by_name(&self, name: &str) -> Result<Option<House>, RepoError>;

    /// Write back every mutable field of an existing house
    async fn update(&self, house: &House) -> Result<(), RepoError>;

    /// Mark a house deleted; the row is kept
    async fn soft_delete(&self, id: HouseId, at: DateTime<Utc>) -> Result<(), RepoError>;

    /// Empty `current_lord` on every house pointing at `lord_id`, returning how many changed
    async fn clear_lord_references(
        &self,
        lord_id: CharacterId,
        at: DateTime<Utc>,
    ) -> Result<u64, RepoError>;
}

// =============================================================================
// Character Repository Port
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepositoryPort: Send + Sync {
    async fn insert(&self, character: &Character) -> Result<(), RepoError>;

    /// List characters, most recently created first
    async fn list(&self) -> Result<Vec<Character>, RepoError>;

    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError>;

    /// Like `get`, but soft-deleted characters are returned too
    async fn get_including_deleted(
        &self,
        id: CharacterId,
    ) -> Result<Option<Character>, RepoError>;

    async fn update(&self, character: &Character) -> Result<(), RepoError>;

    async fn soft_delete(&self, id: CharacterId, at: DateTime<Utc>) -> Result<(), RepoError>;
}

/// Storage that can soft-delete a character and clear its lord references
/// in a single transaction
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterDeletionPort: Send + Sync {
    /// Returns how many houses had their lord cleared; nothing is written on error
    async fn delete_with_lord_references(
        &self,
        id: CharacterId,
        at: DateTime<Utc>,
    ) -> Result<u64, RepoError>;
}
