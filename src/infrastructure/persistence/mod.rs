//! Persistence adapters
//!
//! SQLite (via sqlx) is the durable backend; the in-memory repositories
//! implement the same ports for the `memory` backend and for tests.

mod character_repository;
mod connection;
mod house_repository;
mod memory;

pub use character_repository::SqliteCharacterRepository;
pub use connection::SqliteConnection;
pub use house_repository::SqliteHouseRepository;
pub use memory::{InMemoryCharacterRepository, InMemoryHouseRepository};

use anyhow::Result;

use crate::application::ports::outbound::RepoError;
use crate::domain::value_objects::CharacterId;
use crate::infrastructure::config::StorageConfig;

/// Combined repository providing access to all SQLite repositories
#[derive(Clone)]
pub struct SqliteRepository {
    connection: SqliteConnection,
}

impl SqliteRepository {
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let connection = SqliteConnection::connect(
            &config.writer,
            config.reader_url(),
            config.max_connections,
        )
        .await?;
        connection.initialize_schema().await?;
        Ok(Self { connection })
    }

    pub fn houses(&self) -> SqliteHouseRepository {
        SqliteHouseRepository::new(self.connection.clone())
    }

    pub fn characters(&self) -> SqliteCharacterRepository {
        SqliteCharacterRepository::new(self.connection.clone())
    }
}

/// `current_lord` is stored as text; no lord is the empty string
fn lord_to_column(lord: Option<CharacterId>) -> String {
    lord.map(|id| id.to_string()).unwrap_or_default()
}

/// Map a failed write, surfacing unique index hits as constraint violations
fn write_error(operation: &'static str, error: sqlx::Error) -> RepoError {
    match &error {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepoError::constraint(db_err.message())
        }
        _ => RepoError::database(operation, error),
    }
}
