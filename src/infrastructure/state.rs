//! Shared application state

use std::sync::Arc;

use anyhow::Result;

use crate::application::ports::outbound::{
    CharacterDeletionPort, CharacterRepositoryPort, ClockPort, HouseRepositoryPort,
    IdGeneratorPort,
};
use crate::application::services::{
    CharacterService, CharacterServiceImpl, HouseService, HouseServiceImpl,
};
use crate::infrastructure::clock::{SystemClock, UuidV4Generator};
use crate::infrastructure::config::{StorageBackend, StorageConfig};
use crate::infrastructure::persistence::{
    InMemoryCharacterRepository, InMemoryHouseRepository, SqliteRepository,
};

/// Storage ports the services are built over
pub struct Repositories {
    pub houses: Arc<dyn HouseRepositoryPort>,
    pub characters: Arc<dyn CharacterRepositoryPort>,
    /// Present when the backend can delete a character and its lord references atomically
    pub character_deletion: Option<Arc<dyn CharacterDeletionPort>>,
}

impl Repositories {
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        match config.backend {
            StorageBackend::Sqlite => {
                let repository = SqliteRepository::new(config).await?;
                let characters = Arc::new(repository.characters());
                Ok(Self {
                    houses: Arc::new(repository.houses()),
                    characters: characters.clone(),
                    character_deletion: Some(characters as Arc<dyn CharacterDeletionPort>),
                })
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on shutdown");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn in_memory() -> Self {
        Self {
            houses: Arc::new(InMemoryHouseRepository::new()),
            characters: Arc::new(InMemoryCharacterRepository::new()),
            character_deletion: None,
        }
    }
}

/// Shared application state
pub struct AppState {
    // Application services
    pub house_service: Arc<dyn HouseService>,
    pub character_service: Arc<dyn CharacterService>,
}

impl AppState {
    pub async fn new(storage: &StorageConfig) -> Result<Self> {
        let repositories = Repositories::connect(storage).await?;
        Ok(Self::from_repositories(
            repositories,
            Arc::new(SystemClock::new()),
            Arc::new(UuidV4Generator),
        ))
    }

    /// Wire both services over the given storage ports
    pub fn from_repositories(
        repositories: Repositories,
        clock: Arc<dyn ClockPort>,
        ids: Arc<dyn IdGeneratorPort>,
    ) -> Self {
        let house_service: Arc<dyn HouseService> = Arc::new(HouseServiceImpl::new(
            repositories.houses,
            clock.clone(),
            ids.clone(),
        ));

        let mut character_service = CharacterServiceImpl::new(
            repositories.characters,
            house_service.clone(),
            clock,
            ids,
        );
        if let Some(deletion) = repositories.character_deletion {
            character_service = character_service.with_atomic_deletion(deletion);
        }

        Self {
            house_service,
            character_service: Arc::new(character_service),
        }
    }
}
