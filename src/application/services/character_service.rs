//! Character Service - Application service for character management
//!
//! Characters have no uniqueness rule. Deleting a character is the trigger
//! for the lord cascade: after the soft-delete, every house that still names
//! the character as its current lord is detached through the house rules.
//! When the storage offers a [`CharacterDeletionPort`] both writes run in one
//! transaction. Otherwise they are separate; a failed second step is reported
//! as `CascadeFailed`, and deleting the same character again finishes the job.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use super::error::{find_failed, persistence_failed, ServiceError};
use super::house_service::HouseService;
use crate::application::ports::outbound::{
    CharacterDeletionPort, CharacterRepositoryPort, ClockPort, IdGeneratorPort, RepoError,
};
use crate::domain::entities::{Character, CharacterRequest};
use crate::domain::validation::Validate;
use crate::domain::value_objects::CharacterId;

/// Character service trait defining the application use cases
#[async_trait]
pub trait CharacterService: Send + Sync {
    /// Create a character, returning its new identifier
    async fn create(&self, request: CharacterRequest) -> Result<CharacterId, ServiceError>;

    /// List live characters, newest first
    async fn find(&self) -> Result<Vec<Character>, ServiceError>;

    async fn find_by_id(&self, id: CharacterId) -> Result<Character, ServiceError>;

    async fn update(
        &self,
        id: CharacterId,
        request: CharacterRequest,
    ) -> Result<Character, ServiceError>;

    /// Soft-delete a character and detach it from the houses it rules
    async fn delete(&self, id: CharacterId) -> Result<(), ServiceError>;
}

/// Default implementation of CharacterService over a storage port
pub struct CharacterServiceImpl {
    repository: Arc<dyn CharacterRepositoryPort>,
    /// Transactional delete + cascade, when the storage offers one
    deletion: Option<Arc<dyn CharacterDeletionPort>>,
    houses: Arc<dyn HouseService>,
    clock: Arc<dyn ClockPort>,
    ids: Arc<dyn IdGeneratorPort>,
}

impl CharacterServiceImpl {
    pub fn new(
        repository: Arc<dyn CharacterRepositoryPort>,
        houses: Arc<dyn HouseService>,
        clock: Arc<dyn ClockPort>,
        ids: Arc<dyn IdGeneratorPort>,
    ) -> Self {
        Self {
            repository,
            deletion: None,
            houses,
            clock,
            ids,
        }
    }

    pub fn with_atomic_deletion(mut self, deletion: Arc<dyn CharacterDeletionPort>) -> Self {
        self.deletion = Some(deletion);
        self
    }

    /// Clear the houses still ruled by a deleted character
    async fn clear_lord(&self, id: CharacterId) -> Result<u64, ServiceError> {
        self.houses.clear_lord_reference(id).await.map_err(|e| {
            error!(
                character_id = %id,
                error = %e,
                "Character deleted but houses still reference it as lord"
            );
            ServiceError::CascadeFailed {
                character_id: id,
                source: Box::new(e),
            }
        })
    }

    /// Deleting an already deleted character retries the lord cascade;
    /// with nothing left to clear it is simply not found
    async fn finish_interrupted_delete(&self, id: CharacterId) -> Result<(), ServiceError> {
        let cleared = self.clear_lord(id).await?;
        if cleared == 0 {
            debug!(character_id = %id, "Character already deleted");
            return Err(ServiceError::CharacterNotFound(id));
        }
        warn!(
            character_id = %id,
            houses_cleared = cleared,
            "Cleared lord references left behind by an earlier delete"
        );
        Ok(())
    }

    fn validate(request: &CharacterRequest) -> Result<(), ServiceError> {
        request.validate().map_err(|e| {
            warn!(fields = ?e.fields(), "Rejected character request");
            ServiceError::from(e)
        })
    }
}

#[async_trait]
impl CharacterService for CharacterServiceImpl {
    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create(&self, request: CharacterRequest) -> Result<CharacterId, ServiceError> {
        Self::validate(&request)?;

        let id = CharacterId::from_uuid(self.ids.new_uuid());
        let character = Character::create(id, request, self.clock.now());

        self.repository
            .insert(&character)
            .await
            .map_err(|e| persistence_failed("create character", e))?;

        info!(character_id = %id, "Created character: {}", character.name);
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn find(&self) -> Result<Vec<Character>, ServiceError> {
        let characters = self
            .repository
            .list()
            .await
            .map_err(|e| find_failed("characters", e))?;

        debug!(count = characters.len(), "Listed characters");
        Ok(characters)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: CharacterId) -> Result<Character, ServiceError> {
        debug!(character_id = %id, "Fetching character");
        self.repository
            .get(id)
            .await
            .map_err(|e| find_failed("character", e))?
            .ok_or(ServiceError::CharacterNotFound(id))
    }

    #[instrument(skip(self, request), fields(character_id = %id))]
    async fn update(
        &self,
        id: CharacterId,
        request: CharacterRequest,
    ) -> Result<Character, ServiceError> {
        Self::validate(&request)?;

        let mut character = self.find_by_id(id).await?;
        character.merge(&request, self.clock.now());

        self.repository
            .update(&character)
            .await
            .map_err(|e| persistence_failed("update character", e))?;

        info!(character_id = %id, "Updated character: {}", character.name);
        Ok(character)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: CharacterId) -> Result<(), ServiceError> {
        let character = self
            .repository
            .get_including_deleted(id)
            .await
            .map_err(|e| find_failed("character", e))?
            .ok_or(ServiceError::CharacterNotFound(id))?;

        if character.is_deleted() {
            return self.finish_interrupted_delete(id).await;
        }

        let cleared = match &self.deletion {
            Some(deletion) => deletion
                .delete_with_lord_references(id, self.clock.now())
                .await
                .map_err(|e| match e {
                    RepoError::NotFound { .. } => ServiceError::CharacterNotFound(id),
                    e => persistence_failed("delete character", e),
                })?,
            None => {
                self.repository
                    .soft_delete(id, self.clock.now())
                    .await
                    .map_err(|e| persistence_failed("delete character", e))?;
                self.clear_lord(id).await?
            }
        };

        info!(
            character_id = %id,
            houses_cleared = cleared,
            "Deleted character: {}",
            character.name
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{
        HouseFilter, HouseRepositoryPort, MockCharacterRepositoryPort, MockHouseRepositoryPort,
        RepoError,
    };
    use crate::application::ports::outbound::MockCharacterDeletionPort;
    use crate::application::services::HouseServiceImpl;
    use crate::domain::entities::{House, HouseRequest};
    use crate::domain::value_objects::HouseId;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicBool, Ordering};
    use crate::infrastructure::clock::{SteppingClock, UuidV4Generator};
    use crate::infrastructure::persistence::{InMemoryCharacterRepository, InMemoryHouseRepository};

    struct Fixture {
        characters: Arc<InMemoryCharacterRepository>,
        houses: Arc<HouseServiceImpl>,
        service: CharacterServiceImpl,
    }

    fn wire(
        characters: Arc<dyn CharacterRepositoryPort>,
        house_repository: Arc<dyn HouseRepositoryPort>,
    ) -> (Arc<HouseServiceImpl>, CharacterServiceImpl) {
        let clock = Arc::new(SteppingClock::default());
        let ids = Arc::new(UuidV4Generator);
        let houses = Arc::new(HouseServiceImpl::new(
            house_repository,
            clock.clone(),
            ids.clone(),
        ));
        let service = CharacterServiceImpl::new(characters, houses.clone(), clock, ids);
        (houses, service)
    }

    fn fixture() -> Fixture {
        let characters = Arc::new(InMemoryCharacterRepository::new());
        let (houses, service) = wire(characters.clone(), Arc::new(InMemoryHouseRepository::new()));
        Fixture {
            characters,
            houses,
            service,
        }
    }

    fn patrick() -> CharacterRequest {
        CharacterRequest::new("Patrick Chagas", ["S1", "S2"])
    }

    #[tokio::test]
    async fn test_create_and_find_by_id() {
        let f = fixture();
        let id = f.service.create(patrick()).await.unwrap();

        let character = f.service.find_by_id(id).await.unwrap();
        assert_eq!(character.name, "Patrick Chagas");
        assert_eq!(character.tv_series, vec!["S1", "S2"]);
        assert!(character.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_names_need_not_be_unique() {
        let f = fixture();
        let a = f.service.create(patrick()).await.unwrap();
        let b = f.service.create(patrick()).await.unwrap();
        assert_ne!(a, b);

        let listed = f.service.find().await.unwrap();
        let ids: Vec<_> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_series() {
        let service = wire(
            Arc::new(MockCharacterRepositoryPort::new()),
            Arc::new(MockHouseRepositoryPort::new()),
        )
        .1;

        let err = service
            .create(CharacterRequest::new("Jon Snow", Vec::<String>::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_update_merges_and_stamps() {
        let f = fixture();
        let id = f.service.create(patrick()).await.unwrap();

        let updated = f
            .service
            .update(id, CharacterRequest::new("Patrick Chagas", ["S1", "S2", "S3"]))
            .await
            .unwrap();

        assert_eq!(updated.tv_series, vec!["S1", "S2", "S3"]);
        assert!(updated.updated_at.unwrap() > updated.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .update(CharacterId::from_uuid(uuid::Uuid::new_v4()), patrick())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CharacterNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_clears_lord_on_every_house() {
        let f = fixture();
        let lord = f.service.create(patrick()).await.unwrap();
        let h1 = f
            .houses
            .create(HouseRequest::new("House A", "Reach", "1").with_lord(lord))
            .await
            .unwrap();
        let h2 = f
            .houses
            .create(HouseRequest::new("House B", "Reach", "1").with_lord(lord))
            .await
            .unwrap();

        f.service.delete(lord).await.unwrap();

        for id in [h1, h2] {
            let house = f.houses.find_by_id(id).await.unwrap();
            assert_eq!(house.current_lord, None);
            assert!(house.updated_at.is_some());
        }
        let stored = f.characters.get_including_deleted(lord).await.unwrap().unwrap();
        assert!(stored.deleted_at.is_some());
        assert!(matches!(
            f.service.find_by_id(lord).await,
            Err(ServiceError::CharacterNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_leaves_other_lords_alone() {
        let f = fixture();
        let deleted = f.service.create(patrick()).await.unwrap();
        let kept = f.service.create(CharacterRequest::new("Ned Stark", ["S1"])).await.unwrap();
        let house = f
            .houses
            .create(HouseRequest::new("House Stark", "North", "1").with_lord(kept))
            .await
            .unwrap();

        f.service.delete(deleted).await.unwrap();

        let houses = f.houses.find(HouseFilter::default()).await.unwrap();
        assert_eq!(houses.len(), 1);
        assert_eq!(houses[0].id, house);
        assert_eq!(houses[0].current_lord, Some(kept));
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let f = fixture();
        let id = f.service.create(patrick()).await.unwrap();
        f.service.delete(id).await.unwrap();
        assert!(matches!(
            f.service.delete(id).await,
            Err(ServiceError::CharacterNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_cascade_is_reported_after_soft_delete() {
        let characters = Arc::new(InMemoryCharacterRepository::new());
        let mut house_repository = MockHouseRepositoryPort::new();
        house_repository
            .expect_clear_lord_references()
            .times(1)
            .returning(|_, _| {
                Err(RepoError::database("clear lord references", "connection reset"))
            });
        let (_, service) = wire(characters.clone(), Arc::new(house_repository));

        let id = service.create(patrick()).await.unwrap();
        let err = service.delete(id).await.unwrap_err();

        match err {
            ServiceError::CascadeFailed {
                character_id,
                source,
            } => {
                assert_eq!(character_id, id);
                assert!(matches!(*source, ServiceError::PersistenceFailed { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let stored = characters.get_including_deleted(id).await.unwrap().unwrap();
        assert!(stored.deleted_at.is_some());
    }

    #[tokio::test]
    async fn test_soft_delete_failure_skips_cascade() {
        let mut characters = MockCharacterRepositoryPort::new();
        let id = CharacterId::from_uuid(uuid::Uuid::new_v4());
        characters.expect_get_including_deleted().times(1).returning(move |_| {
            Ok(Some(Character::create(
                id,
                CharacterRequest::new("Patrick Chagas", ["S1"]),
                chrono::Utc::now(),
            )))
        });
        characters
            .expect_soft_delete()
            .times(1)
            .returning(|_, _| Err(RepoError::database("delete character", "read-only")));
        // No expectations on houses: the cascade must not run
        let (_, service) = wire(Arc::new(characters), Arc::new(MockHouseRepositoryPort::new()));

        let err = service.delete(id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::PersistenceFailed { operation: "delete character", .. }
        ));
    }

    #[tokio::test]
    async fn test_find_storage_failure_is_find_failed() {
        let mut characters = MockCharacterRepositoryPort::new();
        characters
            .expect_list()
            .times(1)
            .returning(|| Err(RepoError::database("list characters", "problem to query")));
        let (_, service) = wire(Arc::new(characters), Arc::new(MockHouseRepositoryPort::new()));

        assert!(matches!(
            service.find().await,
            Err(ServiceError::FindFailed { entity: "characters", .. })
        ));
    }

    /// House storage whose first `clear_lord_references` call fails
    struct FlakyHouseRepository {
        inner: InMemoryHouseRepository,
        failed_once: AtomicBool,
    }

    #[async_trait]
    impl HouseRepositoryPort for FlakyHouseRepository {
        async fn insert(&self, house: &House) -> Result<(), RepoError> {
            self.inner.insert(house).await
        }

        async fn list(&self, filter: &HouseFilter) -> Result<Vec<House>, RepoError> {
            self.inner.list(filter).await
        }

        async fn get(&self, id: HouseId) -> Result<Option<House>, RepoError> {
            self.inner.get(id).await
        }

        async fn get_by_name(&self, name: &str) -> Result<Option<House>, RepoError> {
            self.inner.get_by_name(name).await
        }

        async fn update(&self, house: &House) -> Result<(), RepoError> {
            self.inner.update(house).await
        }

        async fn soft_delete(&self, id: HouseId, at: DateTime<Utc>) -> Result<(), RepoError> {
            self.inner.soft_delete(id, at).await
        }

        async fn clear_lord_references(
            &self,
            lord_id: CharacterId,
            at: DateTime<Utc>,
        ) -> Result<u64, RepoError> {
            if !self.failed_once.swap(true, Ordering::SeqCst) {
                return Err(RepoError::database("clear lord references", "database is locked"));
            }
            self.inner.clear_lord_references(lord_id, at).await
        }
    }

    #[tokio::test]
    async fn test_repeated_delete_finishes_interrupted_cascade() {
        let house_repository = Arc::new(FlakyHouseRepository {
            inner: InMemoryHouseRepository::new(),
            failed_once: AtomicBool::new(false),
        });
        let characters = Arc::new(InMemoryCharacterRepository::new());
        let (houses, service) = wire(characters, house_repository);
        let lord = service.create(patrick()).await.unwrap();
        let house = houses
            .create(HouseRequest::new("House A", "Reach", "1").with_lord(lord))
            .await
            .unwrap();

        assert!(matches!(
            service.delete(lord).await,
            Err(ServiceError::CascadeFailed { .. })
        ));
        assert_eq!(houses.find_by_id(house).await.unwrap().current_lord, Some(lord));

        service.delete(lord).await.unwrap();
        assert_eq!(houses.find_by_id(house).await.unwrap().current_lord, None);

        // Nothing left to clear
        assert!(matches!(
            service.delete(lord).await,
            Err(ServiceError::CharacterNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_atomic_deletion_skips_two_step_cascade() {
        let mut deletion = MockCharacterDeletionPort::new();
        deletion
            .expect_delete_with_lord_references()
            .times(1)
            .returning(|_, _| Ok(2));
        // No expectations on houses: the two-step cascade must not run
        let (_, service) = wire(
            Arc::new(InMemoryCharacterRepository::new()),
            Arc::new(MockHouseRepositoryPort::new()),
        );
        let service = service.with_atomic_deletion(Arc::new(deletion));

        let id = service.create(patrick()).await.unwrap();
        service.delete(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_atomic_deletion_failure_is_plain_persistence_error() {
        let mut deletion = MockCharacterDeletionPort::new();
        deletion
            .expect_delete_with_lord_references()
            .times(1)
            .returning(|_, _| Err(RepoError::database("delete character", "database is locked")));
        let characters = Arc::new(InMemoryCharacterRepository::new());
        let (_, service) = wire(characters.clone(), Arc::new(MockHouseRepositoryPort::new()));
        let service = service.with_atomic_deletion(Arc::new(deletion));

        let id = service.create(patrick()).await.unwrap();
        let err = service.delete(id).await.unwrap_err();

        // The transaction rolled back, so nothing is half done
        assert!(matches!(
            err,
            ServiceError::PersistenceFailed { operation: "delete character", .. }
        ));
        let stored = characters.get_including_deleted(id).await.unwrap().unwrap();
        assert!(stored.deleted_at.is_none());
    }
}
