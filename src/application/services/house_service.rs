//! House Service - Application service for house management
//!
//! Enforces the house business rules on top of the storage port:
//! unique names among live houses, existence checks before mutation,
//! merge-on-update and soft deletion. Also owns the bulk "clear lord"
//! operation the character rules call when a lord is deleted.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::error::{find_failed, persistence_failed, ServiceError};
use crate::application::ports::outbound::{
    ClockPort, HouseFilter, HouseRepositoryPort, IdGeneratorPort, RepoError,
};
use crate::domain::entities::{House, HouseRequest};
use crate::domain::validation::Validate;
use crate::domain::value_objects::{CharacterId, HouseId};

/// House service trait defining the application use cases
#[async_trait]
pub trait HouseService: Send + Sync {
    /// Create a house, returning its new identifier
    async fn create(&self, request: HouseRequest) -> Result<HouseId, ServiceError>;

    /// List live houses, optionally narrowed to an exact name
    async fn find(&self, filter: HouseFilter) -> Result<Vec<House>, ServiceError>;

    async fn find_by_id(&self, id: HouseId) -> Result<House, ServiceError>;

    /// Replace a house's fields with the request, stamping `updated_at`
    async fn update(&self, id: HouseId, request: HouseRequest) -> Result<House, ServiceError>;

    /// Soft-delete a house
    async fn delete(&self, id: HouseId) -> Result<(), ServiceError>;

    /// Detach a lord from every house it rules; matching nothing is not an error
    async fn clear_lord_reference(&self, lord_id: CharacterId) -> Result<u64, ServiceError>;
}

/// Default implementation of HouseService over a storage port
pub struct HouseServiceImpl {
    repository: Arc<dyn HouseRepositoryPort>,
    clock: Arc<dyn ClockPort>,
    ids: Arc<dyn IdGeneratorPort>,
}

impl HouseServiceImpl {
    pub fn new(
        repository: Arc<dyn HouseRepositoryPort>,
        clock: Arc<dyn ClockPort>,
        ids: Arc<dyn IdGeneratorPort>,
    ) -> Self {
        Self {
            repository,
            clock,
            ids,
        }
    }

    fn validate(request: &HouseRequest) -> Result<(), ServiceError> {
        request.validate().map_err(|e| {
            warn!(fields = ?e.fields(), "Rejected house request");
            ServiceError::from(e)
        })
    }

    /// Fail with `NameAlreadyUsed` if a live house other than `owner` holds `name`
    async fn ensure_name_free(
        &self,
        name: &str,
        owner: Option<HouseId>,
    ) -> Result<(), ServiceError> {
        match self.repository.get_by_name(name).await {
            Ok(Some(existing)) if Some(existing.id) != owner => {
                warn!(name, existing_id = %existing.id, "House name already used");
                Err(ServiceError::NameAlreadyUsed(name.to_string()))
            }
            Ok(_) => Ok(()),
            Err(e) => Err(persistence_failed("check house name", e)),
        }
    }

    /// The unique index can still reject a write that passed the name check
    fn write_failed(operation: &'static str, name: &str, source: RepoError) -> ServiceError {
        if source.is_constraint_violation() {
            warn!(name, "House name claimed concurrently");
            ServiceError::NameAlreadyUsed(name.to_string())
        } else {
            persistence_failed(operation, source)
        }
    }
}

#[async_trait]
impl HouseService for HouseServiceImpl {
    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create(&self, request: HouseRequest) -> Result<HouseId, ServiceError> {
        Self::validate(&request)?;
        self.ensure_name_free(&request.name, None).await?;

        let id = HouseId::from_uuid(self.ids.new_uuid());
        let house = House::create(id, request, self.clock.now());

        self.repository
            .insert(&house)
            .await
            .map_err(|e| Self::write_failed("create house", &house.name, e))?;

        info!(house_id = %id, "Created house: {}", house.name);
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn find(&self, filter: HouseFilter) -> Result<Vec<House>, ServiceError> {
        let houses = self
            .repository
            .list(&filter)
            .await
            .map_err(|e| find_failed("houses", e))?;

        debug!(count = houses.len(), "Listed houses");
        Ok(houses)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: HouseId) -> Result<House, ServiceError> {
        debug!(house_id = %id, "Fetching house");
        self.repository
            .get(id)
            .await
            .map_err(|e| find_failed("house", e))?
            .ok_or_else(|| {
                debug!(house_id = %id, "House not found");
                ServiceError::HouseNotFound(id)
            })
    }

    #[instrument(skip(self, request), fields(house_id = %id))]
    async fn update(&self, id: HouseId, request: HouseRequest) -> Result<House, ServiceError> {
        Self::validate(&request)?;

        let mut house = self.find_by_id(id).await?;

        if request.name != house.name {
            self.ensure_name_free(&request.name, Some(id)).await?;
        }

        house.merge(&request, self.clock.now());

        self.repository
            .update(&house)
            .await
            .map_err(|e| Self::write_failed("update house", &house.name, e))?;

        info!(house_id = %id, "Updated house: {}", house.name);
        Ok(house)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: HouseId) -> Result<(), ServiceError> {
        let house = self.find_by_id(id).await?;

        self.repository
            .soft_delete(id, self.clock.now())
            .await
            .map_err(|e| persistence_failed("delete house", e))?;

        info!(house_id = %id, "Deleted house: {}", house.name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_lord_reference(&self, lord_id: CharacterId) -> Result<u64, ServiceError> {
        let cleared = self
            .repository
            .clear_lord_references(lord_id, self.clock.now())
            .await
            .map_err(|e| persistence_failed("clear lord references", e))?;

        info!(lord_id = %lord_id, cleared, "Cleared lord references");
        Ok(cleared)
    }
}
