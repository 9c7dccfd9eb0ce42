//! Service error taxonomy shared by the house and character rules

use tracing::error;

use crate::application::ports::outbound::RepoError;
use crate::domain::validation::ValidationErrors;
use crate::domain::value_objects::{CharacterId, HouseId};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The request broke one or more field constraints.
    #[error(transparent)]
    ValidationFailed(#[from] ValidationErrors),

    /// Another live house already holds this name.
    #[error("name {0:?} already used in another house")]
    NameAlreadyUsed(String),

    #[error("house {0} is not found or deleted")]
    HouseNotFound(HouseId),

    #[error("character {0} is not found or deleted")]
    CharacterNotFound(CharacterId),

    /// The lookup itself failed; zero results is never this.
    #[error("failed to find {entity}")]
    FindFailed {
        entity: &'static str,
        #[source]
        source: RepoError,
    },

    #[error("failed to {operation}")]
    PersistenceFailed {
        operation: &'static str,
        #[source]
        source: RepoError,
    },

    /// The character is already soft-deleted but houses may still name it as lord.
    #[error("character {character_id} was deleted but its lord references were not cleared")]
    CascadeFailed {
        character_id: CharacterId,
        #[source]
        source: Box<ServiceError>,
    },
}

impl ServiceError {
    /// True for failures the caller can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed(_)
                | Self::NameAlreadyUsed(_)
                | Self::HouseNotFound(_)
                | Self::CharacterNotFound(_)
        )
    }
}

pub(crate) fn find_failed(entity: &'static str, source: RepoError) -> ServiceError {
    error!(entity, error = %source, "Storage lookup failed");
    ServiceError::FindFailed { entity, source }
}

pub(crate) fn persistence_failed(operation: &'static str, source: RepoError) -> ServiceError {
    error!(operation, error = %source, "Storage write failed");
    ServiceError::PersistenceFailed { operation, source }
}
