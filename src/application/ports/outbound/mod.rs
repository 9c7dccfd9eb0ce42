//! Outbound ports - Interfaces that the application requires from external systems

mod clock_port;
mod repository_port;

pub use clock_port::{ClockPort, IdGeneratorPort};
pub use repository_port::{
    CharacterDeletionPort, CharacterRepositoryPort, HouseFilter, HouseRepositoryPort, RepoError,
};

#[cfg(test)]
pub use clock_port::{MockClockPort, MockIdGeneratorPort};
#[cfg(test)]
pub use repository_port::{
    MockCharacterDeletionPort, MockCharacterRepositoryPort, MockHouseRepositoryPort,
};
