//! Application services - Use case implementations
//!
//! Each service follows hexagonal architecture principles, accepting port
//! dependencies at construction and returning domain entities or a typed
//! [`ServiceError`].

pub mod character_service;
pub mod error;
pub mod house_service;

pub use character_service::{CharacterService, CharacterServiceImpl};
pub use error::ServiceError;
pub use house_service::{HouseService, HouseServiceImpl};
