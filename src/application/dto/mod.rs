//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so infrastructure (HTTP) can
//! serialize/deserialize without pulling serde into the domain model.

pub mod character;
pub mod house;

pub use character::*;
pub use house::*;

use serde::Serialize;

use crate::domain::validation::Violation;

#[derive(Debug, Serialize)]
pub struct CreatedIdResponseDto {
    pub id: String,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponseDto {
    pub http_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Vec<Violation>>,
}
