use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{House, HouseRequest};

/// Body of `POST /houses` and `PUT /houses/{id}`.
///
/// Missing fields decode as empty so they surface as validation violations.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HouseRequestDto {
    pub name: String,
    pub region: String,
    pub foundation_year: String,
    pub current_lord: String,
}

impl From<HouseRequestDto> for HouseRequest {
    fn from(dto: HouseRequestDto) -> Self {
        Self {
            name: dto.name,
            region: dto.region,
            foundation_year: dto.foundation_year,
            current_lord: dto.current_lord,
        }
    }
}

/// Query string of `GET /houses`
#[derive(Debug, Default, Deserialize)]
pub struct HouseListQueryDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HouseResponseDto {
    pub id: String,
    pub name: String,
    pub region: String,
    pub foundation_year: String,
    /// Empty when the house has no lord
    pub current_lord: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<House> for HouseResponseDto {
    fn from(h: House) -> Self {
        Self {
            id: h.id.to_string(),
            name: h.name,
            region: h.region,
            foundation_year: h.foundation_year,
            current_lord: h.current_lord.map(|l| l.to_string()).unwrap_or_default(),
            created_at: h.created_at,
            updated_at: h.updated_at,
        }
    }
}

/// Page of houses with the normalised window that produced it
#[derive(Debug, Serialize)]
pub struct HouseListResponseDto {
    pub data: Vec<HouseResponseDto>,
    pub limit: u32,
    pub offset: u32,
}
