use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Character, CharacterRequest};

/// Body of `POST /characters` and `PUT /characters/{id}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CharacterRequestDto {
    pub name: String,
    pub tv_series: Vec<String>,
}

impl From<CharacterRequestDto> for CharacterRequest {
    fn from(dto: CharacterRequestDto) -> Self {
        Self {
            name: dto.name,
            tv_series: dto.tv_series,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CharacterResponseDto {
    pub id: String,
    pub name: String,
    pub tv_series: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Character> for CharacterResponseDto {
    fn from(c: Character) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name,
            tv_series: c.tv_series,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
