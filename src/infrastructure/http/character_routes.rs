//! Character API routes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::{ApiError, ApiResult};
use crate::application::dto::{CharacterRequestDto, CharacterResponseDto, CreatedIdResponseDto};
use crate::domain::value_objects::CharacterId;
use crate::infrastructure::state::AppState;

fn parse_character_id(id: &str) -> ApiResult<CharacterId> {
    CharacterId::parse(id).map_err(|_| ApiError::InvalidId("character"))
}

/// Create a character
pub async fn create_character(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CharacterRequestDto>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedIdResponseDto>)> {
    let Json(req) = body?;

    let id = state.character_service.create(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedIdResponseDto { id: id.to_string() }),
    ))
}

/// List characters
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CharacterResponseDto>>> {
    let characters = state.character_service.find().await?;
    Ok(Json(
        characters
            .into_iter()
            .map(CharacterResponseDto::from)
            .collect(),
    ))
}

/// Get a character by ID
pub async fn get_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    let character = state.character_service.find_by_id(id).await?;
    Ok(Json(CharacterResponseDto::from(character)))
}

/// Update a character
pub async fn update_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<CharacterRequestDto>, JsonRejection>,
) -> ApiResult<Json<CharacterResponseDto>> {
    let id = parse_character_id(&id)?;
    let Json(req) = body?;

    let character = state.character_service.update(id, req.into()).await?;
    Ok(Json(CharacterResponseDto::from(character)))
}

/// Delete a character, detaching it from the houses it rules
pub async fn delete_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_character_id(&id)?;
    state.character_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
