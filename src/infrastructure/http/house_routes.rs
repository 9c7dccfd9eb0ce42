//! House API routes

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::{ApiError, ApiResult};
use crate::application::dto::{
    CreatedIdResponseDto, HouseListQueryDto, HouseListResponseDto, HouseRequestDto,
    HouseResponseDto,
};
use crate::application::ports::outbound::HouseFilter;
use crate::domain::value_objects::{HouseId, Pagination};
use crate::infrastructure::state::AppState;

fn parse_house_id(id: &str) -> ApiResult<HouseId> {
    HouseId::parse(id).map_err(|_| ApiError::InvalidId("house"))
}

/// Create a house
pub async fn create_house(
    State(state): State<Arc<AppState>>,
    body: Result<Json<HouseRequestDto>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedIdResponseDto>)> {
    let Json(req) = body?;

    let id = state.house_service.create(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedIdResponseDto { id: id.to_string() }),
    ))
}

/// List houses, optionally by exact name
pub async fn list_houses(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HouseListQueryDto>, QueryRejection>,
) -> ApiResult<Json<HouseListResponseDto>> {
    let Query(query) = query?;
    let page = Pagination::new(query.limit, query.offset);
    let filter = HouseFilter::new(query.name, page);

    let houses = state.house_service.find(filter).await?;

    Ok(Json(HouseListResponseDto {
        data: houses.into_iter().map(HouseResponseDto::from).collect(),
        limit: page.limit,
        offset: page.offset,
    }))
}

/// Get a house by ID
pub async fn get_house(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<HouseResponseDto>> {
    let id = parse_house_id(&id)?;
    let house = state.house_service.find_by_id(id).await?;
    Ok(Json(HouseResponseDto::from(house)))
}

/// Update a house
pub async fn update_house(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<HouseRequestDto>, JsonRejection>,
) -> ApiResult<Json<HouseResponseDto>> {
    let id = parse_house_id(&id)?;
    let Json(req) = body?;

    let house = state.house_service.update(id, req.into()).await?;
    Ok(Json(HouseResponseDto::from(house)))
}

/// Delete a house
pub async fn delete_house(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_house_id(&id)?;
    state.house_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
