use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::entities::location::{self, LocationKind};
use crate::handlers::common::validate_input;
use crate::services::locations::{CreateLocationInput, UpdateLocationInput};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct LocationListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub kind: LocationKind,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdateLocationRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: Option<bool>,
}

pub async fn list_locations(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<LocationListQuery>,
) -> ApiResult<Vec<location::Model>> {
    let locations = state
        .services
        .locations
        .list_locations(query.include_inactive)
        .await?;
    Ok(Json(ApiResponse::success(locations)))
}

pub async fn get_location(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<location::Model> {
    let found = state.services.locations.get_location(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn create_location(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<CreateLocationRequest>,
) -> ApiResult<location::Model> {
    validate_input(&request)?;

    let created = state
        .services
        .locations
        .create_location(CreateLocationInput {
            name: request.name,
            kind: request.kind,
            address: request.address,
            latitude: request.latitude,
            longitude: request.longitude,
        })
        .await?;

    Ok(Json(ApiResponse::success(created)))
}

pub async fn update_location(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateLocationRequest>,
) -> ApiResult<location::Model> {
    let updated = state
        .services
        .locations
        .update_location(
            id,
            UpdateLocationInput {
                name: request.name,
                address: request.address,
                latitude: request.latitude,
                longitude: request.longitude,
                is_active: request.is_active,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}

/// Deletes a location and everything referencing it, as one transaction.
pub async fn delete_location(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.locations.delete_location(id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}
