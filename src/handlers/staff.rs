use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::capabilities::Role;
use crate::auth::CurrentUser;
use crate::entities::profile;
use crate::handlers::common::validate_input;
use crate::services::staff::{CreateStaffInput, UpdateStaffInput};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub assigned_location_id: Option<Uuid>,
    pub is_active: bool,
}

impl From<profile::Model> for StaffProfileResponse {
    fn from(model: profile::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            full_name: model.full_name,
            role: model.role,
            assigned_location_id: model.assigned_location_id,
            is_active: model.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStaffRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Passwords need at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
    pub role: Role,
    pub assigned_location_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdateStaffRequest {
    pub role: Option<Role>,
    pub assigned_location_id: Option<Uuid>,
    #[serde(default)]
    pub clear_location: bool,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "Passwords need at least 8 characters"))]
    pub new_password: String,
}

pub async fn list_staff(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<StaffProfileResponse>> {
    let staff = state.services.staff.list_staff(&user.caps).await?;
    Ok(Json(ApiResponse::success(
        staff.into_iter().map(Into::into).collect(),
    )))
}

pub async fn create_staff(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateStaffRequest>,
) -> ApiResult<StaffProfileResponse> {
    validate_input(&request)?;

    let created = state
        .services
        .staff
        .create_staff(
            &user.caps,
            CreateStaffInput {
                email: request.email,
                password: request.password,
                full_name: request.full_name,
                role: request.role,
                assigned_location_id: request.assigned_location_id,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(created.into())))
}

pub async fn update_staff(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStaffRequest>,
) -> ApiResult<StaffProfileResponse> {
    let updated = state
        .services
        .staff
        .update_staff(
            &user.caps,
            id,
            UpdateStaffInput {
                role: request.role,
                assigned_location_id: request.assigned_location_id,
                clear_location: request.clear_location,
                is_active: request.is_active,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(updated.into())))
}

pub async fn reset_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ResetPasswordRequest>,
) -> ApiResult<serde_json::Value> {
    validate_input(&request)?;

    state
        .services
        .staff
        .reset_password(&user.caps, id, &request.new_password)
        .await?;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "reset": id }),
    )))
}
