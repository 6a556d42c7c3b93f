use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::{ApiResponse, ApiResult};

/// The capability view of the current session. Flags are derived from the
/// role at resolution time; clients consume them as plain booleans.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub profile_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub is_admin: bool,
    pub is_manager: bool,
    pub is_driver: bool,
    pub assigned_location_id: Option<Uuid>,
}

pub async fn get_session(user: CurrentUser) -> ApiResult<SessionResponse> {
    Ok(Json(ApiResponse::success(SessionResponse {
        profile_id: user.profile.id,
        email: user.profile.email,
        full_name: user.profile.full_name,
        role: user.profile.role,
        is_admin: user.caps.is_admin,
        is_manager: user.caps.is_manager,
        is_driver: user.caps.is_driver,
        assigned_location_id: user.caps.assigned_location,
    })))
}
