use axum::{extract::State, Json};

use crate::auth::CurrentUser;
use crate::services::dashboard::DashboardSummary;
use crate::{ApiResponse, ApiResult, AppState};

/// Landing page aggregates, computed through the session's visibility scope.
pub async fn summary(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<DashboardSummary> {
    let summary = state.services.dashboard.summary(&user.caps).await?;
    Ok(Json(ApiResponse::success(summary)))
}
