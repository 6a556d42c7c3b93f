use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::capabilities::Capabilities;
use crate::auth::CurrentUser;
use crate::entities::inventory_level;
use crate::errors::ServiceError;
use crate::handlers::common::{clamp_limit, validate_input};
use crate::services::inventory::StockWrite;
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetStockRequest {
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub size_name: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    pub price: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct SetStockResponse {
    /// The stored row; absent when the write depleted the triple (a zero
    /// quantity deletes the row instead of storing a zero).
    pub level: Option<inventory_level::Model>,
    pub deleted: bool,
}

#[derive(Debug, Deserialize)]
pub struct LevelQuery {
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub size_name: Option<String>,
}

/// Stock writes are a staff concern, and managers only write at their own
/// location.
fn check_stock_write(caps: &Capabilities, location_id: Uuid) -> Result<(), ServiceError> {
    if caps.is_admin {
        return Ok(());
    }
    if caps.is_manager {
        return match caps.assigned_location {
            Some(assigned) if assigned == location_id => Ok(()),
            _ => Err(ServiceError::AccessDenied(
                "Managers can only adjust stock at their assigned location".into(),
            )),
        };
    }
    Err(ServiceError::AccessDenied(
        "Stock adjustment requires a staff role".into(),
    ))
}

pub async fn list_inventory(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<inventory_level::Model>> {
    let limit = clamp_limit(query.limit);
    let page = state
        .services
        .inventory
        .list_levels(&user.caps, query.page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        page.levels,
        query.page,
        limit,
        page.total,
    ))))
}

pub async fn set_stock(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SetStockRequest>,
) -> ApiResult<SetStockResponse> {
    validate_input(&request)?;
    check_stock_write(&user.caps, request.location_id)?;

    let stored = state
        .services
        .inventory
        .set_stock(StockWrite {
            product_id: request.product_id,
            location_id: request.location_id,
            size_name: request.size_name,
            quantity: request.quantity,
            price: request.price,
        })
        .await?;

    let deleted = stored.is_none();
    Ok(Json(ApiResponse::success(SetStockResponse {
        level: stored,
        deleted,
    })))
}

pub async fn get_level(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<LevelQuery>,
) -> ApiResult<Option<inventory_level::Model>> {
    // Reads follow the same location discipline as the list scope.
    if !user.caps.is_admin {
        check_stock_write(&user.caps, query.location_id)?;
    }

    let level = state
        .services
        .inventory
        .get_level(query.product_id, query.location_id, query.size_name.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(level)))
}
