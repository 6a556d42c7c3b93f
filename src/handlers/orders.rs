use axum::{
    extract::{Path, State},
    Json,
};
use axum::extract::Query;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::entities::{order, order_item};
use crate::errors::ServiceError;
use crate::fulfillment::{self, FulfillmentKind, OrderStatus};
use crate::handlers::common::{clamp_limit, validate_input};
use crate::services::orders::{CreateOrderInput, CreateOrderItemInput};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub size_name: Option<String>,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub fulfillment_kind: FulfillmentKind,
    pub customer_id: Option<Uuid>,
    pub pickup_location_id: Option<Uuid>,
    pub delivery_address: Option<String>,
    #[validate(length(min = 1, message = "An order needs at least one item"))]
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub fulfillment_kind: FulfillmentKind,
    pub customer_id: Option<Uuid>,
    pub cashier_id: Option<Uuid>,
    pub pickup_location_id: Option<Uuid>,
    pub delivery_address: Option<String>,
    pub total_amount: Decimal,
    /// The single action this order currently offers, if any.
    pub available_action: Option<String>,
    pub is_driver_task: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub size_name: Option<String>,
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

fn map_order(model: &order::Model) -> Result<OrderResponse, ServiceError> {
    let status = model.status()?;
    let kind = model.fulfillment_kind()?;

    Ok(OrderResponse {
        id: model.id,
        order_number: model.order_number.clone(),
        status,
        fulfillment_kind: kind,
        customer_id: model.customer_id,
        cashier_id: model.cashier_id,
        pickup_location_id: model.pickup_location_id,
        delivery_address: model.delivery_address.clone(),
        total_amount: model.total_amount,
        available_action: fulfillment::next_transition(status, kind).map(|t| t.action.to_string()),
        is_driver_task: fulfillment::is_driver_task(status, kind),
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn map_item(model: &order_item::Model) -> OrderItemResponse {
    OrderItemResponse {
        id: model.id,
        product_id: model.product_id,
        quantity: model.quantity,
        size_name: model.size_name.clone(),
        unit_price: model.unit_price,
    }
}

pub async fn list_orders(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<OrderResponse>> {
    let limit = clamp_limit(query.limit);
    let page = state
        .services
        .orders
        .list_orders(&user.caps, query.page, limit)
        .await?;

    let items = page
        .orders
        .iter()
        .map(map_order)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, query.page, limit, page.total,
    ))))
}

pub async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderDetailResponse> {
    let order = state.services.orders.get_order(id, &user.caps).await?;
    let items = state.services.orders.order_items(id).await?;

    Ok(Json(ApiResponse::success(OrderDetailResponse {
        order: map_order(&order)?,
        items: items.iter().map(map_item).collect(),
    })))
}

pub async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<OrderResponse> {
    validate_input(&request)?;

    if !(user.caps.is_admin || user.caps.is_manager) {
        return Err(ServiceError::AccessDenied(
            "Creating orders requires a staff role".into(),
        ));
    }

    // POS sales record the acting staff member as the cashier.
    let cashier_id =
        (request.fulfillment_kind == FulfillmentKind::Pos).then_some(user.caps.profile_id);

    let input = CreateOrderInput {
        fulfillment_kind: request.fulfillment_kind,
        customer_id: request.customer_id,
        cashier_id,
        pickup_location_id: request.pickup_location_id,
        delivery_address: request.delivery_address,
        items: request
            .items
            .into_iter()
            .map(|item| CreateOrderItemInput {
                product_id: item.product_id,
                quantity: item.quantity,
                size_name: item.size_name,
                unit_price: item.unit_price,
            })
            .collect(),
    };

    let created = state.services.orders.create_order(input).await?;
    Ok(Json(ApiResponse::success(map_order(&created)?)))
}

/// Applies the order's single legal next transition. The state machine and
/// the acting role are enforced in the service; an illegal pair never
/// reaches the database.
pub async fn transition_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderResponse> {
    let updated = state.services.orders.transition(id, &user.caps).await?;
    Ok(Json(ApiResponse::success(map_order(&updated)?)))
}

/// The driver work list, derived fresh from the fulfillment machine.
pub async fn driver_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<OrderResponse>> {
    let tasks = state.services.orders.driver_tasks(&user.caps).await?;
    let items = tasks.iter().map(map_order).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(ApiResponse::success(items)))
}
