use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::entities::{product, product_size};
use crate::errors::ServiceError;
use crate::handlers::common::{clamp_limit, validate_input};
use crate::services::products::{
    CreateProductInput, MeasurementSet, SizeInput, UpdateProductInput,
};
use crate::sizing::{MeasurementField, SizeCategory};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub search: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub clothing_type: Option<String>,
    #[serde(default)]
    pub allow_custom_measurements: bool,
    pub weight_grams: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub clothing_type: Option<String>,
    pub allow_custom_measurements: Option<bool>,
    pub weight_grams: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SizeRequest {
    #[validate(length(min = 1, max = 40))]
    pub size_name: String,
    pub position: Option<i32>,
    #[serde(default)]
    pub measurements: MeasurementSet,
}

#[derive(Debug, Serialize)]
pub struct MeasurementSchemaResponse {
    pub category: SizeCategory,
    pub fields: &'static [MeasurementField],
}

pub async fn list_products(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<PaginatedResponse<product::Model>> {
    let limit = clamp_limit(query.limit);
    let page = state
        .services
        .products
        .list_products(
            query.include_archived,
            query.search.as_deref(),
            query.page,
            limit,
        )
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        page.products,
        query.page,
        limit,
        page.total,
    ))))
}

pub async fn get_product(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<product::Model> {
    let found = state.services.products.get_product(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn create_product(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<product::Model> {
    validate_input(&request)?;

    let created = state
        .services
        .products
        .create_product(CreateProductInput {
            name: request.name,
            sku: request.sku,
            tags: request.tags,
            clothing_type: request.clothing_type,
            allow_custom_measurements: request.allow_custom_measurements,
            weight_grams: request.weight_grams,
            image_url: request.image_url,
        })
        .await?;

    Ok(Json(ApiResponse::success(created)))
}

pub async fn update_product(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<product::Model> {
    let updated = state
        .services
        .products
        .update_product(
            id,
            UpdateProductInput {
                name: request.name,
                tags: request.tags,
                clothing_type: request.clothing_type,
                allow_custom_measurements: request.allow_custom_measurements,
                weight_grams: request.weight_grams,
                image_url: request.image_url,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}

/// The measurement fields the size entry form shows for this product:
/// exactly `fields_for(detect_category(tags))`.
pub async fn measurement_schema(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<MeasurementSchemaResponse> {
    let (category, fields) = state.services.products.measurement_schema(id).await?;
    Ok(Json(ApiResponse::success(MeasurementSchemaResponse {
        category,
        fields,
    })))
}

pub async fn list_sizes(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<product_size::Model>> {
    let sizes = state.services.products.list_sizes(id).await?;
    Ok(Json(ApiResponse::success(sizes)))
}

pub async fn upsert_size(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SizeRequest>,
) -> ApiResult<product_size::Model> {
    validate_input(&request)?;

    let stored = state
        .services
        .products
        .upsert_size(
            id,
            SizeInput {
                size_name: request.size_name,
                position: request.position,
                measurements: request.measurements,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(stored)))
}

pub async fn delete_size(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((id, size_name)): Path<(Uuid, String)>,
) -> ApiResult<serde_json::Value> {
    state.services.products.delete_size(id, &size_name).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": size_name }),
    )))
}

/// Accepts a raw image body, stores it through the media boundary, and
/// records the returned public URL on the product.
pub async fn upload_image(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<product::Model> {
    if body.is_empty() {
        return Err(ServiceError::ValidationError("Empty upload body".into()));
    }

    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let extension = match content_type.as_str() {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "bin",
    };
    let file_name = format!("product-{id}.{extension}");

    let url = state
        .services
        .media
        .store(&file_name, &content_type, body.to_vec())
        .await?;

    let updated = state.services.products.set_image(id, url).await?;
    Ok(Json(ApiResponse::success(updated)))
}
