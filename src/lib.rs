//! storeops-api library
//!
//! Core functionality for the retail store operations backend: inventory,
//! orders, logistics, staff, and location management.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod fulfillment;
pub mod handlers;
pub mod live;
pub mod media;
pub mod migrator;
pub mod openapi;
pub mod optimistic;
pub mod provisioning;
pub mod scope;
pub mod services;
pub mod sizing;

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, routing::post, routing::put, Router};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::auth::capabilities::{Portal, Role};
use crate::auth::AuthRouterExt;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub feed: events::feed::OrderFeed,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: u64, limit: u64, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(limit.max(1))
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// Enhanced API routes function
pub fn api_v1_routes() -> Router<AppState> {
    // Session echo for any authenticated role
    let session = Router::new()
        .route("/session", get(handlers::session::get_session))
        .with_auth();

    // Dashboard aggregates for back-office roles
    let dashboard = Router::new()
        .route("/dashboard/summary", get(handlers::dashboard::summary))
        .with_portal(Portal::BackOffice);

    // Orders: reads and creation for back-office roles; the transition
    // endpoint is open to every staff/driver session; the machine's actor
    // gating decides who may advance which order.
    let orders = Router::new()
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/orders/{id}", get(handlers::orders::get_order))
        .route(
            "/orders/{id}/transition",
            post(handlers::orders::transition_order),
        )
        .with_portal(Portal::BackOffice);

    let driver_tasks = Router::new()
        .route("/orders/driver-tasks", get(handlers::orders::driver_tasks))
        .with_role(Role::Driver);

    // Inventory: listing is visibility-scoped; writes check the acting
    // role and location in the handler.
    let inventory = Router::new()
        .route("/inventory", get(handlers::inventory::list_inventory))
        .route(
            "/inventory/levels",
            get(handlers::inventory::get_level).put(handlers::inventory::set_stock),
        )
        .with_portal(Portal::BackOffice);

    // Product catalog and per-size measurements
    let products = Router::new()
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::products::get_product).put(handlers::products::update_product),
        )
        .route(
            "/products/{id}/measurement-schema",
            get(handlers::products::measurement_schema),
        )
        .route(
            "/products/{id}/sizes",
            get(handlers::products::list_sizes).put(handlers::products::upsert_size),
        )
        .route(
            "/products/{id}/sizes/{size_name}",
            axum::routing::delete(handlers::products::delete_size),
        )
        .route("/products/{id}/image", post(handlers::products::upload_image))
        .with_portal(Portal::BackOffice);

    // Locations: reads for back-office roles, lifecycle admin-only
    let locations_read = Router::new()
        .route("/locations", get(handlers::locations::list_locations))
        .route("/locations/{id}", get(handlers::locations::get_location))
        .with_portal(Portal::BackOffice);

    let locations_admin = Router::new()
        .route("/locations", post(handlers::locations::create_location))
        .route(
            "/locations/{id}",
            put(handlers::locations::update_location)
                .delete(handlers::locations::delete_location),
        )
        .with_role(Role::Admin);

    // Staff management is admin-only
    let staff = Router::new()
        .route(
            "/staff",
            get(handlers::staff::list_staff).post(handlers::staff::create_staff),
        )
        .route("/staff/{id}", put(handlers::staff::update_staff))
        .route(
            "/staff/{id}/reset-password",
            post(handlers::staff::reset_password),
        )
        .with_role(Role::Admin);

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(session)
        .merge(dashboard)
        .merge(orders)
        .merge(driver_tasks)
        .merge(inventory)
        .merge(products)
        .merge(locations_read)
        .merge(locations_admin)
        .merge(staff)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let git = option_env!("GIT_HASH").unwrap_or("unknown");
    let build_time = option_env!("BUILD_TIME").unwrap_or("unknown");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "git": git,
        "build_time": build_time,
        "service": "storeops-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match db::health_check(&state.db).await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
