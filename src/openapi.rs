use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document for the storeops surface. Schemas cover the request and
/// response DTOs; entity rows ride through as plain JSON.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "storeops-api",
        description = "Retail store operations backend: inventory, orders, logistics, staff, and location management"
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::auth::LoginRequest,
        crate::auth::LoginResponse,
        crate::auth::AuthToken,
        crate::auth::capabilities::Role,
        crate::auth::capabilities::Portal,
        crate::fulfillment::OrderStatus,
        crate::fulfillment::FulfillmentKind,
        crate::sizing::SizeCategory,
        crate::entities::location::LocationKind,
        crate::handlers::orders::CreateOrderRequest,
        crate::handlers::orders::CreateOrderItemRequest,
        crate::handlers::orders::OrderResponse,
        crate::handlers::orders::OrderItemResponse,
        crate::handlers::orders::OrderDetailResponse,
        crate::handlers::inventory::SetStockRequest,
        crate::handlers::products::CreateProductRequest,
        crate::handlers::products::UpdateProductRequest,
        crate::handlers::products::SizeRequest,
        crate::handlers::locations::CreateLocationRequest,
        crate::handlers::locations::UpdateLocationRequest,
        crate::handlers::staff::StaffProfileResponse,
        crate::handlers::staff::CreateStaffRequest,
        crate::handlers::staff::UpdateStaffRequest,
        crate::handlers::staff::ResetPasswordRequest,
        crate::handlers::session::SessionResponse,
        crate::services::products::MeasurementSet,
        crate::services::dashboard::DashboardSummary,
        crate::services::dashboard::StatusCount,
    )),
    tags(
        (name = "auth", description = "Login, logout, session resolution"),
        (name = "orders", description = "Order lifecycle and driver tasks"),
        (name = "inventory", description = "Stock levels"),
        (name = "products", description = "Catalog and size measurements"),
        (name = "locations", description = "Stores, warehouses, courier anchors"),
        (name = "staff", description = "Staff provisioning and assignment")
    )
)]
pub struct ApiDoc;

/// Swagger UI mount serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
