//! Stock boundaries: the zero-quantity delete rule and the archive
//! invariant flipping both ways on the stock-update path.

mod common;

use axum::http::Method;
use common::{response_data, TestApp};
use serde_json::{json, Value};
use uuid::Uuid;

/// Decimal columns ride through SQLite as floats; compare numerically.
fn dec(value: &Value) -> f64 {
    value.as_str().expect("decimal as string").parse().expect("decimal parses")
}

async fn seed_product(app: &TestApp, sku: &str) -> Uuid {
    let data = response_data(
        app.request(
            Method::POST,
            "/api/v1/products",
            Some(&app.admin.token),
            Some(json!({
                "name": format!("Product {sku}"),
                "sku": sku,
                "tags": ["Hoodies"]
            })),
        )
        .await,
    )
    .await;
    data["id"].as_str().unwrap().parse().unwrap()
}

async fn set_stock_as(
    app: &TestApp,
    token: &str,
    product_id: Uuid,
    location_id: Uuid,
    size: Option<&str>,
    quantity: i32,
) -> axum::response::Response {
    app.request(
        Method::PUT,
        "/api/v1/inventory/levels",
        Some(token),
        Some(json!({
            "product_id": product_id,
            "location_id": location_id,
            "size_name": size,
            "quantity": quantity
        })),
    )
    .await
}

async fn get_product(app: &TestApp, product_id: Uuid) -> Value {
    response_data(
        app.request(
            Method::GET,
            &format!("/api/v1/products/{product_id}"),
            Some(&app.admin.token),
            None,
        )
        .await,
    )
    .await
}

async fn get_level(app: &TestApp, product_id: Uuid, location_id: Uuid, size: &str) -> Value {
    response_data(
        app.request(
            Method::GET,
            &format!(
                "/api/v1/inventory/levels?product_id={product_id}&location_id={location_id}&size_name={size}"
            ),
            Some(&app.admin.token),
            None,
        )
        .await,
    )
    .await
}

#[tokio::test]
async fn zero_quantity_deletes_the_row() {
    let app = TestApp::new().await;
    let product = seed_product(&app, "ZERO-1").await;

    let stored = response_data(
        set_stock_as(&app, &app.admin.token, product, app.location_id, Some("M"), 3).await,
    )
    .await;
    assert_eq!(stored["deleted"], false);
    assert_eq!(stored["level"]["quantity"], 3);

    // Writing zero removes the row instead of storing a zero.
    let depleted = response_data(
        set_stock_as(&app, &app.admin.token, product, app.location_id, Some("M"), 0).await,
    )
    .await;
    assert_eq!(depleted["deleted"], true);
    assert_eq!(depleted["level"], Value::Null);

    // A subsequent read shows no entry for the triple.
    let after = get_level(&app, product, app.location_id, "M").await;
    assert_eq!(after, Value::Null);
}

#[tokio::test]
async fn archive_flag_follows_inventory_row_existence() {
    let app = TestApp::new().await;
    let product = seed_product(&app, "ARCH-1").await;

    // New product, no stock anywhere: archived.
    assert_eq!(get_product(&app, product).await["is_archived"], true);

    // First inventory row unarchives it.
    set_stock_as(&app, &app.admin.token, product, app.location_id, Some("M"), 5).await;
    assert_eq!(get_product(&app, product).await["is_archived"], false);

    // A second row at another location; deleting one of two keeps it live.
    set_stock_as(&app, &app.admin.token, product, app.second_location_id, Some("M"), 2).await;
    set_stock_as(&app, &app.admin.token, product, app.location_id, Some("M"), 0).await;
    assert_eq!(get_product(&app, product).await["is_archived"], false);

    // Deleting the last remaining row archives it again.
    set_stock_as(&app, &app.admin.token, product, app.second_location_id, Some("M"), 0).await;
    assert_eq!(get_product(&app, product).await["is_archived"], true);
}

#[tokio::test]
async fn sized_and_unsized_rows_are_distinct_triples() {
    let app = TestApp::new().await;
    let product = seed_product(&app, "TRIPLE-1").await;

    set_stock_as(&app, &app.admin.token, product, app.location_id, Some("M"), 4).await;
    set_stock_as(&app, &app.admin.token, product, app.location_id, None, 9).await;

    let sized = get_level(&app, product, app.location_id, "M").await;
    assert_eq!(sized["quantity"], 4);

    // Depleting the sized row leaves the unsized row alone.
    set_stock_as(&app, &app.admin.token, product, app.location_id, Some("M"), 0).await;
    assert_eq!(get_product(&app, product).await["is_archived"], false);
}

#[tokio::test]
async fn negative_quantities_are_rejected() {
    let app = TestApp::new().await;
    let product = seed_product(&app, "NEG-1").await;

    let response =
        set_stock_as(&app, &app.admin.token, product, app.location_id, Some("M"), -1).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn stock_writes_are_rejected_for_unknown_products() {
    let app = TestApp::new().await;
    let response = set_stock_as(
        &app,
        &app.admin.token,
        Uuid::new_v4(),
        app.location_id,
        Some("M"),
        5,
    )
    .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn managers_only_write_stock_at_their_own_location() {
    let app = TestApp::new().await;
    let product = seed_product(&app, "MGRW-1").await;

    let own = set_stock_as(
        &app,
        &app.manager.token,
        product,
        app.location_id,
        Some("M"),
        5,
    )
    .await;
    assert_eq!(own.status(), 200);

    let other = set_stock_as(
        &app,
        &app.manager.token,
        product,
        app.second_location_id,
        Some("M"),
        5,
    )
    .await;
    assert_eq!(other.status(), 403);

    let driver = set_stock_as(
        &app,
        &app.driver.token,
        product,
        app.location_id,
        Some("M"),
        5,
    )
    .await;
    assert_eq!(driver.status(), 403);
}

#[tokio::test]
async fn price_is_nullable_meaning_default() {
    let app = TestApp::new().await;
    let product = seed_product(&app, "PRICE-1").await;

    let response = app
        .request(
            Method::PUT,
            "/api/v1/inventory/levels",
            Some(&app.admin.token),
            Some(json!({
                "product_id": product,
                "location_id": app.location_id,
                "size_name": "L",
                "quantity": 2,
                "price": "19.99"
            })),
        )
        .await;
    let stored = response_data(response).await;
    assert_eq!(dec(&stored["level"]["price"]), 19.99);

    // Overwriting with no price resets to "use default".
    let cleared = response_data(
        set_stock_as(&app, &app.admin.token, product, app.location_id, Some("L"), 2).await,
    )
    .await;
    assert_eq!(cleared["level"]["price"], Value::Null);
}
