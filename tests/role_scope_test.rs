//! Role-scoped visibility: admin sees global data, managers see their
//! location, an unassigned manager sees an empty set, and the driver task
//! list is derived from the fulfillment machine.

mod common;

use axum::http::Method;
use common::{response_data, TestApp};
use serde_json::{json, Value};
use uuid::Uuid;

async fn seed_product(app: &TestApp, sku: &str) -> Uuid {
    let data = response_data(
        app.request(
            Method::POST,
            "/api/v1/products",
            Some(&app.admin.token),
            Some(json!({
                "name": format!("Product {sku}"),
                "sku": sku,
                "tags": ["T-Shirts"]
            })),
        )
        .await,
    )
    .await;
    data["id"].as_str().unwrap().parse().unwrap()
}

async fn set_stock(app: &TestApp, product_id: Uuid, location_id: Uuid, quantity: i32) {
    let response = app
        .request(
            Method::PUT,
            "/api/v1/inventory/levels",
            Some(&app.admin.token),
            Some(json!({
                "product_id": product_id,
                "location_id": location_id,
                "size_name": "M",
                "quantity": quantity
            })),
        )
        .await;
    assert_eq!(response.status(), 200);
}

async fn create_pickup_order(app: &TestApp, location_id: Uuid) -> String {
    let data = response_data(
        app.request(
            Method::POST,
            "/api/v1/orders",
            Some(&app.admin.token),
            Some(json!({
                "fulfillment_kind": "pickup",
                "pickup_location_id": location_id,
                "items": [{
                    "product_id": Uuid::new_v4(),
                    "quantity": 1,
                    "unit_price": "10.00"
                }]
            })),
        )
        .await,
    )
    .await;
    data["id"].as_str().unwrap().to_string()
}

async fn list_inventory(app: &TestApp, token: &str) -> Vec<Value> {
    let data = response_data(
        app.request(Method::GET, "/api/v1/inventory", Some(token), None)
            .await,
    )
    .await;
    data["items"].as_array().unwrap().clone()
}

#[tokio::test]
async fn inventory_visibility_follows_the_role() {
    let app = TestApp::new().await;

    let product_a = seed_product(&app, "SCOPE-A").await;
    let product_b = seed_product(&app, "SCOPE-B").await;
    set_stock(&app, product_a, app.location_id, 5).await;
    set_stock(&app, product_b, app.second_location_id, 7).await;

    // Admin: every location.
    let admin_rows = list_inventory(&app, &app.admin.token).await;
    assert_eq!(admin_rows.len(), 2);

    // Manager: only the assigned location's rows.
    let manager_rows = list_inventory(&app, &app.manager.token).await;
    assert_eq!(manager_rows.len(), 1);
    assert_eq!(
        manager_rows[0]["location_id"].as_str().unwrap(),
        app.location_id.to_string()
    );

    // A manager with no assignment gets an empty page, not an error.
    let floating_rows = list_inventory(&app, &app.manager_unassigned.token).await;
    assert!(floating_rows.is_empty());

    // Drivers have no inventory scope at all.
    let driver_rows = list_inventory(&app, &app.driver.token).await;
    assert!(driver_rows.is_empty());
}

#[tokio::test]
async fn order_visibility_pins_managers_to_their_location() {
    let app = TestApp::new().await;

    let local = create_pickup_order(&app, app.location_id).await;
    let remote = create_pickup_order(&app, app.second_location_id).await;

    let admin_list = response_data(
        app.request(Method::GET, "/api/v1/orders", Some(&app.admin.token), None)
            .await,
    )
    .await;
    assert_eq!(admin_list["items"].as_array().unwrap().len(), 2);

    let manager_list = response_data(
        app.request(Method::GET, "/api/v1/orders", Some(&app.manager.token), None)
            .await,
    )
    .await;
    let manager_items = manager_list["items"].as_array().unwrap();
    assert_eq!(manager_items.len(), 1);
    assert_eq!(manager_items[0]["id"], local.as_str());

    // Fetching the out-of-scope order directly reads as absent.
    let hidden = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{remote}"),
            Some(&app.manager.token),
            None,
        )
        .await;
    assert_eq!(hidden.status(), 404);
}

#[tokio::test]
async fn driver_task_list_is_derived_from_the_machine() {
    let app = TestApp::new().await;

    let order_id = create_pickup_order(&app, app.location_id).await;

    // Freshly paid: not yet a driver task.
    let before = response_data(
        app.request(
            Method::GET,
            "/api/v1/orders/driver-tasks",
            Some(&app.driver.token),
            None,
        )
        .await,
    )
    .await;
    assert!(before.as_array().unwrap().is_empty());

    // Packed pickup: the relocation leg appears on the board.
    app.request(
        Method::POST,
        &format!("/api/v1/orders/{order_id}/transition"),
        Some(&app.admin.token),
        None,
    )
    .await;

    let during = response_data(
        app.request(
            Method::GET,
            "/api/v1/orders/driver-tasks",
            Some(&app.driver.token),
            None,
        )
        .await,
    )
    .await;
    let tasks = during.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], order_id.as_str());

    // Ready: off the board again. The view re-derives on every read.
    app.request(
        Method::POST,
        &format!("/api/v1/orders/{order_id}/transition"),
        Some(&app.admin.token),
        None,
    )
    .await;

    let after = response_data(
        app.request(
            Method::GET,
            "/api/v1/orders/driver-tasks",
            Some(&app.driver.token),
            None,
        )
        .await,
    )
    .await;
    assert!(after.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn driver_task_route_requires_the_driver_role() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/orders/driver-tasks",
            Some(&app.manager.token),
            None,
        )
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn dashboard_summary_is_scoped_like_the_lists() {
    let app = TestApp::new().await;

    let product = seed_product(&app, "DASH-A").await;
    set_stock(&app, product, app.location_id, 4).await;
    set_stock(&app, product, app.second_location_id, 6).await;

    let admin_summary = response_data(
        app.request(
            Method::GET,
            "/api/v1/dashboard/summary",
            Some(&app.admin.token),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(admin_summary["stock_on_hand"], 10);
    assert_eq!(admin_summary["active_locations"], 2);

    let manager_summary = response_data(
        app.request(
            Method::GET,
            "/api/v1/dashboard/summary",
            Some(&app.manager.token),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(manager_summary["stock_on_hand"], 4);
    assert_eq!(manager_summary["active_locations"], 1);
}
