//! Measurement schema selection and sparse size round-trips: what was
//! saved comes back exactly, and reclassification never purges stale
//! out-of-category values.

mod common;

use axum::http::Method;
use common::{response_data, TestApp};
use serde_json::{json, Value};
use uuid::Uuid;

/// Decimal columns ride through SQLite as floats; compare numerically.
fn dec(value: &Value) -> f64 {
    value.as_str().expect("decimal as string").parse().expect("decimal parses")
}

async fn create_product(app: &TestApp, sku: &str, tags: Vec<&str>) -> Uuid {
    let data = response_data(
        app.request(
            Method::POST,
            "/api/v1/products",
            Some(&app.admin.token),
            Some(json!({
                "name": format!("Product {sku}"),
                "sku": sku,
                "tags": tags
            })),
        )
        .await,
    )
    .await;
    data["id"].as_str().unwrap().parse().unwrap()
}

async fn schema(app: &TestApp, product_id: Uuid) -> Value {
    response_data(
        app.request(
            Method::GET,
            &format!("/api/v1/products/{product_id}/measurement-schema"),
            Some(&app.admin.token),
            None,
        )
        .await,
    )
    .await
}

async fn list_sizes(app: &TestApp, product_id: Uuid) -> Vec<Value> {
    let data = response_data(
        app.request(
            Method::GET,
            &format!("/api/v1/products/{product_id}/sizes"),
            Some(&app.admin.token),
            None,
        )
        .await,
    )
    .await;
    data.as_array().unwrap().clone()
}

#[tokio::test]
async fn schema_follows_the_detected_category() {
    let app = TestApp::new().await;

    let belt = create_product(&app, "BELT-1", vec!["Leather Belt", "Accessories"]).await;
    let belt_schema = schema(&app, belt).await;
    assert_eq!(belt_schema["category"], "belts");
    let keys: Vec<&str> = belt_schema["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["belt_length_cm", "belt_width_cm"]);

    let shoes = create_product(&app, "SHOE-1", vec!["Running Sneakers"]).await;
    assert_eq!(schema(&app, shoes).await["category"], "shoes");

    let poster = create_product(&app, "POSTER-1", vec!["Vintage Poster"]).await;
    let generic = schema(&app, poster).await;
    assert_eq!(generic["category"], "generic");
    assert!(!generic["fields"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn clothing_type_wins_over_the_tag_set() {
    let app = TestApp::new().await;

    let data = response_data(
        app.request(
            Method::POST,
            "/api/v1/products",
            Some(&app.admin.token),
            Some(json!({
                "name": "Boxed Gift",
                "sku": "GIFT-1",
                "tags": ["Gift", "Bundle"],
                "clothing_type": "Jacket"
            })),
        )
        .await,
    )
    .await;
    let id: Uuid = data["id"].as_str().unwrap().parse().unwrap();

    assert_eq!(schema(&app, id).await["category"], "jackets");
}

#[tokio::test]
async fn sparse_measurements_round_trip_exactly() {
    let app = TestApp::new().await;
    let belt = create_product(&app, "BELT-RT", vec!["Leather Belt"]).await;

    let stored = response_data(
        app.request(
            Method::PUT,
            &format!("/api/v1/products/{belt}/sizes"),
            Some(&app.admin.token),
            Some(json!({
                "size_name": "100cm",
                "measurements": {
                    "belt_length_cm": "100",
                    "belt_width_cm": "3.5"
                }
            })),
        )
        .await,
    )
    .await;
    assert_eq!(dec(&stored["belt_length_cm"]), 100.0);
    assert_eq!(dec(&stored["belt_width_cm"]), 3.5);

    let sizes = list_sizes(&app, belt).await;
    assert_eq!(sizes.len(), 1);
    let size = &sizes[0];

    // Exactly the written fields are non-null...
    assert_eq!(size["size_name"], "100cm");
    assert_eq!(dec(&size["belt_length_cm"]), 100.0);
    assert_eq!(dec(&size["belt_width_cm"]), 3.5);
    // ...and nothing else was coerced into existence.
    for key in [
        "chest_cm",
        "waist_cm",
        "hip_cm",
        "inseam_cm",
        "shoulder_cm",
        "sleeve_cm",
        "front_length_cm",
        "back_length_cm",
        "thigh_cm",
        "shoe_size_us",
        "shoe_size_eu",
        "foot_length_cm",
        "foot_width_cm",
    ] {
        assert_eq!(size[key], Value::Null, "{key} should stay null");
    }
}

#[tokio::test]
async fn size_names_denormalize_onto_the_product_in_order() {
    let app = TestApp::new().await;
    let shirt = create_product(&app, "SHIRT-DN", vec!["T-Shirts"]).await;

    for (name, position) in [("M", 1), ("S", 0), ("L", 2)] {
        app.request(
            Method::PUT,
            &format!("/api/v1/products/{shirt}/sizes"),
            Some(&app.admin.token),
            Some(json!({
                "size_name": name,
                "position": position,
                "measurements": {}
            })),
        )
        .await;
    }

    let product = response_data(
        app.request(
            Method::GET,
            &format!("/api/v1/products/{shirt}"),
            Some(&app.admin.token),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(product["sizes"], "S,M,L");

    // Deleting a size rebuilds the list.
    app.request(
        Method::DELETE,
        &format!("/api/v1/products/{shirt}/sizes/M"),
        Some(&app.admin.token),
        None,
    )
    .await;

    let product = response_data(
        app.request(
            Method::GET,
            &format!("/api/v1/products/{shirt}"),
            Some(&app.admin.token),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(product["sizes"], "S,L");
}

#[tokio::test]
async fn reclassification_keeps_stale_out_of_category_values() {
    let app = TestApp::new().await;
    let product = create_product(&app, "RECLASS-1", vec!["Leather Belt"]).await;

    app.request(
        Method::PUT,
        &format!("/api/v1/products/{product}/sizes"),
        Some(&app.admin.token),
        Some(json!({
            "size_name": "One Size",
            "measurements": { "belt_length_cm": "110" }
        })),
    )
    .await;

    // Retag the product into the pants category.
    app.request(
        Method::PUT,
        &format!("/api/v1/products/{product}"),
        Some(&app.admin.token),
        Some(json!({ "tags": ["Denim Jeans"] })),
    )
    .await;
    assert_eq!(schema(&app, product).await["category"], "pants");

    // A pants-form update touches only pants fields; the belt value stays.
    app.request(
        Method::PUT,
        &format!("/api/v1/products/{product}/sizes"),
        Some(&app.admin.token),
        Some(json!({
            "size_name": "One Size",
            "measurements": { "waist_cm": "82" }
        })),
    )
    .await;

    let sizes = list_sizes(&app, product).await;
    assert_eq!(dec(&sizes[0]["waist_cm"]), 82.0);
    assert_eq!(dec(&sizes[0]["belt_length_cm"]), 110.0);
}

#[tokio::test]
async fn duplicate_sku_is_a_conflict() {
    let app = TestApp::new().await;
    create_product(&app, "DUP-1", vec![]).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(&app.admin.token),
            Some(json!({
                "name": "Duplicate",
                "sku": "DUP-1",
                "tags": []
            })),
        )
        .await;
    assert_eq!(response.status(), 409);
}
