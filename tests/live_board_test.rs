//! The live order board: refresh-on-change through the feed, optimistic
//! transition rollback, and deterministic teardown.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use uuid::Uuid;

use storeops_api::auth::capabilities::Capabilities;
use storeops_api::entities::profile;
use storeops_api::errors::ServiceError;
use storeops_api::fulfillment::FulfillmentKind;
use storeops_api::live::OrderBoard;
use storeops_api::services::orders::{CreateOrderInput, CreateOrderItemInput};

async fn caps_for(app: &TestApp, profile_id: Uuid) -> Capabilities {
    let row = profile::Entity::find_by_id(profile_id)
        .one(&*app.state.db)
        .await
        .expect("query")
        .expect("profile");
    Capabilities::resolve(&row).expect("capabilities")
}

fn courier_input() -> CreateOrderInput {
    CreateOrderInput {
        fulfillment_kind: FulfillmentKind::Courier,
        customer_id: None,
        cashier_id: None,
        pickup_location_id: None,
        delivery_address: Some("3 Quay Street".into()),
        items: vec![CreateOrderItemInput {
            product_id: Uuid::new_v4(),
            quantity: 1,
            size_name: None,
            unit_price: dec!(15.00),
        }],
    }
}

async fn settle() {
    // Let the event loop and the board's refetch task run.
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn board_refreshes_on_every_order_change() {
    let app = TestApp::new().await;
    let caps = caps_for(&app, app.admin.profile_id).await;

    let board = OrderBoard::mount(
        app.state.services.orders.clone(),
        &app.state.feed,
        caps.clone(),
    )
    .await
    .expect("mount");
    assert!(board.snapshot().await.is_empty());

    // Creation flows through the event bus onto the feed.
    let created = app
        .state
        .services
        .orders
        .create_order(courier_input())
        .await
        .expect("create");
    settle().await;
    assert_eq!(board.snapshot().await.len(), 1);

    // A status write from "another actor" shows up without the board
    // being told directly.
    app.state
        .services
        .orders
        .transition(created.id, &caps)
        .await
        .expect("transition");
    settle().await;
    let snapshot = board.snapshot().await;
    assert_eq!(snapshot[0].status, "packed");
}

#[tokio::test]
async fn rejected_transition_rolls_the_local_copy_back() {
    let app = TestApp::new().await;
    let staff_caps = caps_for(&app, app.admin.profile_id).await;

    let created = app
        .state
        .services
        .orders
        .create_order(courier_input())
        .await
        .expect("create");
    // Walk it to transit, where the only remaining action belongs to a
    // driver.
    app.state
        .services
        .orders
        .transition(created.id, &staff_caps)
        .await
        .expect("pack");
    app.state
        .services
        .orders
        .transition(created.id, &staff_caps)
        .await
        .expect("dispatch");

    let board = OrderBoard::mount(
        app.state.services.orders.clone(),
        &app.state.feed,
        staff_caps,
    )
    .await
    .expect("mount");

    let before = board.snapshot().await;
    assert_eq!(before[0].status, "transit");

    // Staff cannot mark a courier order delivered; the optimistic local
    // flip must be undone and the error surfaced.
    let result = board.transition(created.id).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let after = board.snapshot().await;
    assert_eq!(after[0].status, "transit", "local state must roll back");
}

#[tokio::test]
async fn unmounted_board_stops_refreshing() {
    let app = TestApp::new().await;
    let caps = caps_for(&app, app.admin.profile_id).await;

    let board = OrderBoard::mount(
        app.state.services.orders.clone(),
        &app.state.feed,
        caps,
    )
    .await
    .expect("mount");

    board.unmount();
    assert!(!board.is_mounted());
    // Unmount twice: teardown is idempotent.
    board.unmount();

    app.state
        .services
        .orders
        .create_order(courier_input())
        .await
        .expect("create");
    settle().await;

    assert!(
        board.snapshot().await.is_empty(),
        "an unmounted board must not pick up new state"
    );
}

#[tokio::test]
async fn dropping_the_board_releases_its_subscription() {
    let app = TestApp::new().await;
    let caps = caps_for(&app, app.admin.profile_id).await;

    let before = app.state.feed.subscriber_count();
    {
        let _board = OrderBoard::mount(
            app.state.services.orders.clone(),
            &app.state.feed,
            caps,
        )
        .await
        .expect("mount");
        settle().await;
        assert_eq!(app.state.feed.subscriber_count(), before + 1);
    }
    settle().await;
    assert_eq!(app.state.feed.subscriber_count(), before);
}

#[tokio::test]
async fn board_lists_are_scoped_like_everything_else() {
    let app = TestApp::new().await;
    let unassigned_caps = caps_for(&app, app.manager_unassigned.profile_id).await;

    app.state
        .services
        .orders
        .create_order(courier_input())
        .await
        .expect("create");

    let board = OrderBoard::mount(
        Arc::clone(&app.state.services.orders),
        &app.state.feed,
        unassigned_caps,
    )
    .await
    .expect("mount");
    settle().await;

    // A manager without an assignment sees the degenerate empty set.
    assert!(board.snapshot().await.is_empty());
}
