//! Session resolution: credential failures vs. portal denial, forced
//! sign-out, and per-request role re-resolution.

mod common;

use axum::http::Method;
use common::{response_data, response_json, TestApp, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn login_resolves_capability_flags() {
    let app = TestApp::new().await;

    let session = response_data(
        app.request(
            Method::GET,
            "/api/v1/session",
            Some(&app.admin.token),
            None,
        )
        .await,
    )
    .await;

    assert_eq!(session["is_admin"], true);
    assert_eq!(session["is_manager"], false);
    assert_eq!(session["is_driver"], false);
    assert_eq!(session["role"], "admin");
}

#[tokio::test]
async fn wrong_password_is_unauthorized_not_forbidden() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "email": app.admin.email,
                "password": "not-the-password",
            })),
        )
        .await;

    assert_eq!(response.status(), 401);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Authentication error: Invalid email or password");
}

#[tokio::test]
async fn customer_role_is_denied_at_the_portal_distinctly() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "email": app.customer_email,
                "password": TEST_PASSWORD,
            })),
        )
        .await;

    // Right credentials, wrong role: forbidden, not unauthorized.
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn unknown_email_reads_the_same_as_a_bad_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "email": "nobody@storeops.test",
                "password": TEST_PASSWORD,
            })),
        )
        .await;

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/v1/session", None, None).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn role_reassignment_takes_effect_on_the_next_request() {
    let app = TestApp::new().await;

    // The manager's session works...
    let ok = app
        .request(
            Method::GET,
            "/api/v1/session",
            Some(&app.manager.token),
            None,
        )
        .await;
    assert_eq!(ok.status(), 200);

    // ...until the profile row loses its back-office role. The next request
    // re-resolves the profile, denies the portal, and revokes the session.
    app.set_profile_role(app.manager.profile_id, "customer").await;

    let denied = app
        .request(
            Method::GET,
            "/api/v1/orders",
            Some(&app.manager.token),
            None,
        )
        .await;
    assert_eq!(denied.status(), 403);

    // The portal denial forced a sign-out: restoring the role does not
    // resurrect the revoked session.
    app.set_profile_role(app.manager.profile_id, "manager").await;
    let still_out = app
        .request(
            Method::GET,
            "/api/v1/orders",
            Some(&app.manager.token),
            None,
        )
        .await;
    assert_eq!(still_out.status(), 401);
}

#[tokio::test]
async fn vanished_profile_forces_sign_out_permanently() {
    let app = TestApp::new().await;

    // Deactivate the driver under their live session.
    use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};
    use storeops_api::entities::profile;
    let row = profile::Entity::find_by_id(app.driver.profile_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: profile::ActiveModel = row.into();
    active.is_active = Set(false);
    active.update(&*app.state.db).await.unwrap();

    let denied = app
        .request(
            Method::GET,
            "/api/v1/session",
            Some(&app.driver.token),
            None,
        )
        .await;
    assert_eq!(denied.status(), 403);

    // Reactivating does not resurrect the revoked token.
    let row = profile::Entity::find_by_id(app.driver.profile_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: profile::ActiveModel = row.into();
    active.is_active = Set(true);
    active.update(&*app.state.db).await.unwrap();

    let still_denied = app
        .request(
            Method::GET,
            "/api/v1/session",
            Some(&app.driver.token),
            None,
        )
        .await;
    assert_eq!(still_denied.status(), 401);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = TestApp::new().await;
    let token = app.login(&app.admin.email).await;

    let logout = app
        .request(Method::POST, "/auth/logout", Some(&token), None)
        .await;
    assert_eq!(logout.status(), 200);

    let after = app
        .request(Method::GET, "/api/v1/session", Some(&token), None)
        .await;
    assert_eq!(after.status(), 401);
}
