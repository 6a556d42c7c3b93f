// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request},
    middleware::Next,
    response::Response,
    Router,
};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use storeops_api::{
    auth::{self, capabilities::Role, AuthConfig, AuthService},
    config::AppConfig,
    db::{self, DbConfig},
    entities::{location, profile},
    events::{self, feed::OrderFeed, EventSender},
    handlers::AppServices,
    media::DisabledMediaStore,
    migrator::Migrator,
    provisioning::LocalProvisioner,
    AppState,
};

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub struct SeededUser {
    pub profile_id: Uuid,
    pub email: String,
    pub token: String,
}

/// Test harness backed by an in-memory SQLite database (single connection,
/// so every query sees the same store). Seeds one profile per role plus two
/// locations and logs the staff roles in for ready-to-use bearer tokens.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub auth_service: Arc<AuthService>,
    pub admin: SeededUser,
    pub manager: SeededUser,
    pub manager_unassigned: SeededUser,
    pub driver: SeededUser,
    pub customer_email: String,
    /// The manager's assigned location.
    pub location_id: Uuid,
    pub second_location_id: Uuid,
    _event_task: tokio::task::JoinHandle<()>,
}

async fn inject_auth_service(
    State(auth): State<Arc<AuthService>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    req.extensions_mut().insert(auth);
    next.run(req).await
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        let db_pool = db::establish_connection_with_config(&DbConfig {
            url: cfg.database_url.clone(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .expect("database connection");
        Migrator::up(&db_pool, None).await.expect("migrations");
        let db_arc = Arc::new(db_pool);

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let feed = OrderFeed::default();
        let event_task = tokio::spawn(events::process_events(event_rx, feed.clone()));

        let auth_service = Arc::new(AuthService::new(
            AuthConfig::new(
                cfg.jwt_secret.clone(),
                cfg.auth_issuer.clone(),
                cfg.auth_audience.clone(),
                Duration::from_secs(cfg.jwt_expiration),
            ),
            db_arc.clone(),
        ));

        let services = AppServices::new(
            db_arc.clone(),
            event_sender.clone(),
            Arc::new(LocalProvisioner),
            Arc::new(DisabledMediaStore),
        );

        let state = AppState {
            db: db_arc.clone(),
            config: cfg,
            event_sender,
            feed,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", storeops_api::api_v1_routes())
            .nest("/auth", auth::auth_routes().with_state(auth_service.clone()))
            .layer(axum::middleware::from_fn_with_state(
                auth_service.clone(),
                inject_auth_service,
            ))
            .with_state(state.clone());

        let location_id = seed_location(&state, "Main Street Store", "store").await;
        let second_location_id = seed_location(&state, "North Warehouse", "warehouse").await;

        let admin = seed_profile(&state, "admin@storeops.test", "Avery Admin", Role::Admin, None).await;
        let manager = seed_profile(
            &state,
            "manager@storeops.test",
            "Morgan Manager",
            Role::Manager,
            Some(location_id),
        )
        .await;
        let manager_unassigned = seed_profile(
            &state,
            "floating.manager@storeops.test",
            "Frankie Floating",
            Role::Manager,
            None,
        )
        .await;
        let driver = seed_profile(
            &state,
            "driver@storeops.test",
            "Devon Driver",
            Role::Driver,
            None,
        )
        .await;
        let customer_email = "customer@storeops.test".to_string();
        seed_profile(&state, &customer_email, "Casey Customer", Role::Customer, None).await;

        let mut app = Self {
            router,
            state,
            auth_service,
            admin,
            manager,
            manager_unassigned,
            driver,
            customer_email,
            location_id,
            second_location_id,
            _event_task: event_task,
        };

        app.admin.token = app.login(&app.admin.email.clone()).await;
        app.manager.token = app.login(&app.manager.email.clone()).await;
        app.manager_unassigned.token = app.login(&app.manager_unassigned.email.clone()).await;
        app.driver.token = app.login(&app.driver.email.clone()).await;

        app
    }

    /// Logs a seeded staff profile in through the back-office portal.
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(response.status(), 200, "login should succeed for {email}");
        let body = response_json(response).await;
        body["access_token"]
            .as_str()
            .expect("access token in login response")
            .to_string()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        self.router.clone().oneshot(request).await.expect("response")
    }

    /// Forces an order into a specific stored status, bypassing the machine.
    /// Only for arranging test fixtures.
    pub async fn force_order_status(&self, order_id: Uuid, status: &str) {
        use storeops_api::entities::order;

        let order = order::Entity::find_by_id(order_id)
            .one(&*self.state.db)
            .await
            .expect("query")
            .expect("order exists");
        let mut active: order::ActiveModel = order.into();
        active.status = Set(status.to_string());
        active.update(&*self.state.db).await.expect("update");
    }

    pub async fn set_profile_role(&self, profile_id: Uuid, role: &str) {
        let row = profile::Entity::find_by_id(profile_id)
            .one(&*self.state.db)
            .await
            .expect("query")
            .expect("profile exists");
        let mut active: profile::ActiveModel = row.into();
        active.role = Set(role.to_string());
        active.update(&*self.state.db).await.expect("update");
    }
}

async fn seed_location(state: &AppState, name: &str, kind: &str) -> Uuid {
    let id = Uuid::new_v4();
    location::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        kind: Set(kind.to_string()),
        address: Set(format!("{name}, 1 High Street")),
        latitude: Set(None),
        longitude: Set(None),
        is_active: Set(true),
        created_at: Set(Utc::now()),
    }
    .insert(&*state.db)
    .await
    .expect("seed location");
    id
}

async fn seed_profile(
    state: &AppState,
    email: &str,
    full_name: &str,
    role: Role,
    assigned_location_id: Option<Uuid>,
) -> SeededUser {
    let id = Uuid::new_v4();
    profile::ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        full_name: Set(full_name.to_string()),
        password_hash: Set(auth::hash_password(TEST_PASSWORD).expect("hash")),
        role: Set(role.as_str().to_string()),
        assigned_location_id: Set(assigned_location_id),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(&*state.db)
    .await
    .expect("seed profile");

    SeededUser {
        profile_id: id,
        email: email.to_string(),
        token: String::new(),
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Unwraps the standard `{ success, data }` envelope.
pub async fn response_data(response: Response) -> Value {
    let body = response_json(response).await;
    assert_eq!(body["success"], true, "expected success envelope: {body}");
    body["data"].clone()
}
