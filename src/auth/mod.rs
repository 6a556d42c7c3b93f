//! Authentication and session resolution.
//!
//! JWT bearer tokens carry the profile id; the middleware re-resolves the
//! profile row on every request so role and location reassignments take
//! effect on the next data fetch. A token whose profile has vanished, been
//! deactivated, or fallen outside the portal's allowed role set is revoked
//! on the spot (forced sign-out) and the request fails with access-denied,
//! deliberately distinct from a bad-credentials failure.

pub mod capabilities;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::profile;
use crate::errors::ServiceError;
use capabilities::{Capabilities, Portal, Role};

/// Claim structure for access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Profile id
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Token id, the unit of revocation
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authentication failures surfaced by the middleware and extractors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    ExpiredToken,
    #[error("Token has been revoked")]
    RevokedToken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Authentication service error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AuthError::AccessDenied(_) => (StatusCode::FORBIDDEN, "Forbidden"),
            AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            _ => (StatusCode::UNAUTHORIZED, "Unauthorized"),
        };
        let body = serde_json::json!({
            "error": error,
            "message": self.to_string(),
            "timestamp": Utc::now().to_rfc3339(),
        });
        (status, Json(body)).into_response()
    }
}

/// Authentication configuration.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        issuer: String,
        audience: String,
        token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            issuer,
            audience,
            token_expiration,
        }
    }
}

/// Issued access token.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// The resolved session: the profile row as of this request plus the
/// capability flags derived from it. `token_id` is the revocation handle
/// for forced sign-out.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub profile: profile::Model,
    pub caps: Capabilities,
    pub token_id: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Token issuance, validation, revocation, and session resolution.
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DatabaseConnection>,
    revoked: RwLock<HashSet<String>>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            revoked: RwLock::new(HashSet::new()),
        }
    }

    /// Verify credentials, check the portal's allowed role set, and issue a
    /// token. Wrong credentials and a disallowed role produce different
    /// errors on purpose.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        portal: Portal,
    ) -> Result<(AuthToken, profile::Model), ServiceError> {
        let profile = profile::Entity::find()
            .filter(profile::Column::Email.eq(email))
            .one(&*self.db)
            .await?;

        let profile = match profile {
            Some(p) if p.is_active => p,
            _ => {
                debug!(email, "login rejected: unknown or inactive profile");
                return Err(ServiceError::AuthError("Invalid email or password".into()));
            }
        };

        if !verify_password(password, &profile.password_hash) {
            debug!(email, "login rejected: password mismatch");
            return Err(ServiceError::AuthError("Invalid email or password".into()));
        }

        let role = profile.role()?;
        if !portal.admits(role) {
            warn!(email, role = role.as_str(), "login rejected: role not permitted for portal");
            return Err(ServiceError::AccessDenied(format!(
                "Role '{role}' is not permitted on this portal"
            )));
        }

        let token = self.issue_token(&profile)?;
        Ok((token, profile))
    }

    fn issue_token(&self, profile: &profile::Model) -> Result<AuthToken, ServiceError> {
        let now = Utc::now().timestamp();
        let expires_in = self.config.token_expiration.as_secs();
        let claims = Claims {
            sub: profile.id.to_string(),
            email: profile.email.clone(),
            role: profile.role.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + expires_in as i64,
            nbf: now,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("Failed to sign token: {e}")))?;

        Ok(AuthToken {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in,
        })
    }

    /// Validate a bearer token's signature, time bounds, and revocation
    /// state.
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_nbf = true;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        if self.revoked.read().await.contains(&data.claims.jti) {
            return Err(AuthError::RevokedToken);
        }

        Ok(data.claims)
    }

    /// Revoke the presented token (sign-out). Expired tokens are accepted
    /// here so a stale session can still be cleared.
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = false;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|_| AuthError::InvalidToken)?;

        self.revoke_jti(data.claims.jti).await;
        Ok(())
    }

    pub async fn revoke_jti(&self, jti: String) {
        self.revoked.write().await.insert(jti);
    }

    /// Resolve validated claims into a session. The profile row is loaded
    /// fresh on every request; a missing or deactivated profile invalidates
    /// the session and surfaces access-denied.
    pub async fn resolve_session(&self, claims: &Claims) -> Result<CurrentUser, AuthError> {
        let profile_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        let profile = profile::Entity::find_by_id(profile_id)
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let profile = match profile {
            Some(p) if p.is_active => p,
            _ => {
                warn!(%profile_id, "session invalidated: profile missing or inactive");
                self.revoke_jti(claims.jti.clone()).await;
                return Err(AuthError::AccessDenied(
                    "No active profile for this session; signed out".into(),
                ));
            }
        };

        let caps = match Capabilities::resolve(&profile) {
            Ok(caps) => caps,
            Err(_) => {
                warn!(%profile_id, role = %profile.role, "session invalidated: unrecognized role");
                self.revoke_jti(claims.jti.clone()).await;
                return Err(AuthError::AccessDenied(format!(
                    "Role '{}' is not recognized; signed out",
                    profile.role
                )));
            }
        };

        Ok(CurrentUser {
            profile,
            caps,
            token_id: claims.jti.clone(),
        })
    }
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::InternalError(format!("Failed to hash password: {e}")))
}

/// Constant-shape verification; an empty or unparsable stored hash fails
/// closed (hosted-identity deployments never authenticate locally).
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Authentication middleware: validates the bearer token, resolves the
/// session, and stores the `CurrentUser` in request extensions.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    let Some(token) = bearer_token(request.headers()) else {
        return AuthError::MissingAuth.into_response();
    };

    let user = match auth_service.validate_token(token).await {
        Ok(claims) => match auth_service.resolve_session(&claims).await {
            Ok(user) => user,
            Err(e) => return e.into_response(),
        },
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Portal middleware: the resolved role must be in the portal's allowed
/// set. A mismatch invalidates the session (forced sign-out) before the
/// access-denied error is surfaced.
pub async fn portal_middleware(
    State(portal): State<Portal>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(AuthError::MissingAuth)?;

    if !portal.admits(user.caps.role) {
        if let Some(auth_service) = request.extensions().get::<Arc<AuthService>>() {
            auth_service.revoke_jti(user.token_id.clone()).await;
        }
        return Err(AuthError::AccessDenied(format!(
            "Role '{}' is not permitted on this portal",
            user.caps.role
        )));
    }

    Ok(next.run(request).await)
}

/// Role middleware: requires one exact role.
pub async fn role_middleware(
    State(required): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(AuthError::MissingAuth)?;

    if user.caps.role != required {
        return Err(AuthError::AccessDenied(format!(
            "Requires the '{required}' role"
        )));
    }

    Ok(next.run(request).await)
}

/// Extension methods for gating route groups.
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_portal(self, portal: Portal) -> Self;
    fn with_role(self, role: Role) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_portal(self, portal: Portal) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            portal,
            portal_middleware,
        ))
        .with_auth()
    }

    fn with_role(self, role: Role) -> Self {
        self.layer(axum::middleware::from_fn_with_state(role, role_middleware))
            .with_auth()
    }
}

/// Login request body.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    /// Which surface the client is signing in to.
    #[serde(default = "default_portal")]
    pub portal: Portal,
}

fn default_portal() -> Portal {
    Portal::BackOffice
}

/// Login response: token plus the resolved profile summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub profile_id: Uuid,
    pub full_name: String,
    pub role: String,
    pub assigned_location_id: Option<Uuid>,
}

/// Authentication routes.
pub fn auth_routes() -> axum::Router<Arc<AuthService>> {
    axum::Router::new()
        .route("/login", axum::routing::post(login_handler))
        .route("/logout", axum::routing::post(logout_handler))
}

async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    request.validate()?;

    let (token, profile) = auth_service
        .login(&request.email, &request.password, request.portal)
        .await?;

    Ok(Json(LoginResponse {
        access_token: token.access_token,
        token_type: token.token_type,
        expires_in: token.expires_in,
        profile_id: profile.id,
        full_name: profile.full_name,
        role: profile.role,
        assigned_location_id: profile.assigned_location_id,
    }))
}

async fn logout_handler(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AuthError> {
    let Some(token) = bearer_token(&headers) else {
        return Err(AuthError::MissingAuth);
    };
    auth_service.revoke_token(token).await?;
    Ok(Json(serde_json::json!({ "message": "Signed out" })))
}
