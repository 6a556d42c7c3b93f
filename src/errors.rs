use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Structured error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g. "Not Found", "Forbidden")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Additional detail (validation errors, failed cascade step)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error: &str, message: String, details: Option<String>) -> Self {
        Self {
            error: error.to_string(),
            message,
            details,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error taxonomy for the service layer. Every component-level failure is
/// caught at the asynchronous call site and converted to one of these; none
/// propagates uncaught to a global handler.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// A transition outside the fulfillment table, or one triggered by the
    /// wrong actor.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Wrong credentials. Deliberately distinct from [`Self::AccessDenied`].
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Authenticated but not permitted: missing profile, role outside the
    /// portal's allowed set, or capability check failed.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The hosted provisioning RPC (create-user / reset-password) refused or
    /// was unreachable.
    #[error("Provisioning error: {0}")]
    ProvisioningError(String),

    #[error("Media storage error: {0}")]
    MediaError(String),

    #[error("Event dispatch error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    fn status_and_category(&self) -> (StatusCode, &'static str) {
        match self {
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            ServiceError::ValidationError(_)
            | ServiceError::InvalidStatus(_)
            | ServiceError::InvalidTransition(_) => (StatusCode::BAD_REQUEST, "Bad Request"),
            ServiceError::AuthError(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ServiceError::AccessDenied(_) | ServiceError::Forbidden(_) => {
                (StatusCode::FORBIDDEN, "Forbidden")
            }
            ServiceError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            ServiceError::ProvisioningError(_) | ServiceError::MediaError(_) => {
                (StatusCode::BAD_GATEWAY, "Bad Gateway")
            }
            ServiceError::DatabaseError(_)
            | ServiceError::EventError(_)
            | ServiceError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, category) = self.status_and_category();

        // Internal failure detail stays in the logs, not the response body.
        let message = match &self {
            ServiceError::DatabaseError(err) => {
                tracing::error!(error = %err, "database error");
                "A database error occurred".to_string()
            }
            ServiceError::InternalError(msg) => {
                tracing::error!(error = %msg, "internal error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse::new(category, message, None);
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(errors.to_string())
    }
}

/// Application-level errors raised during startup and wiring.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database connection error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_and_access_denied_map_to_distinct_statuses() {
        let (wrong_password, _) =
            ServiceError::AuthError("invalid email or password".into()).status_and_category();
        let (denied, _) =
            ServiceError::AccessDenied("role not permitted".into()).status_and_category();
        assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
        assert_eq!(denied, StatusCode::FORBIDDEN);
    }

    #[test]
    fn illegal_transition_is_a_client_error() {
        let (status, _) =
            ServiceError::InvalidTransition("packed/pos has no next state".into())
                .status_and_category();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
