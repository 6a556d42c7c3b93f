//! Credential provisioning boundary.
//!
//! Staff accounts are provisioned and reset through a capability-shaped
//! interface: given a role and target identity, provision or reset
//! credentials, or fail with a descriptive error. The HTTP implementation
//! calls the hosted `create-user` / `reset-password` functions; the local
//! implementation hashes credentials in-process for self-contained
//! deployments and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::capabilities::Role;
use crate::auth::hash_password;
use crate::errors::ServiceError;

/// Input to credential provisioning.
#[derive(Clone, Debug, Serialize)]
pub struct ProvisionRequest {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

/// Outcome of provisioning. `password_hash` is `None` when the credentials
/// live with the hosted identity provider rather than in our profiles table.
#[derive(Clone, Debug)]
pub struct ProvisionedCredentials {
    pub profile_id: Uuid,
    pub password_hash: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialProvisioner: Send + Sync {
    async fn provision(&self, req: &ProvisionRequest) -> Result<ProvisionedCredentials, ServiceError>;

    /// Returns the replacement password hash to store, when the credentials
    /// are held locally.
    async fn reset_password(
        &self,
        profile_id: Uuid,
        new_password: &str,
    ) -> Result<Option<String>, ServiceError>;
}

/// In-process provisioning: credentials are argon2-hashed and stored on the
/// profile row.
#[derive(Clone, Debug, Default)]
pub struct LocalProvisioner;

#[async_trait]
impl CredentialProvisioner for LocalProvisioner {
    async fn provision(&self, req: &ProvisionRequest) -> Result<ProvisionedCredentials, ServiceError> {
        let hash = hash_password(&req.password)?;
        Ok(ProvisionedCredentials {
            profile_id: Uuid::new_v4(),
            password_hash: Some(hash),
        })
    }

    async fn reset_password(
        &self,
        _profile_id: Uuid,
        new_password: &str,
    ) -> Result<Option<String>, ServiceError> {
        Ok(Some(hash_password(new_password)?))
    }
}

#[derive(Debug, Deserialize)]
struct CreateUserResponse {
    user_id: Uuid,
}

/// Provisioning over the hosted platform's privileged server-side functions.
#[derive(Clone, Debug)]
pub struct HttpProvisioner {
    client: reqwest::Client,
    base_url: String,
    service_token: Option<String>,
}

impl HttpProvisioner {
    pub fn new(base_url: String, service_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_token,
        }
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(format!("{}/{path}", self.base_url));
        if let Some(token) = &self.service_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::ProvisioningError(format!(
            "{context} failed with {status}: {body}"
        )))
    }
}

#[async_trait]
impl CredentialProvisioner for HttpProvisioner {
    #[instrument(skip(self, req), fields(email = %req.email, role = %req.role))]
    async fn provision(&self, req: &ProvisionRequest) -> Result<ProvisionedCredentials, ServiceError> {
        let response = self
            .request("create-user")
            .json(&serde_json::json!({
                "email": req.email,
                "password": req.password,
                "full_name": req.full_name,
                "role": req.role,
            }))
            .send()
            .await
            .map_err(|e| ServiceError::ProvisioningError(format!("create-user unreachable: {e}")))?;

        let created: CreateUserResponse = Self::check(response, "create-user")
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::ProvisioningError(format!("create-user malformed reply: {e}")))?;

        Ok(ProvisionedCredentials {
            profile_id: created.user_id,
            password_hash: None,
        })
    }

    #[instrument(skip(self, new_password))]
    async fn reset_password(
        &self,
        profile_id: Uuid,
        new_password: &str,
    ) -> Result<Option<String>, ServiceError> {
        let response = self
            .request("reset-password")
            .json(&serde_json::json!({
                "user_id": profile_id,
                "password": new_password,
            }))
            .send()
            .await
            .map_err(|e| ServiceError::ProvisioningError(format!("reset-password unreachable: {e}")))?;

        Self::check(response, "reset-password").await?;
        Ok(None)
    }
}
