//! Media upload boundary: given a binary blob, return a public URL or fail.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::errors::ServiceError;

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn store(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Upload endpoint returning `{"url": "..."}`.
#[derive(Clone, Debug)]
pub struct HttpMediaStore {
    client: reqwest::Client,
    upload_url: String,
}

impl HttpMediaStore {
    pub fn new(upload_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url,
        }
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    #[instrument(skip(self, bytes), fields(file_name, content_type, size = bytes.len()))]
    async fn store(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ServiceError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| ServiceError::MediaError(format!("Invalid content type: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::MediaError(format!("Upload unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::MediaError(format!(
                "Upload failed with {status}: {body}"
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::MediaError(format!("Upload malformed reply: {e}")))?;
        Ok(uploaded.url)
    }
}

/// Placeholder for deployments without an upload endpoint configured.
#[derive(Clone, Debug, Default)]
pub struct DisabledMediaStore;

#[async_trait]
impl MediaStore for DisabledMediaStore {
    async fn store(
        &self,
        _file_name: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, ServiceError> {
        Err(ServiceError::MediaError(
            "Media storage is not configured".into(),
        ))
    }
}
