use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::info;

use crate::errors::ServiceError;

/// Kind of asset held at the media CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Folder suffix under the configured upload folder.
    fn folder_suffix(&self) -> &'static str {
        match self {
            Self::Image => "products",
            Self::Video => "hero-videos",
        }
    }
}

/// Result of a successful upload: a durable URL plus the storage id used
/// for later deletion.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StoredMedia {
    pub url: String,
    pub public_id: String,
}

/// Client for the third-party media CDN.
#[derive(Clone)]
pub struct MediaStorageClient {
    http: Client,
    base_url: String,
    api_key: String,
    folder: String,
}

impl MediaStorageClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        folder: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, api_key, folder, http))
    }

    /// Build a client from an existing reqwest client (useful for testing).
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        folder: impl Into<String>,
        http: Client,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            folder: folder.into(),
        }
    }

    /// Upload a file and return its durable URL and storage id.
    pub async fn upload(
        &self,
        kind: MediaKind,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredMedia, ServiceError> {
        let part = Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = Form::new()
            .text("folder", format!("{}/{}", self.folder, kind.folder_suffix()))
            .text("resource_type", kind.as_str())
            .part("file", part);

        let response = self
            .http
            .post(format!("{}/v1/assets", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "media storage returned {} during upload",
                response.status()
            )));
        }

        let stored: StoredMedia = response.json().await?;
        info!(public_id = %stored.public_id, kind = kind.as_str(), "uploaded media asset");
        Ok(stored)
    }

    /// Remove a stored asset. An asset that is already gone counts as
    /// removed; callers decide whether other failures are fatal.
    pub async fn destroy(&self, kind: MediaKind, public_id: &str) -> Result<(), ServiceError> {
        let response = self
            .http
            .delete(format!("{}/v1/assets", self.base_url))
            .query(&[("public_id", public_id), ("resource_type", kind.as_str())])
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            status => Err(ServiceError::ExternalServiceError(format!(
                "media storage returned {status} during deletion"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> MediaStorageClient {
        MediaStorageClient::new(
            server.uri(),
            "media_key_123",
            "vendora",
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn upload_returns_url_and_public_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/assets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "https://cdn.example.com/vendora/products/widget.jpg",
                "public_id": "vendora/products/widget"
            })))
            .mount(&server)
            .await;

        let stored = client_for(&server)
            .await
            .upload(
                MediaKind::Image,
                "widget.jpg",
                "image/jpeg",
                Bytes::from_static(b"\xFF\xD8\xFF"),
            )
            .await
            .unwrap();
        assert_eq!(stored.public_id, "vendora/products/widget");
        assert!(stored.url.ends_with("widget.jpg"));
    }

    #[tokio::test]
    async fn destroy_tolerates_missing_assets() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/assets"))
            .and(query_param("public_id", "vendora/hero-videos/gone"))
            .and(query_param("resource_type", "video"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(client_for(&server)
            .await
            .destroy(MediaKind::Video, "vendora/hero-videos/gone")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn upstream_failure_surfaces_as_external_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/assets"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .upload(
                MediaKind::Image,
                "x.png",
                "image/png",
                Bytes::from_static(b"png"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ExternalServiceError(_)));
    }
}
