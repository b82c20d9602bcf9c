use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::errors::ServiceError;

/// Account profile as reported by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityAccount {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifiedToken {
    subject: String,
}

/// Client for the third-party identity provider.
///
/// Tokens are opaque to this system; verification happens entirely on the
/// provider's side. All calls carry the backend secret key and a bounded
/// timeout.
#[derive(Clone)]
pub struct IdentityProviderClient {
    http: Client,
    base_url: String,
    secret_key: String,
}

impl IdentityProviderClient {
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, secret_key, http))
    }

    /// Build a client from an existing reqwest client (useful for testing).
    pub fn with_client(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        http: Client,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }

    /// Verify a bearer token and return the provider-side account id it
    /// belongs to. Any rejection from the provider maps to `Unauthorized`.
    pub async fn verify_token(&self, token: &str) -> Result<String, ServiceError> {
        let response = self
            .http
            .post(format!("{}/v1/tokens/verify", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let verified: VerifiedToken = response.json().await?;
                debug!(subject = %verified.subject, "token verified");
                Ok(verified.subject)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
            | StatusCode::BAD_REQUEST => Err(ServiceError::Unauthorized(
                "Invalid or expired token".to_string(),
            )),
            status => Err(ServiceError::ExternalServiceError(format!(
                "identity provider returned {status} during token verification"
            ))),
        }
    }

    /// Fetch the account profile for a verified subject.
    pub async fn fetch_account(&self, subject: &str) -> Result<IdentityAccount, ServiceError> {
        let response = self
            .http
            .get(format!("{}/v1/users/{subject}", self.base_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(ServiceError::Unauthorized(
                "Account no longer exists at the identity provider".to_string(),
            )),
            status => Err(ServiceError::ExternalServiceError(format!(
                "identity provider returned {status} during account lookup"
            ))),
        }
    }

    /// Delete the provider-side account. Callers treat failures as
    /// best-effort; this method still reports them so they can be logged.
    pub async fn delete_account(&self, subject: &str) -> Result<(), ServiceError> {
        let response = self
            .http
            .delete(format!("{}/v1/users/{subject}", self.base_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Already gone on the provider side is as good as deleted.
            StatusCode::NOT_FOUND => Ok(()),
            status => Err(ServiceError::ExternalServiceError(format!(
                "identity provider returned {status} during account deletion"
            ))),
        }
    }
}
