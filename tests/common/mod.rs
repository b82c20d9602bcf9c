#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vendora_api::clients::{IdentityProviderClient, MediaStorageClient};
use vendora_api::config::AppConfig;
use vendora_api::db;
use vendora_api::entities::{user, UserModel, UserRole};
use vendora_api::handlers::AppServices;
use vendora_api::AppState;

/// Helper harness: application state backed by a throwaway SQLite database,
/// with the identity provider and media CDN stubbed by wiremock servers.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub identity_server: MockServer,
    pub media_server: MockServer,
    _db_dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let identity_server = MockServer::start().await;
        let media_server = MockServer::start().await;

        let db_dir = TempDir::new().expect("failed to create temp dir for test db");
        let db_path = db_dir.path().join("vendora_test.db");
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let mut cfg = AppConfig::new(
            database_url,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
            identity_server.uri(),
            "sk_test_secret_key".to_string(),
            media_server.uri(),
            "media_key_123".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let identity = Arc::new(
            IdentityProviderClient::new(
                identity_server.uri(),
                "sk_test_secret_key",
                Duration::from_secs(2),
            )
            .expect("identity client"),
        );
        let media = Arc::new(
            MediaStorageClient::new(
                media_server.uri(),
                "media_key_123",
                "vendora",
                Duration::from_secs(2),
            )
            .expect("media client"),
        );

        let services = AppServices::new(db_arc.clone(), identity.clone(), media.clone());

        let state = AppState {
            db: db_arc,
            config: cfg,
            services,
            identity,
            media,
        };

        let router = Router::new()
            .nest("/api", vendora_api::api_routes(state.clone()))
            .with_state(state.clone());

        Self {
            router,
            state,
            identity_server,
            media_server,
            _db_dir: db_dir,
        }
    }

    /// Register a token with the stubbed identity provider: verifying
    /// `token` yields `external_id`, whose profile is the given identity.
    pub async fn register_identity(
        &self,
        token: &str,
        external_id: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) {
        Mock::given(method("POST"))
            .and(path("/v1/tokens/verify"))
            .and(body_json(serde_json::json!({ "token": token })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "subject": external_id })),
            )
            .mount(&self.identity_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/v1/users/{external_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": external_id,
                "email": email,
                "first_name": first_name,
                "last_name": last_name,
                "image_url": null,
            })))
            .mount(&self.identity_server)
            .await;
    }

    /// Stub the media CDN: uploads succeed with a derived public id, and
    /// deletions succeed.
    pub async fn stub_media_storage(&self) {
        Mock::given(method("POST"))
            .and(path("/v1/assets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "https://cdn.test/vendora/asset",
                "public_id": "vendora/asset",
            })))
            .mount(&self.media_server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/v1/assets"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.media_server)
            .await;
    }

    /// Seed a local user row directly, bypassing the identity flow.
    pub async fn seed_user(&self, external_id: &str, email: &str, role: UserRole) -> UserModel {
        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            external_id: Set(external_id.to_string()),
            email: Set(email.to_string()),
            first_name: Set("Seeded".to_string()),
            last_name: Set("User".to_string()),
            role: Set(role),
            is_active: Set(true),
            avatar_url: Set(None),
            last_login: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model.insert(&*self.state.db).await.expect("seed user")
    }

    /// Seed an admin and register a matching token with the identity stub.
    pub async fn seed_admin_with_token(&self, token: &str) -> UserModel {
        let admin = self
            .seed_user("idp_admin", "admin@example.com", UserRole::Admin)
            .await;
        self.register_identity(
            token,
            "idp_admin",
            "admin@example.com",
            "Seeded",
            "User",
        )
        .await;
        admin
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {tok}"));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("failed to build request"))
            .await
            .expect("request failed")
    }

    /// Send a multipart request with the given boundary-framed body.
    pub async fn request_multipart(
        &self,
        method: Method,
        uri: &str,
        boundary: &str,
        body: Vec<u8>,
        token: &str,
    ) -> axum::response::Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .expect("failed to build multipart request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    /// Execute a request and decode the JSON response body.
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is not valid JSON")
        };
        (status, value)
    }
}

/// Build a multipart/form-data body from text fields and files.
pub fn multipart_body(
    boundary: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &str, &[u8])],
) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for (name, filename, content_type, data) in files {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
