mod common;

use axum::body::to_bytes;
use axum::http::{Method, StatusCode};
use serde_json::Value;

use common::{multipart_body, TestApp};

const BOUNDARY: &str = "vendora-test-boundary";

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn product_fields<'a>() -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", "Widget"),
        ("description", "A dependable widget"),
        ("price", "9.99"),
        ("category", "Electronics"),
        ("stock", "3"),
        ("tags", "gadget, sale"),
        ("featured", "true"),
    ]
}

#[tokio::test]
async fn create_product_uploads_images_and_returns_201() {
    let app = TestApp::new().await;
    app.stub_media_storage().await;
    app.seed_admin_with_token("tok_admin").await;

    let body = multipart_body(
        BOUNDARY,
        &product_fields(),
        &[
            ("images", "front.jpg", "image/jpeg", b"\xFF\xD8\xFF jpeg data"),
            ("images", "back.png", "image/png", b"\x89PNG png data"),
        ],
    );

    let response = app
        .request_multipart(Method::POST, "/api/products", BOUNDARY, body, "tok_admin")
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let product = json_body(response).await;
    assert_eq!(product["name"], "Widget");
    assert_eq!(product["category"], "Electronics");
    assert_eq!(product["tags"], serde_json::json!(["gadget", "sale"]));
    assert_eq!(product["featured"], true);
    assert_eq!(product["images"].as_array().unwrap().len(), 2);
    assert_eq!(product["images"][0]["alt"], "Widget");
    assert_eq!(product["created_by"]["first_name"], "Seeded");
}

#[tokio::test]
async fn non_image_files_are_rejected() {
    let app = TestApp::new().await;
    app.seed_admin_with_token("tok_admin").await;

    let body = multipart_body(
        BOUNDARY,
        &product_fields(),
        &[("images", "malware.pdf", "application/pdf", b"%PDF-1.4")],
    );

    let response = app
        .request_multipart(Method::POST, "/api/products", BOUNDARY, body, "tok_admin")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json_body(response).await;
    assert_eq!(error["error"], "Only image files are allowed");
}

#[tokio::test]
async fn oversized_images_are_rejected() {
    let app = TestApp::new().await;
    app.seed_admin_with_token("tok_admin").await;

    let oversized = vec![0u8; 5 * 1024 * 1024 + 1];
    let body = multipart_body(
        BOUNDARY,
        &product_fields(),
        &[("images", "huge.png", "image/png", &oversized)],
    );

    let response = app
        .request_multipart(Method::POST, "/api/products", BOUNDARY, body, "tok_admin")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json_body(response).await;
    assert_eq!(error["error"], "File too large. Maximum size is 5MB");
}

#[tokio::test]
async fn at_most_five_images_are_accepted() {
    let app = TestApp::new().await;
    app.stub_media_storage().await;
    app.seed_admin_with_token("tok_admin").await;

    let files: Vec<(&str, &str, &str, &[u8])> = (0..6)
        .map(|_| ("images", "img.png", "image/png", b"\x89PNG".as_slice()))
        .collect();
    let body = multipart_body(BOUNDARY, &product_fields(), &files);

    let response = app
        .request_multipart(Method::POST, "/api/products", BOUNDARY, body, "tok_admin")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_required_fields_are_a_400() {
    let app = TestApp::new().await;
    app.seed_admin_with_token("tok_admin").await;

    let body = multipart_body(BOUNDARY, &[("description", "no name")], &[]);
    let response = app
        .request_multipart(Method::POST, "/api/products", BOUNDARY, body, "tok_admin")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json_body(response).await;
    assert_eq!(error["error"], "name is required");
}

#[tokio::test]
async fn product_mutations_require_an_admin() {
    let app = TestApp::new().await;
    app.register_identity("tok_user", "idp_user", "user@example.com", "Plain", "User")
        .await;

    let body = multipart_body(BOUNDARY, &product_fields(), &[]);
    let response = app
        .request_multipart(Method::POST, "/api/products", BOUNDARY, body, "tok_user")
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_a_product_removes_the_record() {
    let app = TestApp::new().await;
    app.stub_media_storage().await;
    app.seed_admin_with_token("tok_admin").await;

    let body = multipart_body(
        BOUNDARY,
        &product_fields(),
        &[("images", "front.jpg", "image/jpeg", b"\xFF\xD8\xFF")],
    );
    let response = app
        .request_multipart(Method::POST, "/api/products", BOUNDARY, body, "tok_admin")
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let product = json_body(response).await;
    let id = product["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request_json(
            Method::DELETE,
            &format!("/api/products/{id}"),
            None,
            Some("tok_admin"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");

    let (status, _) = app
        .request_json(Method::GET, &format!("/api/products/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hero_video_creation_requires_a_video_file() {
    let app = TestApp::new().await;
    app.seed_admin_with_token("tok_admin").await;

    let body = multipart_body(
        BOUNDARY,
        &[("title", "Launch"), ("description", "Launch teaser")],
        &[],
    );
    let response = app
        .request_multipart(Method::POST, "/api/hero-videos", BOUNDARY, body, "tok_admin")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json_body(response).await;
    assert_eq!(error["error"], "Video file is required");
}

#[tokio::test]
async fn hero_video_creation_applies_overlay_defaults() {
    let app = TestApp::new().await;
    app.stub_media_storage().await;
    app.seed_admin_with_token("tok_admin").await;

    let body = multipart_body(
        BOUNDARY,
        &[
            ("title", "Launch"),
            ("description", "Launch teaser"),
            ("overlayText", r#"{ "title": "Summer Sale" }"#),
        ],
        &[("video", "launch.mp4", "video/mp4", b"mp4 data")],
    );
    let response = app
        .request_multipart(Method::POST, "/api/hero-videos", BOUNDARY, body, "tok_admin")
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let video = json_body(response).await;
    assert_eq!(video["title"], "Launch");
    assert_eq!(video["is_active"], false);
    assert_eq!(video["overlay"]["title"], "Summer Sale");
    assert_eq!(video["overlay"]["subtitle"], "Discover the best products");
    assert_eq!(video["overlay"]["button_text"], "Shop Now");
}

#[tokio::test]
async fn hero_video_rejects_non_video_files() {
    let app = TestApp::new().await;
    app.seed_admin_with_token("tok_admin").await;

    let body = multipart_body(
        BOUNDARY,
        &[("title", "Launch"), ("description", "Launch teaser")],
        &[("video", "cover.png", "image/png", b"\x89PNG")],
    );
    let response = app
        .request_multipart(Method::POST, "/api/hero-videos", BOUNDARY, body, "tok_admin")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json_body(response).await;
    assert_eq!(error["error"], "Only video files are allowed");
}
