mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::TestApp;
use vendora_api::clients::StoredMedia;
use vendora_api::entities::OverlayText;
use vendora_api::services::hero_videos::CreateHeroVideoInput;

async fn seed_video(app: &TestApp, created_by: Uuid, title: &str, is_active: bool) -> Uuid {
    let video = app
        .state
        .services
        .hero_videos
        .create_video(CreateHeroVideoInput {
            title: title.to_string(),
            description: format!("{title} description"),
            overlay: OverlayText::default(),
            stored: StoredMedia {
                url: format!("https://cdn.test/vendora/hero-videos/{title}.mp4"),
                public_id: format!("vendora/hero-videos/{title}"),
            },
            is_active,
            created_by,
        })
        .await
        .expect("seed hero video");
    video.id
}

fn active_flags(body: &serde_json::Value) -> Vec<(String, bool)> {
    body["videos"]
        .as_array()
        .expect("videos array")
        .iter()
        .map(|v| {
            (
                v["title"].as_str().unwrap().to_string(),
                v["is_active"].as_bool().unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn active_read_is_empty_not_an_error_when_nothing_is_active() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request_json(Method::GET, "/api/hero-videos/active", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[tokio::test]
async fn activating_a_second_video_deactivates_the_first() {
    let app = TestApp::new().await;
    let admin = app.seed_admin_with_token("tok_admin").await;

    let first = seed_video(&app, admin.id, "first", false).await;
    let second = seed_video(&app, admin.id, "second", false).await;

    let (status, _) = app
        .request_json(
            Method::PATCH,
            &format!("/api/hero-videos/{first}/toggle"),
            Some(json!({ "isActive": true })),
            Some("tok_admin"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .request_json(Method::GET, "/api/hero-videos/active", None, None)
        .await;
    assert_eq!(body["title"], "first");

    // Activating the second sweeps the first back to inactive
    let (status, _) = app
        .request_json(
            Method::PATCH,
            &format!("/api/hero-videos/{second}/toggle"),
            Some(json!({ "isActive": true })),
            Some("tok_admin"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .request_json(Method::GET, "/api/hero-videos/active", None, None)
        .await;
    assert_eq!(body["title"], "second");

    let (_, listing) = app
        .request_json(Method::GET, "/api/hero-videos", None, Some("tok_admin"))
        .await;
    let flags = active_flags(&listing);
    assert!(flags.contains(&("first".to_string(), false)));
    assert!(flags.contains(&("second".to_string(), true)));
    assert_eq!(flags.iter().filter(|(_, active)| *active).count(), 1);
}

#[tokio::test]
async fn creating_with_active_true_also_sweeps() {
    let app = TestApp::new().await;
    let admin = app.seed_admin_with_token("tok_admin").await;

    seed_video(&app, admin.id, "first", true).await;
    seed_video(&app, admin.id, "second", true).await;

    let (_, body) = app
        .request_json(Method::GET, "/api/hero-videos/active", None, None)
        .await;
    assert_eq!(body["title"], "second");

    let (_, listing) = app
        .request_json(Method::GET, "/api/hero-videos", None, Some("tok_admin"))
        .await;
    assert_eq!(
        active_flags(&listing)
            .iter()
            .filter(|(_, active)| *active)
            .count(),
        1
    );
}

#[tokio::test]
async fn deactivation_does_not_auto_activate_a_replacement() {
    let app = TestApp::new().await;
    let admin = app.seed_admin_with_token("tok_admin").await;

    seed_video(&app, admin.id, "first", false).await;
    let second = seed_video(&app, admin.id, "second", true).await;

    let (status, _) = app
        .request_json(
            Method::PATCH,
            &format!("/api/hero-videos/{second}/toggle"),
            Some(json!({ "isActive": false })),
            Some("tok_admin"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .request_json(Method::GET, "/api/hero-videos/active", None, None)
        .await;
    assert!(body.is_null());
}

#[tokio::test]
async fn deleting_the_active_video_returns_to_the_empty_state() {
    let app = TestApp::new().await;
    app.stub_media_storage().await;
    let admin = app.seed_admin_with_token("tok_admin").await;

    let active = seed_video(&app, admin.id, "active", true).await;
    seed_video(&app, admin.id, "bystander", false).await;

    let (status, body) = app
        .request_json(
            Method::DELETE,
            &format!("/api/hero-videos/{active}"),
            None,
            Some("tok_admin"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hero video deleted successfully");

    let (_, body) = app
        .request_json(Method::GET, "/api/hero-videos/active", None, None)
        .await;
    assert!(body.is_null());

    let (_, listing) = app
        .request_json(Method::GET, "/api/hero-videos", None, Some("tok_admin"))
        .await;
    assert_eq!(active_flags(&listing), vec![("bystander".to_string(), false)]);
}

#[tokio::test]
async fn toggling_an_unknown_video_is_a_404() {
    let app = TestApp::new().await;
    app.seed_admin_with_token("tok_admin").await;

    let (status, body) = app
        .request_json(
            Method::PATCH,
            &format!("/api/hero-videos/{}/toggle", Uuid::new_v4()),
            Some(json!({ "isActive": true })),
            Some("tok_admin"),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Hero video not found");
}

#[tokio::test]
async fn video_listing_requires_an_admin() {
    let app = TestApp::new().await;
    app.register_identity("tok_user", "idp_user", "user@example.com", "Plain", "User")
        .await;

    let (status, body) = app
        .request_json(Method::GET, "/api/hero-videos", None, Some("tok_user"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    let (status, _) = app
        .request_json(Method::GET, "/api/hero-videos", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
