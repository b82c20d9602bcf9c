use std::collections::HashMap;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{AuthRouterExt, CurrentUser};
use crate::clients::MediaKind;
use crate::entities::{HeroVideoModel, OverlayText};
use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, parse_limit, parse_page, success_response, MessageResponse, PaginationMeta,
};
use crate::handlers::uploads::{self, ParsedForm, VIDEO_BODY_LIMIT, VIDEO_POLICY};
use crate::services::catalog::ADMIN_PAGE_SIZE;
use crate::services::hero_videos::{CreateHeroVideoInput, UpdateHeroVideoInput};
use crate::services::users::UserBrief;
use crate::AppState;

/// Creates the router for hero video endpoints
pub fn hero_videos_routes(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/active", get(get_active_video));

    let admin = Router::new()
        .route("/", get(list_videos))
        .route("/", post(create_video))
        .route("/:id", put(update_video))
        .route("/:id/toggle", patch(toggle_video))
        .route("/:id", delete(delete_video))
        .layer(DefaultBodyLimit::max(VIDEO_BODY_LIMIT))
        .with_admin(state);

    public.merge(admin)
}

// Request/Response DTOs

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VideoListParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "isActive": true }))]
pub struct ToggleVideoRequest {
    #[serde(alias = "isActive")]
    pub is_active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "550e8400-e29b-41d4-a716-446655440000",
    "title": "Summer Launch",
    "description": "Launch teaser",
    "video_url": "https://cdn.example.com/vendora/hero-videos/launch.mp4",
    "video_public_id": "vendora/hero-videos/launch",
    "is_active": true,
    "overlay": { "title": "Welcome to Vendora", "subtitle": "Discover the best products", "button_text": "Shop Now" },
    "created_at": "2024-12-09T10:30:00Z",
    "updated_at": "2024-12-09T10:30:00Z"
}))]
pub struct HeroVideoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_public_id: String,
    pub is_active: bool,
    pub overlay: OverlayText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserBrief>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserBrief>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HeroVideoResponse {
    fn from_model(model: HeroVideoModel, briefs: &HashMap<Uuid, UserBrief>) -> Self {
        let created_by = briefs.get(&model.created_by).cloned();
        let updated_by = model.updated_by.and_then(|id| briefs.get(&id).cloned());

        Self {
            id: model.id,
            title: model.title.clone(),
            description: model.description.clone(),
            video_url: model.video_url.clone(),
            video_public_id: model.video_public_id.clone(),
            is_active: model.is_active,
            overlay: model.overlay_text(),
            created_by,
            updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoListResponse {
    pub videos: Vec<HeroVideoResponse>,
    pub pagination: PaginationMeta,
}

/// Parse the optional `overlayText` field, a JSON object embedded in the
/// multipart form; missing fields take their fixed defaults.
fn parse_overlay(form: &ParsedForm) -> Result<Option<OverlayText>, ServiceError> {
    match form.field("overlayText").map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|_| ServiceError::ValidationError("overlayText must be a JSON object".to_string())),
    }
}

fn is_active_field(form: &ParsedForm) -> bool {
    form.field("isActive").map(str::trim) == Some("true")
}

pub async fn briefs_for(
    state: &AppState,
    videos: &[HeroVideoModel],
) -> Result<HashMap<Uuid, UserBrief>, ServiceError> {
    let mut ids: Vec<Uuid> = Vec::new();
    for video in videos {
        ids.push(video.created_by);
        ids.extend(video.updated_by);
    }
    state.services.users.display_briefs(&ids).await
}

// Handler functions

/// Current active promotional video, or `null` when none is active
#[utoipa::path(
    get,
    path = "/api/hero-videos/active",
    responses(
        (status = 200, description = "Active video, or null when none is active", body = HeroVideoResponse)
    ),
    tag = "HeroVideos"
)]
pub async fn get_active_video(
    State(state): State<AppState>,
) -> Result<axum::response::Response, ServiceError> {
    match state.services.hero_videos.active_video().await? {
        Some(video) => {
            let briefs = briefs_for(&state, std::slice::from_ref(&video)).await?;
            Ok(success_response(HeroVideoResponse::from_model(video, &briefs)))
        }
        None => Ok(success_response(serde_json::Value::Null)),
    }
}

/// Paginated video listing
#[utoipa::path(
    get,
    path = "/api/hero-videos",
    params(VideoListParams),
    responses(
        (status = 200, description = "Video listing page", body = VideoListResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "HeroVideos"
)]
pub async fn list_videos(
    State(state): State<AppState>,
    Query(params): Query<VideoListParams>,
) -> Result<axum::response::Response, ServiceError> {
    let page = parse_page(params.page.as_deref());
    let limit = parse_limit(params.limit.as_deref(), ADMIN_PAGE_SIZE);

    let listing = state.services.hero_videos.list_videos(page, limit).await?;
    let briefs = briefs_for(&state, &listing.videos).await?;

    let videos = listing
        .videos
        .into_iter()
        .map(|video| HeroVideoResponse::from_model(video, &briefs))
        .collect();

    Ok(success_response(VideoListResponse {
        videos,
        pagination: PaginationMeta {
            current: listing.current,
            pages: listing.pages,
            total: listing.total,
        },
    }))
}

/// Create a hero video from a multipart form with exactly one video file
#[utoipa::path(
    post,
    path = "/api/hero-videos",
    responses(
        (status = 201, description = "Hero video created", body = HeroVideoResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "HeroVideos"
)]
pub async fn create_video(
    user: CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<axum::response::Response, ServiceError> {
    let form = uploads::read_form(&mut multipart, &VIDEO_POLICY).await?;

    let title = form.require_field("title")?.to_string();
    let description = form.require_field("description")?.to_string();
    let overlay = parse_overlay(&form)?.unwrap_or_default();
    let is_active = is_active_field(&form);

    let file = form
        .files
        .first()
        .ok_or_else(|| ServiceError::ValidationError("Video file is required".to_string()))?;

    let stored = state
        .media
        .upload(
            MediaKind::Video,
            &file.filename,
            &file.content_type,
            file.data.clone(),
        )
        .await?;

    let video = state
        .services
        .hero_videos
        .create_video(CreateHeroVideoInput {
            title,
            description,
            overlay,
            stored,
            is_active,
            created_by: user.id(),
        })
        .await?;

    let briefs = briefs_for(&state, std::slice::from_ref(&video)).await?;
    Ok(created_response(HeroVideoResponse::from_model(video, &briefs)))
}

/// Update a hero video; the file is replaced only when a new one is sent
#[utoipa::path(
    put,
    path = "/api/hero-videos/:id",
    params(("id" = Uuid, Path, description = "Hero video ID")),
    responses(
        (status = 200, description = "Hero video updated", body = HeroVideoResponse),
        (status = 404, description = "Hero video not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "HeroVideos"
)]
pub async fn update_video(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<axum::response::Response, ServiceError> {
    let form = uploads::read_form(&mut multipart, &VIDEO_POLICY).await?;

    let title = form.require_field("title")?.to_string();
    let description = form.require_field("description")?.to_string();
    let overlay = parse_overlay(&form)?;
    let is_active = is_active_field(&form);

    let replacement = match form.files.first() {
        Some(file) => Some(
            state
                .media
                .upload(
                    MediaKind::Video,
                    &file.filename,
                    &file.content_type,
                    file.data.clone(),
                )
                .await?,
        ),
        None => None,
    };

    let video = state
        .services
        .hero_videos
        .update_video(
            id,
            UpdateHeroVideoInput {
                title,
                description,
                overlay,
                is_active,
                replacement,
                updated_by: user.id(),
            },
        )
        .await?;

    let briefs = briefs_for(&state, std::slice::from_ref(&video)).await?;
    Ok(success_response(HeroVideoResponse::from_model(video, &briefs)))
}

/// Explicitly activate or deactivate a video
#[utoipa::path(
    patch,
    path = "/api/hero-videos/:id/toggle",
    params(("id" = Uuid, Path, description = "Hero video ID")),
    request_body = ToggleVideoRequest,
    responses(
        (status = 200, description = "Hero video toggled", body = HeroVideoResponse),
        (status = 404, description = "Hero video not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "HeroVideos"
)]
pub async fn toggle_video(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ToggleVideoRequest>,
) -> Result<axum::response::Response, ServiceError> {
    let video = state
        .services
        .hero_videos
        .toggle_video(id, payload.is_active, user.id())
        .await?;

    let briefs = briefs_for(&state, std::slice::from_ref(&video)).await?;
    Ok(success_response(HeroVideoResponse::from_model(video, &briefs)))
}

/// Delete a hero video and its stored file
#[utoipa::path(
    delete,
    path = "/api/hero-videos/:id",
    params(("id" = Uuid, Path, description = "Hero video ID")),
    responses(
        (status = 200, description = "Hero video deleted", body = MessageResponse),
        (status = 404, description = "Hero video not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "HeroVideos"
)]
pub async fn delete_video(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, ServiceError> {
    state.services.hero_videos.delete_video(id).await?;
    Ok(success_response(MessageResponse::new(
        "Hero video deleted successfully",
    )))
}
