use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::clients::{MediaKind, MediaStorageClient, StoredMedia};
use crate::entities::{hero_video, HeroVideo, HeroVideoModel, OverlayText};
use crate::errors::ServiceError;
use crate::services::catalog::total_pages;

/// One page of the administrative video listing.
#[derive(Debug)]
pub struct VideoPage {
    pub videos: Vec<HeroVideoModel>,
    pub current: u64,
    pub pages: u64,
    pub total: u64,
}

/// Input for creating a hero video.
#[derive(Debug, Clone)]
pub struct CreateHeroVideoInput {
    pub title: String,
    pub description: String,
    pub overlay: OverlayText,
    pub stored: StoredMedia,
    pub is_active: bool,
    pub created_by: Uuid,
}

/// Input for updating a hero video; `replacement` carries a newly
/// uploaded file when one was provided.
#[derive(Debug, Clone)]
pub struct UpdateHeroVideoInput {
    pub title: String,
    pub description: String,
    pub overlay: Option<OverlayText>,
    pub is_active: bool,
    pub replacement: Option<StoredMedia>,
    pub updated_by: Uuid,
}

/// Hero video service. Owns the single-active-record invariant: any write
/// that activates a record first sweeps `is_active = false` across every
/// other record, then persists the target. The sweep and the write are two
/// statements, not a transaction; a failure in between leaves zero active
/// records, which reads back as "no active video".
#[derive(Clone)]
pub struct HeroVideoService {
    db: Arc<DatabaseConnection>,
    media: Arc<MediaStorageClient>,
}

impl HeroVideoService {
    pub fn new(db: Arc<DatabaseConnection>, media: Arc<MediaStorageClient>) -> Self {
        Self { db, media }
    }

    /// The single record currently flagged active, if any.
    #[instrument(skip(self))]
    pub async fn active_video(&self) -> Result<Option<HeroVideoModel>, ServiceError> {
        HeroVideo::find()
            .filter(hero_video::Column::IsActive.eq(true))
            .one(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Paginated administrative listing, newest first.
    #[instrument(skip(self))]
    pub async fn list_videos(&self, page: u64, limit: u64) -> Result<VideoPage, ServiceError> {
        let total = HeroVideo::find().count(&*self.db).await?;
        let pages = total_pages(total, limit);

        let videos = HeroVideo::find()
            .order_by_desc(hero_video::Column::CreatedAt)
            .limit(limit)
            .offset(page.saturating_sub(1) * limit)
            .all(&*self.db)
            .await?;

        Ok(VideoPage {
            videos,
            current: page,
            pages,
            total,
        })
    }

    /// Get a hero video by ID
    #[instrument(skip(self))]
    pub async fn get_video(&self, video_id: Uuid) -> Result<HeroVideoModel, ServiceError> {
        HeroVideo::find_by_id(video_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Hero video not found".to_string()))
    }

    /// Create a hero video from an already-uploaded file.
    #[instrument(skip(self, input))]
    pub async fn create_video(
        &self,
        input: CreateHeroVideoInput,
    ) -> Result<HeroVideoModel, ServiceError> {
        let video_id = Uuid::new_v4();
        let now = Utc::now();

        if input.is_active {
            self.deactivate_others(video_id).await?;
        }

        let model = hero_video::ActiveModel {
            id: Set(video_id),
            title: Set(input.title),
            description: Set(input.description),
            video_url: Set(input.stored.url),
            video_public_id: Set(input.stored.public_id),
            is_active: Set(input.is_active),
            overlay: Set(serde_json::to_value(&input.overlay)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?),
            created_by: Set(input.created_by),
            updated_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(&*self.db).await?;
        info!("Created hero video: {}", video_id);
        Ok(created)
    }

    /// Update a hero video. A replacement file destroys the previously
    /// stored one (best-effort) before the new URL is persisted.
    #[instrument(skip(self, input))]
    pub async fn update_video(
        &self,
        video_id: Uuid,
        input: UpdateHeroVideoInput,
    ) -> Result<HeroVideoModel, ServiceError> {
        let existing = self.get_video(video_id).await?;

        if input.replacement.is_some() {
            if let Err(err) = self
                .media
                .destroy(MediaKind::Video, &existing.video_public_id)
                .await
            {
                warn!(
                    public_id = %existing.video_public_id,
                    error = %err,
                    "failed to delete replaced hero video"
                );
            }
        }

        if input.is_active {
            self.deactivate_others(video_id).await?;
        }

        let mut active: hero_video::ActiveModel = existing.into();
        active.title = Set(input.title);
        active.description = Set(input.description);
        if let Some(overlay) = input.overlay {
            active.overlay = Set(serde_json::to_value(&overlay)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?);
        }
        if let Some(replacement) = input.replacement {
            active.video_url = Set(replacement.url);
            active.video_public_id = Set(replacement.public_id);
        }
        active.is_active = Set(input.is_active);
        active.updated_by = Set(Some(input.updated_by));
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        info!("Updated hero video: {}", video_id);
        Ok(updated)
    }

    /// Explicitly activate or deactivate one record. Activation sweeps the
    /// rest; deactivation touches only the target and never auto-activates
    /// a replacement.
    #[instrument(skip(self))]
    pub async fn toggle_video(
        &self,
        video_id: Uuid,
        is_active: bool,
        updated_by: Uuid,
    ) -> Result<HeroVideoModel, ServiceError> {
        let existing = self.get_video(video_id).await?;

        if is_active {
            self.deactivate_others(video_id).await?;
        }

        let mut active: hero_video::ActiveModel = existing.into();
        active.is_active = Set(is_active);
        active.updated_by = Set(Some(updated_by));
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        info!(video_id = %video_id, is_active, "Toggled hero video");
        Ok(updated)
    }

    /// Delete a hero video and its stored file (best-effort). Deleting the
    /// active record returns the system to the "no active video" state.
    #[instrument(skip(self))]
    pub async fn delete_video(&self, video_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_video(video_id).await?;

        if let Err(err) = self
            .media
            .destroy(MediaKind::Video, &existing.video_public_id)
            .await
        {
            warn!(
                public_id = %existing.video_public_id,
                error = %err,
                "failed to delete stored hero video"
            );
        }

        existing.delete(&*self.db).await?;
        info!("Deleted hero video: {}", video_id);
        Ok(())
    }

    /// The deactivation sweep behind the single-active invariant.
    async fn deactivate_others(&self, keep: Uuid) -> Result<(), ServiceError> {
        HeroVideo::update_many()
            .col_expr(hero_video::Column::IsActive, Expr::value(false))
            .filter(hero_video::Column::Id.ne(keep))
            .exec(&*self.db)
            .await?;
        Ok(())
    }
}
