use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Promotional hero video shown on the storefront landing page.
///
/// At most one row has `is_active = true` at any time; the sweep that
/// maintains this lives in the hero video service.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hero_videos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub video_url: String,
    /// Storage identifier used for later deletion at the media CDN
    pub video_public_id: String,
    pub is_active: bool,
    #[sea_orm(column_type = "Json")]
    pub overlay: Json,
    pub created_by: Uuid,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Overlay text with defaults applied for any missing field.
    pub fn overlay_text(&self) -> OverlayText {
        serde_json::from_value(self.overlay.clone()).unwrap_or_default()
    }
}

fn default_overlay_title() -> String {
    "Welcome to Vendora".to_string()
}

fn default_overlay_subtitle() -> String {
    "Discover the best products".to_string()
}

fn default_overlay_button_text() -> String {
    "Shop Now".to_string()
}

/// Text rendered over the playing video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OverlayText {
    #[serde(default = "default_overlay_title")]
    pub title: String,
    #[serde(default = "default_overlay_subtitle")]
    pub subtitle: String,
    #[serde(default = "default_overlay_button_text")]
    pub button_text: String,
}

impl Default for OverlayText {
    fn default() -> Self {
        Self {
            title: default_overlay_title(),
            subtitle: default_overlay_subtitle(),
            button_text: default_overlay_button_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_defaults_fill_missing_fields() {
        let overlay: OverlayText = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(overlay, OverlayText::default());

        let overlay: OverlayText =
            serde_json::from_value(serde_json::json!({ "title": "Summer Sale" })).unwrap();
        assert_eq!(overlay.title, "Summer Sale");
        assert_eq!(overlay.subtitle, "Discover the best products");
        assert_eq!(overlay.button_text, "Shop Now");
    }

    #[test]
    fn malformed_overlay_column_falls_back_to_defaults() {
        let model = Model {
            id: Uuid::new_v4(),
            title: "Launch".into(),
            description: "Launch teaser".into(),
            video_url: "https://cdn.example.com/v/launch.mp4".into(),
            video_public_id: "vendora/hero-videos/launch".into(),
            is_active: false,
            overlay: serde_json::json!("not an object"),
            created_by: Uuid::new_v4(),
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(model.overlay_text(), OverlayText::default());
    }
}
