pub mod common;
pub mod health;
pub mod hero_videos;
pub mod products;
pub mod uploads;
pub mod users;

use std::sync::Arc;

use crate::clients::{IdentityProviderClient, MediaStorageClient};
use crate::db::DbPool;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<crate::services::ProductCatalogService>,
    pub users: Arc<crate::services::UserDirectoryService>,
    pub hero_videos: Arc<crate::services::HeroVideoService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        identity: Arc<IdentityProviderClient>,
        media: Arc<MediaStorageClient>,
    ) -> Self {
        let catalog = Arc::new(crate::services::ProductCatalogService::new(
            db_pool.clone(),
            media.clone(),
        ));
        let users = Arc::new(crate::services::UserDirectoryService::new(
            db_pool.clone(),
            identity,
        ));
        let hero_videos = Arc::new(crate::services::HeroVideoService::new(db_pool, media));

        Self {
            catalog,
            users,
            hero_videos,
        }
    }
}
