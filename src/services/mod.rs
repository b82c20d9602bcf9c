pub mod catalog;
pub mod hero_videos;
pub mod users;

pub use catalog::ProductCatalogService;
pub use hero_videos::HeroVideoService;
pub use users::UserDirectoryService;
