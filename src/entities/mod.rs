pub mod hero_video;
pub mod product;
pub mod user;

// Re-export entities
pub use hero_video::{Entity as HeroVideo, Model as HeroVideoModel, OverlayText};
pub use product::{Category, Entity as Product, Model as ProductModel, ProductImage};
pub use user::{Entity as User, Model as UserModel, UserRole};
