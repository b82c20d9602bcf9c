//! Typed HTTP clients for the external collaborators: the identity provider
//! that owns authentication, and the media CDN that owns file storage.

pub mod identity;
pub mod media;

pub use identity::{IdentityAccount, IdentityProviderClient};
pub use media::{MediaKind, MediaStorageClient, StoredMedia};
