//! Port for uploaded image storage.

use async_trait::async_trait;

use crate::domain::ImageUpload;

use super::define_port_error;

define_port_error! {
    /// Errors raised by media storage adapters.
    pub enum MediaStorageError {
        /// Reading or writing the store failed.
        Io { message: String } => "media storage failed: {message}",
    }
}

/// Storage for decoded images.
///
/// Paths are relative to the media root, e.g. `recipes/<name>.png`; public
/// URLs are derived from them by [`crate::domain::PublicUrls`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Write `image` under `folder` with a fresh name and return its path.
    async fn save(&self, folder: &str, image: &ImageUpload) -> Result<String, MediaStorageError>;

    /// Remove a stored file. Missing files are not an error.
    async fn delete(&self, path: &str) -> Result<(), MediaStorageError>;
}
