use std::path::PathBuf;

use async_trait::async_trait;

use super::error::StorageError;

/// Storage for uploaded product images, addressed by relative URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store bytes under a freshly generated name that keeps the extension of
    /// `original_filename`, returning the relative URL (e.g. `/uploads/<uuid>.png`).
    async fn save(&self, data: &[u8], original_filename: &str) -> Result<String, StorageError>;

    /// Remove the file behind `url`.
    ///
    /// Returns `true` if a file was deleted, `false` if the URL was empty or
    /// nothing was stored there.
    async fn delete(&self, url: &str) -> Result<bool, StorageError>;

    /// Check whether `url` refers to a stored file.
    async fn exists(&self, url: &str) -> Result<bool, StorageError>;

    /// Map a relative URL onto the filesystem path backing it.
    fn resolve(&self, url: &str) -> Result<PathBuf, StorageError>;
}
