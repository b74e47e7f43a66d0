use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::UPLOADS_PREFIX;
use super::error::StorageError;
use super::filename::{image_extension, validate_flat_filename};
use super::traits::ImageStore;

/// Filesystem-backed image store.
///
/// Images live flat in `{web_root}/uploads/{uuid}{ext}` and are addressed by
/// the URL `/uploads/{uuid}{ext}`.
pub struct FilesystemImageStore {
    web_root: PathBuf,
    max_size: u64,
}

impl FilesystemImageStore {
    /// Create a new filesystem image store rooted at `web_root`.
    pub async fn new(web_root: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(web_root.join(UPLOADS_PREFIX)).await?;
        Ok(Self { web_root, max_size })
    }

    fn uploads_dir(&self) -> PathBuf {
        self.web_root.join(UPLOADS_PREFIX)
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.uploads_dir()
            .join(format!(".tmp-{}", uuid::Uuid::new_v4()))
    }
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn save(&self, data: &[u8], original_filename: &str) -> Result<String, StorageError> {
        if data.is_empty() {
            return Err(StorageError::Empty);
        }
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let file_name = format!(
            "{}{}",
            uuid::Uuid::new_v4(),
            image_extension(original_filename)
        );

        // The directory may have been removed since startup.
        fs::create_dir_all(self.uploads_dir()).await?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        let target = self.uploads_dir().join(&file_name);
        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(format!("/{UPLOADS_PREFIX}/{file_name}"))
    }

    async fn delete(&self, url: &str) -> Result<bool, StorageError> {
        if url.trim().is_empty() {
            return Ok(false);
        }

        let path = self.resolve(url)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, url: &str) -> Result<bool, StorageError> {
        let path = self.resolve(url)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, StorageError> {
        let file_name = url
            .trim()
            .strip_prefix('/')
            .and_then(|rest| rest.strip_prefix(UPLOADS_PREFIX))
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::InvalidUrl(url.to_string()))?;

        let file_name = validate_flat_filename(file_name)
            .map_err(|_| StorageError::InvalidUrl(url.to_string()))?;

        Ok(self.uploads_dir().join(file_name))
    }
}
