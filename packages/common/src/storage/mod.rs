mod error;
mod traits;

pub mod filename;
pub mod filesystem;

pub use error::StorageError;
pub use traits::ImageStore;

/// URL prefix (and directory name under the web root) for stored images.
pub const UPLOADS_PREFIX: &str = "uploads";
