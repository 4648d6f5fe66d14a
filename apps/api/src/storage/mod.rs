//! Resume file storage.

pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;

use tracing::warn;

use crate::errors::AppError;

pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Bytes,
    pub content_type: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError>;
    /// `None` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Blob>, AppError>;
    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

/// Deletes blobs that are no longer referenced. Failures are logged and
/// otherwise ignored: the rows pointing at them are already gone.
pub async fn discard_blobs<I>(blobs: &dyn BlobStore, keys: I)
where
    I: IntoIterator<Item = String>,
{
    for key in keys {
        if let Err(e) = blobs.delete(&key).await {
            warn!("Failed to delete orphaned blob {key}: {e}");
        }
    }
}
