use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::storage::{Blob, BlobStore};

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Blob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError> {
        self.blobs.write().await.insert(
            key.to_string(),
            Blob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Blob>, AppError> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.blobs.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::discard_blobs;

    #[tokio::test]
    async fn discarded_blobs_are_gone() {
        let store = MemoryBlobStore::new();
        store
            .put("resumes/a.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await
            .unwrap();
        store
            .put("resumes/b.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await
            .unwrap();

        discard_blobs(&store, ["resumes/a.pdf".to_string(), "missing".to_string()]).await;

        assert!(store.get("resumes/a.pdf").await.unwrap().is_none());
        let kept = store.get("resumes/b.pdf").await.unwrap().unwrap();
        assert_eq!(kept.content_type, "application/pdf");
    }
}
