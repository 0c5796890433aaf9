//! Filesystem blob store provider for local development.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::{fresh_key, object_url, BlobObject, BlobStore, BlobStoreError};

/// Blob store that writes objects under a base directory.
///
/// Retrieval URLs are built from a configured base, typically the server's
/// own static-file mount pointing at the same directory.
pub struct LocalBlobStore {
    base_dir: PathBuf,
    url_base: String,
}

impl LocalBlobStore {
    pub fn new(base_dir: impl Into<PathBuf>, url_base: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            url_base: url_base.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, bytes: &[u8], folder: &str) -> Result<BlobObject, BlobStoreError> {
        let key = fresh_key(folder);
        let path = self.path_for(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobStoreError::Upload(e.to_string()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| BlobStoreError::Upload(e.to_string()))?;

        tracing::debug!(key = %key, path = %path.display(), "Wrote object to local store");

        let url = object_url(&self.url_base, &key);
        Ok(BlobObject { key, url })
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            // Already gone: idempotent success.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobStoreError::Delete(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:3000/blobs");

        let object = store.upload(b"audio-bytes", "renders").await.unwrap();
        assert!(object.url.starts_with("http://localhost:3000/blobs/renders/"));

        let on_disk = tokio::fs::read(dir.path().join(&object.key)).await.unwrap();
        assert_eq!(on_disk, b"audio-bytes");

        store.delete(&object.key).await.unwrap();
        assert!(!dir.path().join(&object.key).exists());
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:3000/blobs");

        store.delete("renders/not-there").await.unwrap();
    }
}
