//! Blob store clients.
//!
//! [`BlobStore`] is the single seam the rest of the system talks through:
//! upload bytes into a folder, get back a stable object key plus an
//! immediately usable retrieval URL; delete by key, idempotently. Providers:
//!
//! - [`S3BlobStore`]   -- production, backed by `aws-sdk-s3`
//! - [`LocalBlobStore`] -- development, files under a base directory
//! - [`MemoryBlobStore`] -- tests

use async_trait::async_trait;

pub mod local;
pub mod memory;
pub mod s3;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

/// A stored object: its key (used for deletion) and retrieval URL.
#[derive(Debug, Clone)]
pub struct BlobObject {
    pub key: String,
    pub url: String,
}

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Delete failed: {0}")]
    Delete(String),
}

/// Remote object storage for binary artifacts.
///
/// Implementations must be stateless and thread-safe: one instance is shared
/// between request handlers and the reclamation sweeper. `delete` must treat
/// a missing key as success so that retries and concurrent sweeps stay safe.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `bytes` under a fresh key inside `folder`.
    ///
    /// The returned URL must be usable by the caller as soon as this
    /// resolves.
    async fn upload(&self, bytes: &[u8], folder: &str) -> Result<BlobObject, BlobStoreError>;

    /// Delete the object with the given key. Deleting a nonexistent object
    /// is not an error.
    async fn delete(&self, key: &str) -> Result<(), BlobStoreError>;
}

/// Generate a fresh object key inside `folder`.
pub(crate) fn fresh_key(folder: &str) -> String {
    format!("{}/{}", folder.trim_matches('/'), uuid::Uuid::new_v4())
}

/// Join a base URL and an object key without doubling slashes.
pub(crate) fn object_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_keys_are_unique_and_folder_scoped() {
        let a = fresh_key("renders");
        let b = fresh_key("renders/");
        assert!(a.starts_with("renders/"));
        assert!(b.starts_with("renders/"));
        assert_ne!(a, b);
    }

    #[test]
    fn object_url_joins_cleanly() {
        assert_eq!(
            object_url("https://cdn.test/", "renders/x"),
            "https://cdn.test/renders/x"
        );
        assert_eq!(
            object_url("https://cdn.test", "renders/x"),
            "https://cdn.test/renders/x"
        );
    }
}
