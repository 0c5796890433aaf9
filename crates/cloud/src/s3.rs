//! S3-backed blob store provider.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

use crate::{fresh_key, object_url, BlobObject, BlobStore, BlobStoreError};

/// Blob store backed by an S3 (or S3-compatible) bucket.
///
/// Objects are uploaded under `folder/<uuid>` keys; retrieval URLs are built
/// from a configured public base (a CDN or the bucket's website endpoint),
/// so the bucket itself never needs public listing.
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url_base: String,
}

impl S3BlobStore {
    pub fn new(
        client: aws_sdk_s3::Client,
        bucket: impl Into<String>,
        public_url_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_url_base: public_url_base.into(),
        }
    }

    /// Build a client from the ambient AWS environment (credentials chain,
    /// region) and wrap it.
    pub async fn from_env(
        bucket: impl Into<String>,
        public_url_base: impl Into<String>,
    ) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket, public_url_base)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(&self, bytes: &[u8], folder: &str) -> Result<BlobObject, BlobStoreError> {
        let key = fresh_key(folder);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|e| BlobStoreError::Upload(e.to_string()))?;

        tracing::debug!(key = %key, bucket = %self.bucket, size = bytes.len(), "Uploaded object to S3");

        let url = object_url(&self.public_url_base, &key);
        Ok(BlobObject { key, url })
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        // S3 DeleteObject succeeds for keys that do not exist, which gives us
        // the idempotence the sweeper relies on for free.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| BlobStoreError::Delete(e.to_string()))?;

        tracing::debug!(key = %key, bucket = %self.bucket, "Deleted object from S3");
        Ok(())
    }
}
