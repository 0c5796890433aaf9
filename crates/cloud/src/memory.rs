//! In-memory blob store for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{fresh_key, object_url, BlobObject, BlobStore, BlobStoreError};

/// Blob store holding objects in a process-local map.
///
/// Used by integration tests to assert on exactly which objects exist after
/// a pipeline operation (orphan checks, reclamation checks).
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().expect("blob map poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an object with the given key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .lock()
            .expect("blob map poisoned")
            .contains_key(key)
    }

    /// Fetch a stored object's bytes.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("blob map poisoned")
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, bytes: &[u8], folder: &str) -> Result<BlobObject, BlobStoreError> {
        let key = fresh_key(folder);
        self.objects
            .lock()
            .expect("blob map poisoned")
            .insert(key.clone(), bytes.to_vec());

        let url = object_url("memory://blobs", &key);
        Ok(BlobObject { key, url })
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        // Removing a missing key is a no-op, matching the remote providers.
        self.objects.lock().expect("blob map poisoned").remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_deletes() {
        let store = MemoryBlobStore::new();
        let object = store.upload(b"xyz", "renders").await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&object.key).unwrap(), b"xyz");

        store.delete(&object.key).await.unwrap();
        store.delete(&object.key).await.unwrap();
        assert!(store.is_empty());
    }
}
