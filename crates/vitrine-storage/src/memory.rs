//! In-memory artifact store, used when `STORAGE_BACKEND=memory` and in tests.

use crate::keys::{join_url, storage_key};
use crate::traits::{ArtifactStore, StorageError, StorageResult};
use crate::{ArtifactName, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Artifact store that keeps every artifact in a shared map
#[derive(Clone)]
pub struct MemoryStorage {
    files: Arc<RwLock<HashMap<String, Bytes>>>,
    base_url: String,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into(),
        }
    }

    /// Number of stored artifacts
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }

    /// Names of every stored artifact, sorted
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("/uploads")
    }
}

#[async_trait]
impl ArtifactStore for MemoryStorage {
    async fn put(&self, name: &ArtifactName, data: Bytes) -> StorageResult<()> {
        let key = storage_key(None, name)?;
        let size = data.len();
        self.files.write().await.insert(key, data);

        tracing::debug!(artifact = %name, size_bytes = size, "Memory storage write successful");
        Ok(())
    }

    async fn get(&self, name: &ArtifactName) -> StorageResult<Bytes> {
        let key = storage_key(None, name)?;
        self.files
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key))
    }

    async fn exists(&self, name: &ArtifactName) -> StorageResult<bool> {
        let key = storage_key(None, name)?;
        Ok(self.files.read().await.contains_key(&key))
    }

    fn public_path(&self, name: &ArtifactName) -> String {
        join_url(&self.base_url, name.as_str())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
