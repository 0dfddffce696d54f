use crate::keys::{join_url, storage_key};
use crate::traits::{ArtifactStore, StorageError, StorageResult};
use crate::{ArtifactName, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem artifact store
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Directory holding the artifacts (e.g., "uploads")
    /// * `base_url` - Public prefix the artifacts are served under (e.g., "/uploads")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    fn name_to_path(&self, name: &ArtifactName) -> StorageResult<PathBuf> {
        let key = storage_key(None, name)?;
        let path = self.base_path.join(&key);

        if path.parent() != Some(self.base_path.as_path()) {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }
}

#[async_trait]
impl ArtifactStore for LocalStorage {
    async fn put(&self, name: &ArtifactName, data: Bytes) -> StorageResult<()> {
        let path = self.name_to_path(name)?;
        let size = data.len();
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            artifact = %name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(())
    }

    async fn get(&self, name: &ArtifactName) -> StorageResult<Bytes> {
        let path = self.name_to_path(name)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            artifact = %name,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage read successful"
        );

        Ok(Bytes::from(data))
    }

    async fn exists(&self, name: &ArtifactName) -> StorageResult<bool> {
        let path = self.name_to_path(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn public_path(&self, name: &ArtifactName) -> String {
        join_url(&self.base_url, name.as_str())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_local_storage_put_get() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/uploads".to_string())
            .await
            .unwrap();

        let name = ArtifactName::from_parts(1_700_000_000_000, 7);
        let data = Bytes::from_static(b"\xFF\xD8\xFFjpeg-ish");

        assert!(!storage.exists(&name).await.unwrap());
        storage.put(&name, data.clone()).await.unwrap();
        assert!(storage.exists(&name).await.unwrap());

        let read = storage.get(&name).await.unwrap();
        assert_eq!(read, data);
        assert!(dir.path().join(name.as_str()).is_file());
    }

    #[tokio::test]
    async fn test_local_storage_missing_artifact() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/uploads".to_string())
            .await
            .unwrap();

        let name = ArtifactName::from_parts(1, 1);
        let result = storage.get(&name).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_local_storage_creates_base_dir_and_public_path() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = LocalStorage::new(&nested, "/uploads/".to_string())
            .await
            .unwrap();

        assert!(nested.is_dir());
        let name = ArtifactName::from_parts(5, 6);
        assert_eq!(storage.public_path(&name), "/uploads/image-5-6.jpg");
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn test_local_storage_put_overwrites_same_name() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/uploads".to_string())
            .await
            .unwrap();

        let name = ArtifactName::from_parts(2, 2);
        storage.put(&name, Bytes::from_static(b"first")).await.unwrap();
        storage.put(&name, Bytes::from_static(b"second")).await.unwrap();
        assert_eq!(storage.get(&name).await.unwrap(), Bytes::from_static(b"second"));
    }
}
