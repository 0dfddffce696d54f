//! Artifact store trait
//!
//! Every backend (local disk, in-memory, S3) implements [`ArtifactStore`].
//! The ingestion pipeline and the read path depend only on this trait.

use crate::{ArtifactName, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable name → bytes store for canonical images.
///
/// Writes are keyed by freshly generated names, so concurrent requests never
/// write the same key unless two names collide. Callers that want to avoid
/// overwriting check [`ArtifactStore::exists`] first.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist `data` under `name`. Returns once the bytes are durable.
    async fn put(&self, name: &ArtifactName, data: Bytes) -> StorageResult<()>;

    /// Read back an artifact. Missing artifacts yield `StorageError::NotFound`.
    async fn get(&self, name: &ArtifactName) -> StorageResult<Bytes>;

    /// Check whether an artifact exists
    async fn exists(&self, name: &ArtifactName) -> StorageResult<bool>;

    /// URL-like path clients use to fetch the artifact
    fn public_path(&self, name: &ArtifactName) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
