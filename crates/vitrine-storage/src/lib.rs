//! Vitrine Storage Library
//!
//! Artifact store abstraction and its backends. An artifact store is a flat
//! key/value store: the key is an [`ArtifactName`], the value is the canonical
//! JPEG bytes. Backends never see client-supplied filenames.
//!
//! # Key format
//!
//! Local and in-memory backends use the artifact name as the key. The S3
//! backend prefixes it with `products/`. Key handling lives in the `keys`
//! module so every backend applies the same checks.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ArtifactStore, StorageError, StorageResult};
pub use vitrine_core::{ArtifactName, StorageBackend};
