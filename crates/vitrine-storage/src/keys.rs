//! Shared key handling for storage backends.

use crate::traits::{StorageError, StorageResult};
use crate::ArtifactName;

/// Object key prefix used by remote object stores.
pub const OBJECT_KEY_PREFIX: &str = "products";

/// Storage key for an artifact, optionally under a prefix.
///
/// Artifact names are validated at construction, but the key is checked
/// again here since it ends up as a filesystem path or object key.
pub fn storage_key(prefix: Option<&str>, name: &ArtifactName) -> StorageResult<String> {
    let key = match prefix {
        Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), name.as_str()),
        None => name.as_str().to_string(),
    };
    validate_key(&key)?;
    Ok(key)
}

/// Reject keys that could escape the storage root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key.contains("..")
        || key.starts_with('/')
        || key.contains('\\')
        || key.contains('\0')
    {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Join a base URL and a key without doubling slashes.
pub fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
