//! Configuration validation
//!
//! Runs at startup, before anything is connected.

use anyhow::Result;
use vitrine_core::{Config, StorageBackend};

/// Validate configuration and warn about setups that work but lose data.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() {
        if config.database_url().is_none() {
            tracing::warn!("Production mode without DATABASE_URL - products will not survive a restart");
        }
        if config.storage_backend() == StorageBackend::Memory {
            tracing::warn!("Production mode with memory storage - images will not survive a restart");
        }
    }

    let ingest = config.ingest();
    tracing::debug!(
        max_upload_files = ingest.max_upload_files,
        max_upload_size_bytes = ingest.max_upload_size_bytes,
        max_width = ingest.max_width,
        max_height = ingest.max_height,
        jpeg_quality = ingest.jpeg_quality,
        concurrency = ingest.concurrency,
        "Ingestion limits"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        Config::from_lookup(|key| map.get(key).map(|v| v.to_string())).unwrap()
    }

    #[test]
    fn test_validate_config_defaults() {
        assert!(validate_config(&config_from(&[])).is_ok());
    }

    #[test]
    fn test_validate_config_rejects_invalid() {
        let config = config_from(&[("MAX_UPLOAD_FILES", "0")]);
        assert!(validate_config(&config).is_err());
    }
}
