//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use vitrine_core::Config;
use vitrine_storage::{create_storage, ArtifactStore};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn ArtifactStore>> {
    tracing::info!("Initializing artifact store...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize artifact store")?;
    tracing::info!(
        backend = ?storage.backend_type(),
        public_base_url = config.public_base_url(),
        "Artifact store initialized successfully"
    );
    Ok(storage)
}
