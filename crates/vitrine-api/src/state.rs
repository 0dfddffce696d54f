//! Shared application state

use std::sync::Arc;

use sqlx::PgPool;
use vitrine_core::Config;
use vitrine_db::ProductRepository;
use vitrine_processing::{IngestPipeline, ValidationGate};
use vitrine_storage::ArtifactStore;

/// Application state handed to every handler
pub struct AppState {
    pub config: Config,
    pub products: Arc<dyn ProductRepository>,
    pub storage: Arc<dyn ArtifactStore>,
    pub gate: ValidationGate,
    pub ingest: IngestPipeline,
    /// Present only when products are persisted in Postgres
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Wire the pipeline around an already constructed repository and store.
    pub fn new(
        config: Config,
        products: Arc<dyn ProductRepository>,
        storage: Arc<dyn ArtifactStore>,
        db_pool: Option<PgPool>,
    ) -> Self {
        let settings = config.ingest();
        let gate = ValidationGate::new(settings.into());
        let ingest = IngestPipeline::new(storage.clone(), settings.into());

        Self {
            config,
            products,
            storage,
            gate,
            ingest,
            db_pool,
        }
    }
}
