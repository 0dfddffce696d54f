//! Ingestion pipeline orchestrator.
//!
//! For every upload in a validated batch: transform, name, store. Items run
//! concurrently up to `concurrency`, but results are collected by upload
//! index, so the surviving names come back in upload order whatever the
//! completion order was. A failed item is logged and dropped; it never aborts
//! its siblings.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use vitrine_core::{AppError, ArtifactName, IngestSettings};
use vitrine_storage::ArtifactStore;

use crate::naming::{IdentityAssigner, NameGenerator};
use crate::transform::{TransformConfig, TransformEngine};
use crate::validator::{RawUpload, ValidatedBatch};

/// Pipeline tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    pub concurrency: usize,
    pub name_retries: u32,
    pub transform: TransformConfig,
}

impl From<&IngestSettings> for IngestConfig {
    fn from(settings: &IngestSettings) -> Self {
        Self {
            concurrency: settings.concurrency.max(1),
            name_retries: settings.name_retries,
            transform: TransformConfig::from(settings),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::from(&IngestSettings::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Corrupt or undecodable upload
    Transform,
    /// Naming or writing to the artifact store failed
    Store,
}

#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub index: usize,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub index: usize,
    pub name: ArtifactName,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
}

/// Outcome of one batch. `stored` is in upload order.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub attempted: usize,
    pub stored: Vec<StoredArtifact>,
    pub failures: Vec<ItemFailure>,
}

impl IngestReport {
    /// Uploads were supplied but none made it to the store.
    pub fn is_empty_result(&self) -> bool {
        self.attempted > 0 && self.stored.is_empty()
    }

    /// Surviving names, or `EmptyResult` when every supplied upload failed.
    pub fn into_names(self) -> Result<Vec<ArtifactName>, AppError> {
        if self.is_empty_result() {
            return Err(AppError::EmptyResult {
                attempted: self.attempted,
            });
        }
        Ok(self.stored.into_iter().map(|a| a.name).collect())
    }
}

pub struct IngestPipeline {
    engine: TransformEngine,
    assigner: IdentityAssigner,
    store: Arc<dyn ArtifactStore>,
    concurrency: usize,
}

impl IngestPipeline {
    pub fn new(store: Arc<dyn ArtifactStore>, config: IngestConfig) -> Self {
        Self {
            engine: TransformEngine::new(config.transform),
            assigner: IdentityAssigner::new(
                Box::new(crate::naming::ClockNameGenerator),
                config.name_retries,
            ),
            store,
            concurrency: config.concurrency.max(1),
        }
    }

    /// Replace the name source, keeping the configured retry budget.
    pub fn with_name_generator(mut self, generator: Box<dyn NameGenerator>, retries: u32) -> Self {
        self.assigner = IdentityAssigner::new(generator, retries);
        self
    }

    /// Process a batch and report per-item outcomes.
    #[tracing::instrument(skip(self, batch), fields(batch_size = batch.len()))]
    pub async fn ingest(&self, batch: ValidatedBatch) -> IngestReport {
        let start = Instant::now();
        let uploads = batch.into_uploads();
        let attempted = uploads.len();

        let outcomes: Vec<Result<StoredArtifact, ItemFailure>> = stream::iter(
            uploads.into_iter().enumerate(),
        )
        .map(|(index, upload)| self.process_one(index, upload))
        .buffered(self.concurrency)
        .collect()
        .await;

        let mut report = IngestReport {
            attempted,
            ..IngestReport::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(stored) => report.stored.push(stored),
                Err(failure) => report.failures.push(failure),
            }
        }

        tracing::info!(
            attempted,
            stored = report.stored.len(),
            failed = report.failures.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image batch ingested"
        );

        report
    }

    /// Ingest a batch and return the surviving names in upload order.
    pub async fn ingest_names(&self, batch: ValidatedBatch) -> Result<Vec<ArtifactName>, AppError> {
        self.ingest(batch).await.into_names()
    }

    async fn process_one(
        &self,
        index: usize,
        upload: RawUpload,
    ) -> Result<StoredArtifact, ItemFailure> {
        let input_bytes = upload.size();

        let canonical = self
            .engine
            .transform_blocking(upload.data)
            .await
            .map_err(|e| {
                tracing::warn!(
                    index,
                    content_type = %upload.content_type,
                    size_bytes = input_bytes,
                    error = %e,
                    "Image transform failed, skipping upload"
                );
                ItemFailure {
                    index,
                    kind: FailureKind::Transform,
                    reason: e.to_string(),
                }
            })?;

        let store_failure = |e: vitrine_storage::StorageError| {
            tracing::warn!(index, error = %e, "Artifact store write failed, skipping upload");
            ItemFailure {
                index,
                kind: FailureKind::Store,
                reason: e.to_string(),
            }
        };

        let name = self
            .assigner
            .assign(self.store.as_ref())
            .await
            .map_err(store_failure)?;

        let size_bytes = canonical.size();
        self.store
            .put(&name, canonical.bytes)
            .await
            .map_err(store_failure)?;

        tracing::debug!(
            index,
            artifact = %name,
            url = %self.store.public_path(&name),
            width = canonical.width,
            height = canonical.height,
            size_bytes,
            "Artifact stored"
        );

        Ok(StoredArtifact {
            index,
            name,
            width: canonical.width,
            height: canonical.height,
            size_bytes,
        })
    }
}
