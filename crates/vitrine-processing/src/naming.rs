//! Artifact naming.
//!
//! Names are `image-<unix millis>-<random>.jpg` and never derive from the
//! client's filename or content type. Uniqueness is probabilistic, so the
//! assigner checks the store before handing a name out and draws again on a
//! hit. A check-then-write race between two requests remains possible.

use rand::Rng;
use vitrine_core::constants::ARTIFACT_RANDOM_MAX;
use vitrine_core::ArtifactName;
use vitrine_storage::{ArtifactStore, StorageError, StorageResult};

/// Source of candidate artifact names
pub trait NameGenerator: Send + Sync {
    fn next_name(&self) -> ArtifactName;
}

/// Wall clock plus a random component in `0..=1_000_000_000`
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockNameGenerator;

impl NameGenerator for ClockNameGenerator {
    fn next_name(&self) -> ArtifactName {
        let timestamp_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let random = rand::rng().random_range(0..=ARTIFACT_RANDOM_MAX);
        ArtifactName::from_parts(timestamp_ms, random)
    }
}

/// Hands out names that are not yet present in the store
pub struct IdentityAssigner {
    generator: Box<dyn NameGenerator>,
    max_attempts: u32,
}

impl IdentityAssigner {
    pub fn new(generator: Box<dyn NameGenerator>, max_attempts: u32) -> Self {
        Self {
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Draw names until one is free in `store`.
    pub async fn assign(&self, store: &dyn ArtifactStore) -> StorageResult<ArtifactName> {
        for attempt in 1..=self.max_attempts {
            let name = self.generator.next_name();
            if !store.exists(&name).await? {
                return Ok(name);
            }
            tracing::warn!(
                artifact = %name,
                attempt,
                max_attempts = self.max_attempts,
                "Artifact name already taken, drawing another"
            );
        }

        Err(StorageError::BackendError(format!(
            "no free artifact name after {} attempts",
            self.max_attempts
        )))
    }
}

impl Default for IdentityAssigner {
    fn default() -> Self {
        Self::new(
            Box::new(ClockNameGenerator),
            vitrine_core::IngestSettings::default().name_retries,
        )
    }
}
