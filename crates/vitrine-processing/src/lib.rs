//! Vitrine Processing Library
//!
//! The image ingestion pipeline: the validation gate that screens raw
//! uploads, the transform engine that produces canonical JPEGs, the identity
//! assigner that names them, and the orchestrator that stores each result
//! and reports which uploads survived.

pub mod ingest;
pub mod naming;
pub mod transform;
pub mod validator;

pub use ingest::{
    FailureKind, IngestConfig, IngestPipeline, IngestReport, ItemFailure, StoredArtifact,
};
pub use naming::{ClockNameGenerator, IdentityAssigner, NameGenerator};
pub use transform::{CanonicalImage, TransformConfig, TransformEngine, TransformError};
pub use validator::{RawUpload, UploadLimits, ValidatedBatch, ValidationError, ValidationGate};
