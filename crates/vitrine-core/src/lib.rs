//! Vitrine Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! image association rules shared by every Vitrine component.

pub mod association;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use association::{AssociationManager, AssociationMode};
pub use config::{Config, IngestSettings};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    ArtifactName, InvalidArtifactName, NewProduct, Product, ProductDetails, ProductFields,
    ProductImageSet, ProductQuery, ProductSort, ProductUpdate, REQUIRED_FIELDS_MESSAGE,
};
pub use storage_types::StorageBackend;
