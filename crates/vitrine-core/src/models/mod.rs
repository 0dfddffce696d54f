//! Data models for the catalogue
//!
//! Artifact names and image sets are the pieces the ingestion pipeline
//! produces; products are the records those pieces are attached to.

mod artifact;
mod image_set;
mod product;

pub use artifact::*;
pub use image_set::*;
pub use product::*;
