//! Vitrine API Library
//!
//! HTTP surface of the product catalogue: multipart extraction, product
//! handlers, the artifact read path, error rendering and application setup.

mod api_doc;
mod handlers;
mod telemetry;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
