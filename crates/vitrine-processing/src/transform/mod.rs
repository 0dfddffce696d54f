//! Transform engine: any decodable image in, canonical JPEG out.

mod jpeg;
mod resize;

pub use resize::ImageResize;

use bytes::Bytes;
use image::{GenericImageView, ImageReader};
use std::io::Cursor;
use vitrine_core::IngestSettings;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to encode JPEG: {0}")]
    Encode(String),

    #[error("Transform task failed: {0}")]
    Task(String),
}

/// Bounding box and encoder quality of canonical images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
}

impl From<&IngestSettings> for TransformConfig {
    fn from(settings: &IngestSettings) -> Self {
        Self {
            max_width: settings.max_width,
            max_height: settings.max_height,
            quality: settings.jpeg_quality,
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self::from(&IngestSettings::default())
    }
}

/// Progressive JPEG that fits inside the configured bounding box
#[derive(Debug, Clone)]
pub struct CanonicalImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

impl CanonicalImage {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransformEngine {
    config: TransformConfig,
}

impl TransformEngine {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> TransformConfig {
        self.config
    }

    /// Decode, shrink to fit and re-encode one image.
    ///
    /// CPU bound; async callers go through [`TransformEngine::transform_blocking`].
    pub fn transform(&self, data: &[u8]) -> Result<CanonicalImage, TransformError> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;

        let (orig_width, orig_height) = img.dimensions();
        let (width, height) = ImageResize::fit_inside(
            orig_width,
            orig_height,
            self.config.max_width,
            self.config.max_height,
        );

        let img = if (width, height) == (orig_width, orig_height) {
            img
        } else {
            ImageResize::resize_image(&img, width, height)
        };

        let bytes = jpeg::encode_progressive(&img, self.config.quality)?;

        tracing::debug!(
            orig_width,
            orig_height,
            width,
            height,
            input_bytes = data.len(),
            size_bytes = bytes.len(),
            "Image transformed"
        );

        Ok(CanonicalImage {
            bytes,
            width,
            height,
        })
    }

    /// Run [`TransformEngine::transform`] on the blocking thread pool.
    pub async fn transform_blocking(&self, data: Bytes) -> Result<CanonicalImage, TransformError> {
        let engine = *self;
        tokio::task::spawn_blocking(move || engine.transform(&data))
            .await
            .map_err(|e| TransformError::Task(e.to_string()))?
    }
}
