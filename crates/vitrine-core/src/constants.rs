//! Pipeline-wide constants.
//!
//! These are the defaults baked into the canonical encoding and the upload
//! boundary. `Config` may override the limits, never the encoding format.

/// Maximum number of image parts accepted in one create/update request.
pub const MAX_UPLOAD_FILES: usize = 5;

/// Per-upload size ceiling (20 MiB). Uploads are compressed afterwards, so the
/// ceiling is generous compared to the stored artifact size.
pub const MAX_UPLOAD_SIZE_BYTES: usize = 20 * 1024 * 1024;

/// Bounding box every stored artifact fits inside.
pub const CANONICAL_MAX_WIDTH: u32 = 800;
pub const CANONICAL_MAX_HEIGHT: u32 = 600;

/// JPEG quality used for every stored artifact.
pub const CANONICAL_JPEG_QUALITY: u8 = 80;

pub const CANONICAL_EXTENSION: &str = "jpg";
pub const CANONICAL_CONTENT_TYPE: &str = "image/jpeg";

/// Prefix of every generated artifact name (`image-<ms>-<random>.jpg`).
pub const ARTIFACT_NAME_PREFIX: &str = "image";

/// Upper bound (inclusive) of the random component of an artifact name.
pub const ARTIFACT_RANDOM_MAX: u64 = 1_000_000_000;

/// Content-type prefix the validation gate accepts.
pub const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";
