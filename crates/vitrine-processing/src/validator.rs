//! Validation gate for raw uploads.
//!
//! Runs before any decoding work. A single bad part rejects the whole batch;
//! per-item decode failures are handled later by the ingestion pipeline.

use bytes::Bytes;
use vitrine_core::constants::IMAGE_CONTENT_TYPE_PREFIX;
use vitrine_core::{AppError, IngestSettings};

/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Too many files: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid content type: {content_type}")]
    InvalidContentType { content_type: String },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::TooManyFiles { max, .. } => AppError::TooManyFiles { max },
            ValidationError::FileTooLarge { max, .. } => AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {}MB",
                max / 1024 / 1024
            )),
            ValidationError::InvalidContentType { .. } => {
                AppError::InvalidInput("Only image files are allowed!".to_string())
            }
        }
    }
}

/// One uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub data: Bytes,
    pub content_type: String,
}

impl RawUpload {
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Limits enforced by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_size: usize,
    pub max_files: usize,
}

impl From<&IngestSettings> for UploadLimits {
    fn from(settings: &IngestSettings) -> Self {
        Self {
            max_file_size: settings.max_upload_size_bytes,
            max_files: settings.max_upload_files,
        }
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::from(&IngestSettings::default())
    }
}

/// A batch that passed the gate. Only the gate builds non-empty batches.
#[derive(Debug, Clone, Default)]
pub struct ValidatedBatch(Vec<RawUpload>);

impl ValidatedBatch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_uploads(self) -> Vec<RawUpload> {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ValidationGate {
    limits: UploadLimits,
}

impl ValidationGate {
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    /// Check that one more file fits in the batch, `accepted` being the number already taken.
    pub fn check_count(&self, accepted: usize) -> Result<(), ValidationError> {
        let count = accepted + 1;
        if count > self.limits.max_files {
            return Err(ValidationError::TooManyFiles {
                count,
                max: self.limits.max_files,
            });
        }
        Ok(())
    }

    pub fn check_size(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.limits.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.limits.max_file_size,
            });
        }
        Ok(())
    }

    /// Accept only declared content types in the `image/` family.
    pub fn check_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = normalize_content_type(content_type);
        match normalized.strip_prefix(IMAGE_CONTENT_TYPE_PREFIX) {
            Some(subtype) if !subtype.is_empty() => Ok(()),
            _ => Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
            }),
        }
    }

    /// Run every check over a complete batch.
    pub fn validate(&self, uploads: Vec<RawUpload>) -> Result<ValidatedBatch, ValidationError> {
        if uploads.len() > self.limits.max_files {
            return Err(ValidationError::TooManyFiles {
                count: uploads.len(),
                max: self.limits.max_files,
            });
        }

        for upload in &uploads {
            self.check_content_type(&upload.content_type)?;
            self.check_size(upload.size())?;
        }

        Ok(ValidatedBatch(uploads))
    }
}

/// Lowercase a content type and drop any parameters (`image/PNG; q=1` → `image/png`).
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> ValidationGate {
        ValidationGate::new(UploadLimits {
            max_file_size: 1024,
            max_files: 5,
        })
    }

    #[test]
    fn test_content_type_must_be_image() {
        let gate = gate();
        assert!(gate.check_content_type("image/jpeg").is_ok());
        assert!(gate.check_content_type("IMAGE/PNG; charset=binary").is_ok());
        assert!(gate.check_content_type("image/").is_err());
        assert!(gate.check_content_type("application/pdf").is_err());
        assert!(gate.check_content_type("text/plain").is_err());
        assert!(gate.check_content_type("").is_err());
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        let gate = gate();
        assert!(gate.check_size(1024).is_ok());
        assert!(matches!(
            gate.check_size(1025),
            Err(ValidationError::FileTooLarge { size: 1025, max: 1024 })
        ));
    }

    #[test]
    fn test_count_limit() {
        let gate = gate();
        assert!(gate.check_count(4).is_ok());
        assert!(matches!(
            gate.check_count(5),
            Err(ValidationError::TooManyFiles { count: 6, max: 5 })
        ));
    }

    #[test]
    fn test_validate_rejects_whole_batch_on_one_bad_part() {
        let gate = gate();
        let uploads = vec![
            RawUpload::new(vec![1u8; 10], "image/png"),
            RawUpload::new(vec![1u8; 10], "application/octet-stream"),
            RawUpload::new(vec![1u8; 10], "image/jpeg"),
        ];
        assert!(matches!(
            gate.validate(uploads),
            Err(ValidationError::InvalidContentType { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_empty_and_full_batches() {
        let gate = gate();
        assert!(gate.validate(Vec::new()).unwrap().is_empty());

        let uploads: Vec<_> = (0..5)
            .map(|_| RawUpload::new(vec![0u8; 8], "image/webp"))
            .collect();
        assert_eq!(gate.validate(uploads).unwrap().len(), 5);

        let uploads: Vec<_> = (0..6)
            .map(|_| RawUpload::new(vec![0u8; 8], "image/webp"))
            .collect();
        assert!(gate.validate(uploads).is_err());
    }

    #[test]
    fn test_validation_error_maps_to_app_error() {
        let err: AppError = ValidationError::InvalidContentType {
            content_type: "text/html".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Invalid input: Only image files are allowed!");

        let err: AppError = ValidationError::FileTooLarge {
            size: 30 * 1024 * 1024,
            max: 20 * 1024 * 1024,
        }
        .into();
        assert!(matches!(err, AppError::PayloadTooLarge(ref m) if m.contains("20MB")));
    }

    #[test]
    fn test_default_limits_follow_settings() {
        let limits = UploadLimits::default();
        assert_eq!(limits.max_files, 5);
        assert_eq!(limits.max_file_size, 20 * 1024 * 1024);
    }
}
