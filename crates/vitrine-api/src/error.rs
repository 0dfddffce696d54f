//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into `AppError` converts into `HttpAppError` too, so `?` renders
//! every failure with the same status mapping, body shape and log level.

use std::sync::LazyLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use vitrine_core::{AppError, ErrorMetadata, LogLevel};
use vitrine_processing::ValidationError;
use vitrine_storage::StorageError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Client-facing message
    pub message: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from vitrine-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DownloadFailed(msg)
            | StorageError::BackendError(msg) => AppError::Storage(msg),
            StorageError::IoError(err) => AppError::Storage(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

static IS_PRODUCTION: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| {
            let env = env.to_lowercase();
            env == "production" || env == "prod"
        })
        .unwrap_or(false)
});

fn error_response(error: &AppError, include_details: bool) -> ErrorResponse {
    let (details, error_type) = if include_details && !error.is_sensitive() {
        (
            Some(error.detailed_message()),
            Some(error.error_type().to_string()),
        )
    } else {
        (None, None)
    };

    ErrorResponse {
        message: error.client_message(),
        code: error.error_code().to_string(),
        recoverable: error.is_recoverable(),
        details,
        error_type,
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details never leave the process in production or for sensitive errors
        let body = error_response(app_error, !*IS_PRODUCTION);

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_from_storage_error_not_found() {
        let storage_err = StorageError::NotFound("image-1-2.jpg".to_string());
        let HttpAppError(app_err) = storage_err.into();
        match app_err {
            AppError::NotFound(msg) => assert_eq!(msg, "image-1-2.jpg"),
            _ => panic!("Expected NotFound variant"),
        }
    }

    #[test]
    fn test_from_storage_error_upload_failed() {
        let storage_err = StorageError::UploadFailed("bucket unreachable".to_string());
        let HttpAppError(app_err) = storage_err.into();
        match app_err {
            AppError::Storage(msg) => assert_eq!(msg, "bucket unreachable"),
            _ => panic!("Expected Storage variant"),
        }
    }

    #[test]
    fn test_from_storage_error_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let HttpAppError(app_err) = StorageError::IoError(io_err).into();
        match app_err {
            AppError::Storage(msg) => assert!(msg.contains("IO error")),
            _ => panic!("Expected Storage variant"),
        }
    }

    #[test]
    fn test_from_validation_error_content_type() {
        let validation_err = ValidationError::InvalidContentType {
            content_type: "application/pdf".to_string(),
        };
        let HttpAppError(app_err) = validation_err.into();
        match app_err {
            AppError::InvalidInput(msg) => assert_eq!(msg, "Only image files are allowed!"),
            _ => panic!("Expected InvalidInput variant"),
        }
    }

    #[test]
    fn test_error_response_hides_sensitive_details() {
        let err = AppError::Storage("/srv/uploads: disk full".to_string());
        let body = error_response(&err, true);
        assert_eq!(body.code, "STORAGE_ERROR");
        assert!(body.details.is_none());
        assert!(!body.message.contains("/srv"));
    }

    #[test]
    fn test_error_response_details_outside_production() {
        let err = AppError::InvalidInput("Price must be a valid number".to_string());

        let body = error_response(&err, true);
        assert_eq!(body.error_type.as_deref(), Some("InvalidInput"));
        assert!(body.details.is_some());

        let body = error_response(&err, false);
        assert!(body.details.is_none());
        assert!(body.error_type.is_none());
    }

    /// Serialized ErrorResponse always has "message", "code" and "recoverable".
    #[test]
    fn test_error_response_shape() {
        let body = error_response(&AppError::EmptyResult { attempted: 2 }, false);
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(
            json.get("message").and_then(|v| v.as_str()),
            Some("Failed to process any images")
        );
        assert_eq!(
            json.get("code").and_then(|v| v.as_str()),
            Some("NO_IMAGES_PROCESSED")
        );
        assert!(json.get("recoverable").and_then(|v| v.as_bool()).is_some());
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_into_response_status() {
        let response = HttpAppError(AppError::TooManyFiles { max: 5 }).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["code"], "TOO_MANY_FILES");
    }
}
