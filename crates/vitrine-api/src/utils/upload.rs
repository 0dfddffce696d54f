//! Multipart extraction for product create/update requests

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use vitrine_core::{AppError, ProductFields};
use vitrine_processing::{RawUpload, ValidatedBatch, ValidationGate};

/// Form field names that carry image files. `image` is the older single-image
/// field; both feed the same batch in arrival order.
pub const IMAGE_FIELDS: [&str; 2] = ["images", "image"];

/// Scalar fields and the validated image batch of one request
#[derive(Debug)]
pub struct ProductForm {
    pub fields: ProductFields,
    pub batch: ValidatedBatch,
}

/// Read every multipart field, running the validation gate on each file part
/// as it arrives so a bad part rejects the request before any transform work.
pub async fn extract_product_form(
    mut multipart: Multipart,
    gate: &ValidationGate,
) -> Result<ProductForm, AppError> {
    let mut fields = ProductFields::default();
    let mut uploads: Vec<RawUpload> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if IMAGE_FIELDS.contains(&field_name.as_str()) {
            gate.check_count(uploads.len())?;

            let content_type = field.content_type().map(|s| s.to_string()).unwrap_or_default();
            gate.check_content_type(&content_type)?;

            let data = field.bytes().await.map_err(multipart_error)?;
            gate.check_size(data.len())?;

            tracing::debug!(
                field = %field_name,
                index = uploads.len(),
                content_type = %content_type,
                size_bytes = data.len(),
                "Image part accepted"
            );
            uploads.push(RawUpload::new(data, content_type));
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            if !fields.set(&field_name, value) {
                tracing::debug!(field = %field_name, "Ignoring unknown form field");
            }
        }
    }

    let batch = gate.validate(uploads)?;
    Ok(ProductForm { fields, batch })
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body too large".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err))
    }
}
