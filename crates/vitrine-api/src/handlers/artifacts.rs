use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use vitrine_core::constants::CANONICAL_CONTENT_TYPE;
use vitrine_core::{AppError, ArtifactName};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Serve a stored image by name.
///
/// Names that are not artifact names are answered with 404 without touching
/// the store. Mounted under the path of `PUBLIC_BASE_URL` (`/uploads` by default).
#[utoipa::path(
    get,
    path = "/uploads/{name}",
    tag = "images",
    params(
        ("name" = String, Path, description = "Artifact name, e.g. image-1735689600000-42.jpg")
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/jpeg"),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_artifact"))]
pub async fn get_artifact(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let name = ArtifactName::parse(&name)
        .map_err(|_| AppError::NotFound("Image not found".to_string()))?;

    let data = state.storage.get(&name).await?;

    Ok((
        [
            (header::CONTENT_TYPE, CANONICAL_CONTENT_TYPE),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        data,
    ))
}
