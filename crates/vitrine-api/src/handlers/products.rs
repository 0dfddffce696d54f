use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use vitrine_core::{
    AppError, AssociationManager, AssociationMode, NewProduct, Product, ProductDetails,
    ProductQuery, ProductUpdate,
};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_product_form;

const PRODUCT_NOT_FOUND: &str = "Product not found";
const PRODUCT_ID_EXISTS: &str = "Product ID already exists";

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn not_found() -> AppError {
    AppError::NotFound(PRODUCT_NOT_FOUND.to_string())
}

/// Reject a product ID already held by another product.
async fn ensure_product_id_free(
    state: &AppState,
    details: &ProductDetails,
    excluding: Option<Uuid>,
) -> Result<(), AppError> {
    let taken = state
        .products
        .find_by_product_id(&details.product_id, excluding)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(PRODUCT_ID_EXISTS.to_string()));
    }
    Ok(())
}

/// Create product handler
///
/// Accepts the product fields and up to five image parts (`images`, or the
/// older `image` field). Images are normalized and stored in upload order; the
/// first one that survives becomes the primary image.
///
/// # Errors
/// - `AppError::InvalidInput` - Missing fields, bad numbers, or a non-image part
/// - `AppError::TooManyFiles` - More image parts than allowed
/// - `AppError::PayloadTooLarge` - An image part exceeds the size ceiling
/// - `AppError::Conflict` - The product ID is already taken
/// - `AppError::EmptyResult` - Images were sent but none could be processed
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "products",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid input or duplicate product ID", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 422, description = "No image could be processed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "create_product"))]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = extract_product_form(multipart, &state.gate).await?;
    let details = form.fields.into_details()?;
    ensure_product_id_free(&state, &details, None).await?;

    let names = state.ingest.ingest_names(form.batch).await?;
    let images = AssociationManager::apply(AssociationMode::Create, names);
    images.verify()?;

    let product = state.products.create(NewProduct { details, images }).await?;

    tracing::info!(
        id = %product.id,
        product_id = %product.product_id,
        image_count = product.images.len(),
        "Product created"
    );

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update product handler
///
/// Replaces the product fields. Uploaded images are appended after the
/// existing ones; the primary image only changes if the product had none.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid input or duplicate product ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 422, description = "No image could be processed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(id = %id, operation = "update_product"))]
pub async fn update_product(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = extract_product_form(multipart, &state.gate).await?;
    let details = form.fields.into_details()?;

    if state.products.get(id).await?.is_none() {
        return Err(not_found().into());
    }
    ensure_product_id_free(&state, &details, Some(id)).await?;

    // Appended to the product's images as they stand at write time
    let added = state.ingest.ingest_names(form.batch).await?;
    let added_count = added.len();

    let product = state
        .products
        .update(id, ProductUpdate { details, added })
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(
        id = %product.id,
        images_added = added_count,
        image_count = product.images.len(),
        "Product updated"
    );

    Ok(Json(product))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(id = %id, operation = "get_product"))]
pub async fn get_product(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let product = state.products.get(id).await?.ok_or_else(not_found)?;
    Ok(Json(product))
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Matching products", body = Vec<Product>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, query),
    fields(
        search = ?query.search,
        category = ?query.category,
        sort = ?query.sort,
        operation = "list_products"
    )
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let products = state.products.list(&query).await?;
    Ok(Json(products))
}

/// Delete product handler
///
/// Stored images are left in place.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(id = %id, operation = "delete_product"))]
pub async fn delete_product(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.products.delete(id).await? {
        return Err(not_found().into());
    }

    tracing::info!(id = %id, "Product deleted");
    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}
