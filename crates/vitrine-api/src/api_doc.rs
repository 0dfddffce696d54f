//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use vitrine_core::{Product, ProductSort};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vitrine API",
        version = "0.1.0",
        description = "Product catalogue API. Product photos are normalized to a single JPEG encoding on upload and served from /uploads."
    ),
    paths(
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::get_product,
        handlers::products::list_products,
        handlers::products::delete_product,
        handlers::artifacts::get_artifact,
    ),
    components(
        schemas(
            Product,
            ProductSort,
            handlers::products::MessageResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "products", description = "Product records and their image sets"),
        (name = "images", description = "Stored product images")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_product_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/products"));
        assert!(doc.paths.paths.contains_key("/api/products/{id}"));
        assert!(doc.paths.paths.contains_key("/uploads/{name}"));
    }
}
