use async_trait::async_trait;
use uuid::Uuid;
use vitrine_core::{AppError, NewProduct, Product, ProductQuery, ProductUpdate};

/// Product storage
///
/// `product_id` is unique across products. Implementations report a clash
/// as `AppError::Conflict("Product ID already exists")`.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: NewProduct) -> Result<Product, AppError>;

    /// Replace the fields of a product and append `update.added` to its images.
    ///
    /// The current image set is read and rewritten atomically, so concurrent
    /// updates of one product never drop each other's images. `None` when the
    /// product does not exist.
    async fn update(&self, id: Uuid, update: ProductUpdate) -> Result<Option<Product>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    /// Find a product by its business identifier, ignoring `excluding`.
    async fn find_by_product_id(
        &self,
        product_id: &str,
        excluding: Option<Uuid>,
    ) -> Result<Option<Product>, AppError>;

    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, AppError>;

    /// Returns whether a product was removed
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

pub(crate) fn product_id_conflict() -> AppError {
    AppError::Conflict("Product ID already exists".to_string())
}
