use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;
use vitrine_core::{AppError, AssociationManager, NewProduct, Product, ProductQuery, ProductUpdate};

use crate::repository::{product_id_conflict, ProductRepository};

/// Products kept in a process-local map
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn product_id_taken(products: &HashMap<Uuid, Product>, product_id: &str, excluding: Option<Uuid>) -> bool {
    products
        .values()
        .any(|p| p.product_id == product_id && Some(p.id) != excluding)
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: NewProduct) -> Result<Product, AppError> {
        let mut products = self.products.write().await;
        if product_id_taken(&products, &product.details.product_id, None) {
            return Err(product_id_conflict());
        }

        let now = Utc::now();
        let (image, images) = product.images.into_parts();
        let details = product.details;
        let created = Product {
            id: Uuid::new_v4(),
            name: details.name,
            product_id: details.product_id,
            price: details.price,
            category: details.category,
            discount: details.discount,
            description: details.description,
            image,
            images,
            created_at: now,
            updated_at: now,
        };
        products.insert(created.id, created.clone());

        tracing::debug!(product = %created.id, images = created.images.len(), "Product created in memory");
        Ok(created)
    }

    async fn update(&self, id: Uuid, update: ProductUpdate) -> Result<Option<Product>, AppError> {
        let mut products = self.products.write().await;
        if !products.contains_key(&id) {
            return Ok(None);
        }
        if product_id_taken(&products, &update.details.product_id, Some(id)) {
            return Err(product_id_conflict());
        }

        let Some(existing) = products.get_mut(&id) else {
            return Ok(None);
        };
        let merged = AssociationManager::update(&existing.image_set(), update.added);
        merged.verify()?;
        let (image, images) = merged.into_parts();
        let details = update.details;
        existing.name = details.name;
        existing.product_id = details.product_id;
        existing.price = details.price;
        existing.category = details.category;
        existing.discount = details.discount;
        existing.description = details.description;
        existing.image = image;
        existing.images = images;
        existing.updated_at = Utc::now();

        Ok(Some(existing.clone()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn find_by_product_id(
        &self,
        product_id: &str,
        excluding: Option<Uuid>,
    ) -> Result<Option<Product>, AppError> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .find(|p| p.product_id == product_id && Some(p.id) != excluding)
            .cloned())
    }

    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, AppError> {
        let mut listed: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        listed.sort_by(|a, b| query.sort.compare(a, b));
        Ok(listed)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.products.write().await.remove(&id).is_some())
    }
}
