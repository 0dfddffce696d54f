use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;
use vitrine_core::{
    AppError, ArtifactName, AssociationManager, NewProduct, Product, ProductDetails,
    ProductImageSet, ProductQuery, ProductUpdate,
};

use crate::repository::ProductRepository;

const PRODUCT_COLUMNS: &str = "id, name, product_id, price, category, discount, description, \
                               image, images, created_at, updated_at";

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    product_id: String,
    price: f64,
    category: String,
    discount: f64,
    description: String,
    image: Option<String>,
    images: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let corrupt = |e: vitrine_core::InvalidArtifactName| {
            AppError::Database(format!("product {} holds {}", row.id, e))
        };
        let image = row
            .image
            .as_deref()
            .map(ArtifactName::parse)
            .transpose()
            .map_err(corrupt)?;
        let images = row
            .images
            .iter()
            .map(|name| ArtifactName::parse(name))
            .collect::<Result<Vec<_>, _>>()
            .map_err(corrupt)?;

        Ok(Product {
            id: row.id,
            name: row.name,
            product_id: row.product_id,
            price: row.price,
            category: row.category,
            discount: row.discount,
            description: row.description,
            image,
            images,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn image_columns(images: ProductImageSet) -> (Option<String>, Vec<String>) {
    let (primary, ordered) = images.into_parts();
    (
        primary.map(ArtifactName::into_inner),
        ordered.into_iter().map(ArtifactName::into_inner).collect(),
    )
}

/// Escape `%`, `_` and `\` so a search term matches literally inside `ILIKE`.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Product repository backed by the `products` table
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(
        &self,
        details: ProductDetails,
        images: ProductImageSet,
    ) -> Result<ProductRow, AppError> {
        let (image, images) = image_columns(images);
        let sql = format!(
            r#"
            INSERT INTO products
                (id, name, product_id, price, category, discount, description, image, images)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<Postgres, ProductRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&details.name)
            .bind(&details.product_id)
            .bind(details.price)
            .bind(&details.category)
            .bind(details.discount)
            .bind(&details.description)
            .bind(image)
            .bind(images)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Lock the row, append the new images to what it holds now, write it back.
    async fn update_locked(
        &self,
        id: Uuid,
        update: ProductUpdate,
    ) -> Result<Option<ProductRow>, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<Postgres, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let current = Product::try_from(current)?;
        let merged = AssociationManager::update(&current.image_set(), update.added);
        merged.verify()?;
        let (image, images) = image_columns(merged);

        let details = update.details;
        let sql = format!(
            r#"
            UPDATE products
            SET name = $2, product_id = $3, price = $4, category = $5, discount = $6,
                description = $7, image = $8, images = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<Postgres, ProductRow>(&sql)
            .bind(id)
            .bind(&details.name)
            .bind(&details.product_id)
            .bind(details.price)
            .bind(&details.category)
            .bind(details.discount)
            .bind(&details.description)
            .bind(image)
            .bind(images)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(row))
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    #[tracing::instrument(skip(self, product), fields(db.table = "products", db.operation = "insert"))]
    async fn create(&self, product: NewProduct) -> Result<Product, AppError> {
        let row = self.insert(product.details, product.images).await?;
        Product::try_from(row)
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "products", db.operation = "update", db.record_id = %id))]
    async fn update(&self, id: Uuid, update: ProductUpdate) -> Result<Option<Product>, AppError> {
        self.update_locked(id, update)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<Postgres, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "select"))]
    async fn find_by_product_id(
        &self,
        product_id: &str,
        excluding: Option<Uuid>,
    ) -> Result<Option<Product>, AppError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE product_id = $1 AND ($2::uuid IS NULL OR id <> $2) LIMIT 1"
        );
        sqlx::query_as::<Postgres, ProductRow>(&sql)
            .bind(product_id)
            .bind(excluding)
            .fetch_optional(&self.pool)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "select"))]
    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, AppError> {
        let search = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        let category = query.category.as_deref().filter(|c| !c.is_empty());

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::text IS NULL OR name ILIKE $1) \
               AND ($2::text IS NULL OR category = $2) \
             ORDER BY {}",
            query.sort.order_by_clause()
        );
        let rows = sqlx::query_as::<Postgres, ProductRow>(&sql)
            .bind(search)
            .bind(category)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("shirt"), "%shirt%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_row_with_corrupt_image_name_is_rejected() {
        let now = Utc::now();
        let row = ProductRow {
            id: Uuid::new_v4(),
            name: "Loafer".to_string(),
            product_id: "P-1".to_string(),
            price: 10.0,
            category: "shoes".to_string(),
            discount: 0.0,
            description: String::new(),
            image: Some("../../etc/passwd".to_string()),
            images: vec!["../../etc/passwd".to_string()],
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(Product::try_from(row), Err(AppError::Database(_))));
    }

    #[test]
    fn test_row_converts_to_product() {
        let now = Utc::now();
        let row = ProductRow {
            id: Uuid::new_v4(),
            name: "Loafer".to_string(),
            product_id: "P-1".to_string(),
            price: 10.0,
            category: "shoes".to_string(),
            discount: 5.0,
            description: "Suede".to_string(),
            image: Some("image-1-2.jpg".to_string()),
            images: vec!["image-1-2.jpg".to_string(), "image-3-4.jpg".to_string()],
            created_at: now,
            updated_at: now,
        };
        let product = Product::try_from(row).unwrap();
        assert_eq!(product.images.len(), 2);
        assert!(product.image_set().verify().is_ok());
    }
}
