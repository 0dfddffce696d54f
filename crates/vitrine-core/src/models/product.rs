use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::artifact::ArtifactName;
use super::image_set::ProductImageSet;
use crate::error::AppError;

pub const REQUIRED_FIELDS_MESSAGE: &str =
    "All fields (name, productId, price, category, description) are required";

/// Product record as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub product_id: String,
    pub price: f64,
    pub category: String,
    pub discount: f64,
    pub description: String,
    /// Primary image, always the first entry of `images`
    pub image: Option<ArtifactName>,
    pub images: Vec<ArtifactName>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn image_set(&self) -> ProductImageSet {
        ProductImageSet::from_parts(self.image.clone(), self.images.clone())
    }
}

/// Scalar form fields as they arrive in a multipart request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFields {
    pub name: Option<String>,
    pub product_id: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub discount: Option<String>,
    pub description: Option<String>,
}

impl ProductFields {
    /// Record a form field. Returns `false` for names that are not product fields.
    pub fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "productId" => &mut self.product_id,
            "price" => &mut self.price,
            "category" => &mut self.category,
            "discount" => &mut self.discount,
            "description" => &mut self.description,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Check required fields and parse numbers.
    pub fn into_details(self) -> Result<ProductDetails, AppError> {
        let (Some(name), Some(product_id), Some(price), Some(category), Some(description)) = (
            non_blank(self.name),
            non_blank(self.product_id),
            non_blank(self.price),
            non_blank(self.category),
            non_blank(self.description),
        ) else {
            return Err(AppError::InvalidInput(REQUIRED_FIELDS_MESSAGE.to_string()));
        };

        let price = parse_amount(&price, "Price")?;
        let discount = match non_blank(self.discount) {
            Some(raw) => parse_amount(&raw, "Discount")?,
            None => 0.0,
        };

        let details = ProductDetails {
            name,
            product_id,
            price,
            category,
            discount,
            description,
        };
        details.validate()?;
        Ok(details)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_amount(raw: &str, label: &str) -> Result<f64, AppError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(AppError::InvalidInput(format!(
            "{} must be a valid number",
            label
        ))),
    }
}

/// Validated scalar fields of a product
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProductDetails {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,
    #[validate(length(max = 100, message = "Product ID must be at most 100 characters"))]
    pub product_id: String,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: String,
    #[validate(range(min = 0.0, message = "Discount must not be negative"))]
    pub discount: f64,
    pub description: String,
}

/// Data needed to insert a new product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub details: ProductDetails,
    pub images: ProductImageSet,
}

/// Replacement fields plus the freshly stored images to append.
///
/// The merge with the current image set happens in the repository, against
/// the row as it is at write time.
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub details: ProductDetails,
    pub added: Vec<ArtifactName>,
}

/// Listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub enum ProductSort {
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
}

impl ProductSort {
    /// Order two products according to this sort. Price ties list newest first.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let newest = b.created_at.cmp(&a.created_at);
        match self {
            ProductSort::Newest => newest,
            ProductSort::PriceAsc => a.price.total_cmp(&b.price).then(newest),
            ProductSort::PriceDesc => b.price.total_cmp(&a.price).then(newest),
        }
    }

    /// SQL `ORDER BY` clause for this sort
    pub fn order_by_clause(&self) -> &'static str {
        match self {
            ProductSort::Newest => "created_at DESC, id",
            ProductSort::PriceAsc => "price ASC, created_at DESC",
            ProductSort::PriceDesc => "price DESC, created_at DESC",
        }
    }
}

impl FromStr for ProductSort {
    type Err = std::convert::Infallible;

    /// Unknown values fall back to newest first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "price-asc" => ProductSort::PriceAsc,
            "price-desc" => ProductSort::PriceDesc,
            _ => ProductSort::Newest,
        })
    }
}

impl<'de> Deserialize<'de> for ProductSort {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse::<ProductSort>().unwrap_or_default())
    }
}

/// Filters for listing products
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Case-insensitive substring of the product name
    pub search: Option<String>,
    /// Exact category
    pub category: Option<String>,
    /// `price-asc`, `price-desc`; anything else lists newest first
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub sort: ProductSort,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            if !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if product.category != category {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_fields() -> ProductFields {
        let mut fields = ProductFields::default();
        fields.set("name", "Linen Shirt".to_string());
        fields.set("productId", "SKU-1".to_string());
        fields.set("price", "49.90".to_string());
        fields.set("category", "shirts".to_string());
        fields.set("description", "Breathable".to_string());
        fields
    }

    fn product(name: &str, price: f64, category: &str, age_secs: i64) -> Product {
        let created = Utc::now() - chrono::Duration::seconds(age_secs);
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            product_id: name.to_string(),
            price,
            category: category.to_string(),
            discount: 0.0,
            description: String::new(),
            image: None,
            images: Vec::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_into_details_defaults_discount() {
        let details = full_fields().into_details().unwrap();
        assert_eq!(details.price, 49.90);
        assert_eq!(details.discount, 0.0);
        assert_eq!(details.product_id, "SKU-1");
    }

    #[test]
    fn test_into_details_requires_fields() {
        let mut fields = full_fields();
        fields.category = Some("   ".to_string());
        let err = fields.into_details().unwrap_err();
        assert_eq!(err.to_string(), format!("Invalid input: {}", REQUIRED_FIELDS_MESSAGE));
    }

    #[test]
    fn test_into_details_rejects_bad_numbers() {
        let mut fields = full_fields();
        fields.price = Some("cheap".to_string());
        assert!(matches!(fields.into_details(), Err(AppError::InvalidInput(_))));

        let mut fields = full_fields();
        fields.discount = Some("-5".to_string());
        assert!(matches!(fields.into_details(), Err(AppError::InvalidInput(_))));

        let mut fields = full_fields();
        fields.price = Some("NaN".to_string());
        assert!(matches!(fields.into_details(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_set_ignores_unknown_fields() {
        let mut fields = ProductFields::default();
        assert!(!fields.set("images", "x".to_string()));
        assert!(fields.set("discount", "10".to_string()));
        assert_eq!(fields.discount.as_deref(), Some("10"));
    }

    #[test]
    fn test_sort_parsing_is_lenient() {
        assert_eq!("price-asc".parse::<ProductSort>().unwrap(), ProductSort::PriceAsc);
        assert_eq!("price-desc".parse::<ProductSort>().unwrap(), ProductSort::PriceDesc);
        assert_eq!("popular".parse::<ProductSort>().unwrap(), ProductSort::Newest);
    }

    #[test]
    fn test_query_matching_and_ordering() {
        let query = ProductQuery {
            search: Some("SHIRT".to_string()),
            category: Some("shirts".to_string()),
            sort: ProductSort::PriceAsc,
        };
        let cheap = product("Oxford shirt", 30.0, "shirts", 10);
        let pricey = product("Silk shirt", 90.0, "shirts", 20);
        let other = product("Wool coat", 10.0, "coats", 30);

        assert!(query.matches(&cheap));
        assert!(!query.matches(&other));

        let mut listed = vec![pricey.clone(), cheap.clone()];
        listed.sort_by(|a, b| query.sort.compare(a, b));
        assert_eq!(listed[0].id, cheap.id);

        listed.sort_by(|a, b| ProductSort::Newest.compare(a, b));
        assert_eq!(listed[0].id, cheap.id);
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let p = product("Oxford shirt", 30.0, "shirts", 0);
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("productId").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("image").unwrap().is_null());
    }
}
