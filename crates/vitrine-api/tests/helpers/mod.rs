//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in-process against the in-memory product repository and
//! the in-memory artifact store; no database or Docker is needed.

#![allow(dead_code)]

pub mod fixtures;

use std::collections::HashMap;
use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use vitrine_api::setup::routes;
use vitrine_api::state::AppState;
use vitrine_core::Config;
use vitrine_db::InMemoryProductRepository;
use vitrine_storage::MemoryStorage;

/// Test application: server plus handles on the in-memory backends.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MemoryStorage>,
    pub products: Arc<InMemoryProductRepository>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of artifacts written so far
    pub async fn stored_count(&self) -> usize {
        self.storage.len().await
    }
}

/// Setup test app with default limits.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(&[])
}

/// Setup test app with configuration overrides (e.g. `MAX_UPLOAD_SIZE_MB`).
pub fn setup_test_app_with(vars: &[(&str, &str)]) -> TestApp {
    let mut map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    map.entry("STORAGE_BACKEND".to_string())
        .or_insert_with(|| "memory".to_string());

    let config = Config::from_lookup(|key| map.get(key).cloned()).expect("Failed to build config");
    config.validate().expect("Invalid test config");

    let storage = Arc::new(MemoryStorage::new(config.public_base_url()));
    let products = Arc::new(InMemoryProductRepository::new());

    let state = Arc::new(AppState::new(
        config.clone(),
        products.clone(),
        storage.clone(),
        None,
    ));

    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        products,
    }
}

/// Multipart form with every required product field filled in.
pub fn product_form(product_id: &str, name: &str, price: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name)
        .add_text("productId", product_id)
        .add_text("price", price)
        .add_text("category", "shirts")
        .add_text("description", "Woven cotton")
}

/// An image part with the given content type.
pub fn image_part(data: Vec<u8>, file_name: &str, mime_type: &str) -> Part {
    Part::bytes(data).file_name(file_name).mime_type(mime_type)
}

pub fn png_part(width: u32, height: u32) -> Part {
    image_part(fixtures::create_test_png(width, height), "photo.png", "image/png")
}

pub fn jpeg_part(width: u32, height: u32) -> Part {
    image_part(fixtures::create_test_jpeg(width, height), "photo.jpg", "image/jpeg")
}

/// Create a product through the API and return the JSON body.
pub async fn create_product(
    client: &TestServer,
    form: MultipartForm,
) -> serde_json::Value {
    let response = client.post("/api/products").multipart(form).await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    response.json()
}

/// Image names of a product body, in order.
pub fn image_names(product: &serde_json::Value) -> Vec<String> {
    product["images"]
        .as_array()
        .expect("images array")
        .iter()
        .map(|v| v.as_str().expect("image name").to_string())
        .collect()
}

/// Fetch a stored image and return its dimensions.
pub async fn stored_dimensions(client: &TestServer, name: &str) -> (u32, u32) {
    let response = client.get(&format!("/uploads/{}", name)).await;
    assert_eq!(response.status_code(), 200);
    fixtures::dimensions(response.as_bytes())
}
