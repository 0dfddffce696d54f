//! Configuration module
//!
//! Configuration is read from the environment (after loading `.env` with
//! `dotenvy`) and validated once at startup. Library crates never read the
//! environment themselves; they receive `IngestSettings` or backend-specific
//! values through the getters below.

use std::env;

use crate::constants::{
    CANONICAL_JPEG_QUALITY, CANONICAL_MAX_HEIGHT, CANONICAL_MAX_WIDTH, MAX_UPLOAD_FILES,
    MAX_UPLOAD_SIZE_BYTES,
};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 3000;
const DB_MAX_CONNECTIONS: u32 = 10;
const DB_TIMEOUT_SECS: u64 = 30;
const INGEST_CONCURRENCY: usize = 4;
const ARTIFACT_NAME_RETRIES: u32 = 3;
const LOCAL_STORAGE_PATH: &str = "uploads";
const PUBLIC_BASE_URL: &str = "/uploads";

/// Settings shared by every binary (HTTP surface and logging).
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub log_format: String,
}

/// Limits and encoding parameters of the image ingestion pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestSettings {
    pub max_upload_size_bytes: usize,
    pub max_upload_files: usize,
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
    pub concurrency: usize,
    pub name_retries: u32,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_upload_size_bytes: MAX_UPLOAD_SIZE_BYTES,
            max_upload_files: MAX_UPLOAD_FILES,
            max_width: CANONICAL_MAX_WIDTH,
            max_height: CANONICAL_MAX_HEIGHT,
            jpeg_quality: CANONICAL_JPEG_QUALITY,
            concurrency: INGEST_CONCURRENCY,
            name_retries: ARTIFACT_NAME_RETRIES,
        }
    }
}

/// Catalogue service configuration
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub base: BaseConfig,
    // Product persistence; `None` selects the in-memory repository
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Artifact store
    pub storage_backend: StorageBackend,
    pub local_storage_path: String,
    pub public_base_url: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub ingest: IngestSettings,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<CatalogConfig>);

impl Config {
    fn inner(&self) -> &CatalogConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map so they never mutate the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::Local,
        };

        let defaults = IngestSettings::default();
        let max_upload_size_mb = parse_or(
            &lookup,
            "MAX_UPLOAD_SIZE_MB",
            defaults.max_upload_size_bytes / 1024 / 1024,
        );

        let ingest = IngestSettings {
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            max_upload_files: parse_or(&lookup, "MAX_UPLOAD_FILES", defaults.max_upload_files),
            max_width: parse_or(&lookup, "IMAGE_MAX_WIDTH", defaults.max_width),
            max_height: parse_or(&lookup, "IMAGE_MAX_HEIGHT", defaults.max_height),
            jpeg_quality: parse_or(&lookup, "IMAGE_QUALITY", defaults.jpeg_quality),
            concurrency: parse_or(&lookup, "INGEST_CONCURRENCY", defaults.concurrency),
            name_retries: parse_or(&lookup, "ARTIFACT_NAME_RETRIES", defaults.name_retries),
        };

        let config = CatalogConfig {
            base: BaseConfig {
                server_port: parse_or(&lookup, "SERVER_PORT", SERVER_PORT),
                cors_origins,
                environment,
                log_format: lookup("LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
            },
            database_url: lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DB_MAX_CONNECTIONS),
            db_timeout_seconds: parse_or(&lookup, "DB_TIMEOUT_SECONDS", DB_TIMEOUT_SECS),
            storage_backend,
            local_storage_path: lookup("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| LOCAL_STORAGE_PATH.to_string()),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| PUBLIC_BASE_URL.to_string()),
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION").or_else(|| lookup("AWS_REGION")),
            s3_endpoint: lookup("S3_ENDPOINT"),
            ingest,
        };

        Ok(Config(Box::new(config)))
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let config = self.inner();

        if self.is_production() && config.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if let Some(ref url) = config.database_url {
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
            if config.db_max_connections == 0 {
                return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS cannot be 0"));
            }
        }

        if config.storage_backend == StorageBackend::S3
            && (config.s3_bucket.is_none() || config.s3_region.is_none())
        {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=s3 requires S3_BUCKET and S3_REGION (or AWS_REGION)"
            ));
        }

        let ingest = &config.ingest;
        if ingest.max_upload_files == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_FILES must be at least 1"));
        }
        if ingest.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be at least 1"));
        }
        if ingest.max_width == 0 || ingest.max_height == 0 {
            return Err(anyhow::anyhow!(
                "IMAGE_MAX_WIDTH and IMAGE_MAX_HEIGHT must be greater than 0"
            ));
        }
        if !(1..=100).contains(&ingest.jpeg_quality) {
            return Err(anyhow::anyhow!("IMAGE_QUALITY must be between 1 and 100"));
        }
        if ingest.concurrency == 0 {
            return Err(anyhow::anyhow!("INGEST_CONCURRENCY must be at least 1"));
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.inner().base.log_format
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn local_storage_path(&self) -> &str {
        &self.inner().local_storage_path
    }

    pub fn public_base_url(&self) -> &str {
        &self.inner().public_base_url
    }

    /// Route serving stored artifacts: the path part of `PUBLIC_BASE_URL`
    /// followed by `/{name}`. A base pointing at another host (a CDN in front
    /// of this service) keeps only its path.
    pub fn artifact_route(&self) -> String {
        let base = self.public_base_url();
        let path = match base.split_once("://") {
            Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
            None => base,
        };
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            format!("{}/{{name}}", PUBLIC_BASE_URL)
        } else if path.starts_with('/') {
            format!("{}/{{name}}", path)
        } else {
            format!("/{}/{{name}}", path)
        }
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn ingest(&self) -> &IngestSettings {
        &self.inner().ingest
    }

    /// Upper bound for a whole multipart request: every file at the ceiling
    /// plus 1 MiB for the scalar form fields and multipart framing.
    pub fn request_body_limit(&self) -> usize {
        let ingest = self.ingest();
        ingest
            .max_upload_size_bytes
            .saturating_mul(ingest.max_upload_files)
            .saturating_add(1024 * 1024)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(key = key, value = %raw, "Unparseable configuration value, using default");
            default
        }),
        None => default,
    }
}
