//! Database setup and initialization

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use vitrine_core::Config;
use vitrine_db::{InMemoryProductRepository, PgProductRepository, ProductRepository};

/// Select the product repository. Without `DATABASE_URL` products live in
/// memory; otherwise connect, run migrations and return the pool as well.
pub async fn setup_database(
    config: &Config,
) -> Result<(Arc<dyn ProductRepository>, Option<PgPool>)> {
    let Some(database_url) = config.database_url() else {
        tracing::warn!("DATABASE_URL not set, products are kept in memory and lost on restart");
        return Ok((Arc::new(InMemoryProductRepository::new()), None));
    };

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    // Run pending migrations on startup (path: workspace migrations/ from crate root)
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok((Arc::new(PgProductRepository::new(pool.clone())), Some(pool)))
}
