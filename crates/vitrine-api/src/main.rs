use vitrine_core::Config;

// Use mimalloc as the global allocator
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    // Initialize the application (database, storage, pipeline, routes)
    let (_state, router) = vitrine_api::setup::initialize_app(config.clone()).await?;

    vitrine_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
