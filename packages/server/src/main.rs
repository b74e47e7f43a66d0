use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{Level, info};

use catalog_server::config::AppConfig;
use catalog_server::database::init_db;
use catalog_server::state::AppState;
use common::storage::filesystem::FilesystemImageStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to initialize database")?;

    let images = FilesystemImageStore::new(
        config.storage.web_root.clone(),
        config.storage.max_image_size,
    )
    .await
    .context("Failed to prepare image directory")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        images: Arc::new(images),
        config,
    };
    let app = catalog_server::build_router(state);

    info!("Catalog server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
