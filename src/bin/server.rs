//! Bird sightings HTTP server.
//!
//! Opens (or creates) the SQLite store, seeds example data into an empty
//! store, and serves the REST API.
//!
//! # Environment Variables
//!
//! - `BIRDS_DB_PATH`: SQLite file, or `:memory:` (default: `~/.bird-sightings/birds.sqlite`)
//! - `BIRDS_HOST`: Server host (default: 127.0.0.1)
//! - `BIRDS_PORT`: Server port (default: 8080)
//! - `BIRDS_SEED`: Seed example data into an empty store (default: true)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use log::info;

use bird_sightings::http::{create_router, AppState, API_PREFIX};
use bird_sightings::{Catalog, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()?;
    let catalog = Catalog::open(&config.db_path)?;

    if config.seed && catalog.seed_if_empty(Local::now().naive_local())? {
        info!("Store was empty; example birds and sightings added");
    }

    let app = create_router(AppState::new(Arc::new(catalog)));

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Serving http://{}{}", addr, API_PREFIX);

    axum::serve(listener, app).await?;
    Ok(())
}
