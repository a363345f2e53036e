//! Terminal front-end for the bird sightings service.
//!
//! Talks to the server at `BIRDS_API_URL` (default
//! `http://localhost:8080/api/v1`). Logging is off unless `RUST_LOG` is set,
//! since log lines would paint over the alternate screen.
use anyhow::Context;
use bird_sightings::{run_app, App, BirdApiClient, ClientConfig};
use log::info;

fn main() -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
    }

    let config = ClientConfig::from_env();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to start the request runtime")?;
    let client = BirdApiClient::new(&config).context("failed to build HTTP client")?;
    info!("Using bird service at {}", client.base_url());

    let mut app = App::new(client, runtime.handle().clone());
    run_app(&mut app)
}
