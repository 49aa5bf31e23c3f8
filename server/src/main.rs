//! `station-server` entry point.
//!
//! Reads the layered configuration, binds `bind`, and serves until Ctrl+C.

use anyhow::Context;
use station_common::{ConfigLoader, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already carry the token.
    let _ = dotenvy::dotenv();
    logging::init("info");

    tracing::info!("station-server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ConfigLoader::new().load().context("loading configuration")?;
    let (listener, state) = station_server::bind(&config, &config.bind).await?;
    station_server::serve(listener, state, station_server::shutdown_signal()).await?;

    tracing::info!("station-server exiting cleanly");
    Ok(())
}
