//! `station serve`: run the passthrough server in the foreground.

use anyhow::Context;
use clap::Parser;
use station_common::StationConfig;

#[derive(Debug, Parser)]
pub struct ServeArgs {
    /// Address to listen on, overriding `bind` from the config.
    #[arg(long = "bind", value_name = "ADDR")]
    pub bind: Option<String>,
}

pub(crate) async fn run(args: ServeArgs, config: &StationConfig) -> anyhow::Result<()> {
    let bind = args.bind.unwrap_or_else(|| config.bind.clone());
    let (listener, state) = station_server::bind(config, &bind).await?;
    eprintln!("Serving on http://{}", listener.local_addr()?);

    station_server::serve(listener, state, station_server::shutdown_signal())
        .await
        .context("server stopped with an error")
}
