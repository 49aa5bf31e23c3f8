use clap::Parser;
use station_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already carry the token.
    let _ = dotenvy::dotenv();
    station_common::logging::init("warn");

    station_cli::run(Cli::parse()).await
}
