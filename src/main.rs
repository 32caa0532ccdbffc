mod auth;
mod cleanup;
mod cli;
mod config;
mod error;
mod event;
mod policy;
mod project_key;
mod providers;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::debug;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    debug!("Starting sonarsweep {}", env!("CARGO_PKG_VERSION"));
    cli.execute().await?;

    Ok(())
}
