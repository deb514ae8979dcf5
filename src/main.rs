mod analysis;
mod auth;
mod cli;
mod config;
mod error;
mod providers;
mod report;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting ArgoLens - Argo CD Delivery Metrics Tool");
    cli.execute().await?;

    Ok(())
}
