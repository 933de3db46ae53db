mod cli;
mod commands;
mod extract;
mod models;
mod scrapers;

use clap::Parser;
use cli::Cli;
use tracing::{info, Level};
use tracing_subscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🏠 Listing Scout - Airbnb Market Intelligence");
    info!("=============================================");

    let cli = Cli::parse();
    commands::run(cli.command).await
}
