//! Sheetcast CLI — query an external data source into sheet artifacts.
//!
//! Runs the full query-to-artifact transaction against configured endpoints
//! and inspects CSV documents as bounded grids.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
