//! seograph CLI: schema graph rendering and indexable cache maintenance.
//!
//! Renders structured-data graphs from page contexts and saves indexables
//! through the ancestor-aware save flow.

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
