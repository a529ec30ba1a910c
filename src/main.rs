mod cli;
mod config;
mod error;
mod logging;
mod model;
mod providers;
mod server;
mod sync;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    cli::run(cli).await
}
