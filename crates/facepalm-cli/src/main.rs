//! Facepalm CLI - drives the mock backend, availability channel and session bridge

use anyhow::Result;
use clap::Parser as _;
use cli::Cli;

mod cli;
mod handlers;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    handlers::init_logging(cli.verbose);
    handlers::run(cli).await
}
