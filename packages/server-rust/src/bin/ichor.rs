//! `ichor` server binary.

use clap::Parser;
use ichor_server::config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ichor_server::cmd::run(Cli::parse()).await
}
