//! kvbench CLI
//!
//! Load generator and consistency checker for Tendermint-style RPC endpoints.

use clap::Parser;

use kvbench::cli::{execute, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    execute(cli).await
}
