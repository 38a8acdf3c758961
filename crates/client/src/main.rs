//! `schoolhouse` command line client.

use clap::Parser;
use schoolhouse_client::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.quiet, cli.verbose);
    cli::run(cli).await
}
