//! Schoolhouse directory HTTP service binary.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use salvo::prelude::*;
use schoolhouse_server::config::Config;
use schoolhouse_server::logging::{Verbosity, init_logging};
use schoolhouse_server::storage::Database;
use schoolhouse_server::{AppState, blob, route};

/// Schoolhouse directory HTTP service.
#[derive(Debug, Parser)]
#[command(name = "schoolhouse-server", version, about)]
struct Args {
    /// Configuration file (defaults to ./schoolhouse.toml).
    #[arg(short, long, env = "SCHOOLHOUSE_CONFIG")]
    config: Option<PathBuf>,

    /// More logging, repeat for trace output.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(Verbosity::from_flags(args.quiet, args.verbose));

    let config = Config::load_from(args.config.as_deref())?;
    tracing::debug!(backend = ?config.blob.backend(), database = %config.database.url, "configuration loaded");

    let db = Database::connect(&config.database)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;
    db.migrate().await.context("failed to create schools table")?;

    let blobs = blob::from_config(&config.blob)?;
    tracing::info!(store = blobs.kind(), "image store ready");

    let state = AppState {
        db,
        blobs,
        max_upload_size: config.server.max_upload_size,
    };

    tracing::info!(addr = %config.server.listen_addr, "listening");
    let acceptor = TcpListener::new(config.server.listen_addr.clone()).bind().await;
    Server::new(acceptor).serve(route(state)).await;
    Ok(())
}
