// src/lib.rs

pub mod bundle;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod toolchain;
pub mod ui;
pub mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::engine::Project;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - project directory resolution
/// - Ctrl-C handling (flips the shared shutdown signal)
/// - the development loop itself
pub async fn run(args: CliArgs) -> Result<()> {
    let dir = project_dir(args.dir)?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    // Ctrl-C → graceful shutdown.
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C; interrupt will not stop the loop gracefully");
            // Keep the sender alive, dropping it would stop the poller.
            std::future::pending::<()>().await;
        }
        info!("interrupt received; shutting down");
        let _ = shutdown_tx.send(true);
    });

    info!(dir = %dir.display(), poll_interval = ?args.poll_interval, "starting development loop");

    let mut project = Project::new(dir, args.poll_interval);
    project
        .run(shutdown_rx)
        .await
        .context("failed to run development server")
}

/// The directory passed on the command line, or the current working directory.
fn project_dir(arg: Option<PathBuf>) -> Result<PathBuf> {
    match arg {
        Some(dir) => dir
            .canonicalize()
            .with_context(|| format!("resolving project dir {:?}", dir)),
        None => std::env::current_dir().context("failed to get working dir"),
    }
}
