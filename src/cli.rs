// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::parse_duration;

/// Command-line arguments for `devloop`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devloop",
    version,
    about = "Rebuild the wasm frontend, embed it, rebuild and restart the server on every change.",
    long_about = None
)]
pub struct CliArgs {
    /// Project directory to watch and build.
    ///
    /// Default: the current working directory.
    #[arg(long, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// How often the project tree is scanned for changes (e.g. "500ms", "1s").
    #[arg(long, value_name = "DURATION", default_value = "500ms", value_parser = parse_duration)]
    pub poll_interval: Duration,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVLOOP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
