// src/errors.rs

//! Crate-wide error type for a development cycle.
//!
//! Every variant here is a hard stop: it ends the whole loop. Inspection
//! outcomes ([`crate::toolchain::ToolchainError`]) deliberately have no
//! conversion into [`DevloopError`]; the engine turns them into a skip.

use thiserror::Error;

use crate::bundle::BundleError;
use crate::exec::SupervisorError;
use crate::toolchain::BuildError;

#[derive(Error, Debug)]
pub enum DevloopError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("failed to bundle: {0}")]
    Bundle(#[from] BundleError),

    #[error("failed to build frontend: {0}")]
    Frontend(#[source] BuildError),

    #[error("failed to build backend: {0}")]
    Backend(#[source] BuildError),

    #[error("failed to run: {0}")]
    Run(#[from] SupervisorError),
}

pub type Result<T> = std::result::Result<T, DevloopError>;
