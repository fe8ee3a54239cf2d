// src/bundle/mod.rs

//! Static asset bundling.
//!
//! A bundle is a staging directory that frontend artifacts are built into,
//! then turned into a single Go source file the server embeds.
//!
//! - [`Bundler`] is the interface the engine drives: `dir` → build into it →
//!   `write` → `clear`.
//! - [`embed::EmbedBundle`] is the production implementation.

pub mod embed;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use embed::EmbedBundle;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to create bundle dir: {0}")]
    Create(#[source] io::Error),

    #[error("failed to read staged asset '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write embed file '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove bundle dir: {0}")]
    Clear(#[source] io::Error),
}

/// A staging area for frontend artifacts that can be materialized into one
/// embeddable module.
pub trait Bundler: Send {
    /// Directory artifacts should be placed in.
    fn dir(&self) -> &Path;

    /// Write everything currently staged as a single embeddable file at `dest`.
    fn write(&self, dest: &Path) -> Result<(), BundleError>;

    /// Remove the staging directory and everything in it.
    fn clear(&mut self) -> Result<(), BundleError>;
}
