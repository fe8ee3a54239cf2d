// src/toolchain/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Why a directory has nothing to build for a given target.
///
/// Produced while inspecting a directory, before any build is attempted. The
/// engine treats every variant as "skip this phase"; none of them end the
/// development loop.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("couldn't find '{0}' executable in PATH")]
    ToolNotFound(String),

    #[error("inspecting '{}': no module defined, make sure you've added a go.mod file", .dir.display())]
    NoModuleDefined { dir: PathBuf },

    #[error("inspecting '{}': no Go package defined in any Go files, or no Go files at all", .dir.display())]
    NoBuildablePackage { dir: PathBuf },

    #[error("no program to build in '{}': package '{package}' is not 'main'", .dir.display())]
    NotAProgram { dir: PathBuf, package: String },

    #[error("inspecting '{}': {message}", .dir.display())]
    InspectFailed { dir: PathBuf, message: String },
}

/// A validly inspected program failed to build.
///
/// `message` holds the compiler's complete diagnostic output (or the reason the
/// compiler could not be run to completion).
#[derive(Debug, Error)]
#[error("failed to build '{}':\n{message}", .dir.display())]
pub struct BuildError {
    pub dir: PathBuf,
    pub message: String,
}
