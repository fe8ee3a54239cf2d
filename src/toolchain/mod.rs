// src/toolchain/mod.rs

//! Wrapper around the external `go` toolchain.
//!
//! A [`Toolchain`] only exists for a directory that inspection found to hold a
//! buildable `main` package for its [`BuildTarget`]. Constructing one either
//! yields that, or a [`ToolchainError`] describing why there is nothing to
//! build. A failing [`Toolchain::build`] afterwards is a different kind of
//! failure ([`BuildError`]) and is never treated as "nothing to build".

pub mod error;
pub mod inspect;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::debug;

use crate::exec::run_captured;

pub use error::{BuildError, ToolchainError};

/// Executable looked up on `PATH`.
pub const GO_EXECUTABLE: &str = "go";

/// Upper bound for `go list` during inspection.
pub const INSPECT_TIMEOUT: Duration = Duration::from_secs(5);

/// What to build and for which platform.
///
/// Empty `os` / `arch` mean "host default"; non-empty values are passed to the
/// toolchain as `GOOS` / `GOARCH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub dir: PathBuf,
    pub os: String,
    pub arch: String,
}

impl BuildTarget {
    /// Build for the machine we're running on.
    pub fn host(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            os: String::new(),
            arch: String::new(),
        }
    }

    /// Build for the browser (`GOOS=js GOARCH=wasm`).
    pub fn wasm(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            os: "js".to_string(),
            arch: "wasm".to_string(),
        }
    }
}

/// A directory known to contain a buildable program for one target.
#[derive(Debug)]
pub struct Toolchain {
    exe: PathBuf,
    target: BuildTarget,
}

impl Toolchain {
    /// Inspect `target.dir` using `go` from `PATH`.
    pub async fn new(target: BuildTarget) -> Result<Self, ToolchainError> {
        Self::with_executable(GO_EXECUTABLE, target).await
    }

    /// Inspect `target.dir` using the named executable.
    pub async fn with_executable(
        name: impl AsRef<OsStr>,
        target: BuildTarget,
    ) -> Result<Self, ToolchainError> {
        let name = name.as_ref();
        let exe = which::which(name)
            .map_err(|_| ToolchainError::ToolNotFound(name.to_string_lossy().into_owned()))?;

        let toolchain = Self { exe, target };
        let package = toolchain.inspect(INSPECT_TIMEOUT).await?;
        if package != "main" {
            return Err(ToolchainError::NotAProgram {
                dir: toolchain.target.dir.clone(),
                package,
            });
        }

        debug!(
            dir = %toolchain.target.dir.display(),
            target_os = %toolchain.target.os,
            target_arch = %toolchain.target.arch,
            "found buildable program"
        );
        Ok(toolchain)
    }

    /// Compile the program into `output`, giving up after `timeout`.
    pub async fn build(&self, output: &Path, timeout: Duration) -> Result<(), BuildError> {
        let dir = &self.target.dir;
        let started = Instant::now();

        let mut cmd = self.command();
        cmd.arg("build").arg("-o").arg(output);

        let captured = run_captured(cmd, timeout).await.map_err(|e| BuildError {
            dir: dir.clone(),
            message: e.to_string(),
        })?;

        if !captured.status.success() {
            return Err(BuildError {
                dir: dir.clone(),
                message: captured.stderr_lossy(),
            });
        }

        debug!(
            dir = %dir.display(),
            output = %output.display(),
            target_os = %self.target.os,
            target_arch = %self.target.arch,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "build finished"
        );
        Ok(())
    }

    /// List the package in the target directory and return its name.
    async fn inspect(&self, timeout: Duration) -> Result<String, ToolchainError> {
        let dir = &self.target.dir;

        let mut cmd = self.command();
        cmd.args(["list", "-json"]);

        let captured = run_captured(cmd, timeout)
            .await
            .map_err(|e| ToolchainError::InspectFailed {
                dir: dir.clone(),
                message: e.to_string(),
            })?;

        if !captured.status.success() {
            return Err(inspect::classify_list_failure(dir, &captured.stderr_lossy()));
        }

        inspect::package_name(dir, &captured.stdout)
    }

    /// A `go` invocation in the target dir with the target's platform applied
    /// on top of the inherited environment.
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.exe);
        cmd.current_dir(&self.target.dir);
        if !self.target.os.is_empty() {
            cmd.env("GOOS", &self.target.os);
        }
        if !self.target.arch.is_empty() {
            cmd.env("GOARCH", &self.target.arch);
        }
        cmd
    }
}
