// src/exec/supervisor.rs

//! Keeps exactly one built server binary running.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::debug;

/// How the built binary is started, `[runner]` in `Devloop.toml`.
///
/// ```toml
/// [runner]
/// args = ["-addr", ":8080"]
/// env = ["APP_ENV=dev"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Arguments passed to the binary.
    pub args: Vec<String>,

    /// `KEY=VALUE` entries added on top of the inherited environment.
    pub env: Vec<String>,
}

impl RunConfig {
    /// The `env` entries split into key/value pairs. Entries without `=` are
    /// skipped (config validation rejects them up front).
    pub fn env_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env.iter().filter_map(|entry| entry.split_once('='))
    }
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to kill process {}: {source}", .pid.map_or_else(|| "?".to_string(), |p| p.to_string()))]
    KillFailed {
        pid: Option<u32>,
        #[source]
        source: io::Error,
    },

    #[error("failed to start process '{}': {source}", .binary.display())]
    RunStartFailed {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Owns the (at most one) running server process.
///
/// There is no way to get at the child handle: it is only ever replaced by
/// [`Supervisor::run`] or removed by [`Supervisor::kill`], so two instances
/// can never be alive at the same time.
#[derive(Debug, Default)]
pub struct Supervisor {
    child: Option<Child>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self { child: None }
    }

    /// OS process id of the running child, if any.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.id())
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Kill the running process and wait for it to exit. No-op when nothing
    /// is running.
    ///
    /// If the kill signal cannot be delivered the handle is kept.
    pub async fn kill(&mut self) -> Result<(), SupervisorError> {
        let Some(child) = self.child.as_mut() else {
            return Ok(());
        };

        let pid = child.id();
        child
            .start_kill()
            .map_err(|source| SupervisorError::KillFailed { pid, source })?;

        // Exit status is irrelevant, only that the process is gone.
        let status = child.wait().await;
        debug!(?pid, ?status, "supervised process exited");

        self.child = None;
        debug!(?pid, "stopped supervised process");
        Ok(())
    }

    /// Stop the current process (if any) and start `binary` with `cfg`.
    ///
    /// stderr of the new process goes straight to ours; stdout is logged at
    /// debug level.
    pub async fn run(&mut self, binary: &Path, cfg: &RunConfig) -> Result<(), SupervisorError> {
        self.kill().await?;

        let mut cmd = Command::new(binary);
        cmd.args(&cfg.args)
            .envs(cfg.env_pairs())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| SupervisorError::RunStartFailed {
            binary: binary.to_path_buf(),
            source,
        })?;

        let pid = child.id();
        if let Some(stdout) = child.stdout.take() {
            spawn_stdout_logger(pid, stdout);
        }

        debug!(?pid, binary = %binary.display(), args = ?cfg.args, "started supervised process");
        self.child = Some(child);
        Ok(())
    }
}

/// Consume stdout so the pipe never fills up; log lines at debug.
fn spawn_stdout_logger(pid: Option<u32>, stdout: ChildStdout) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(?pid, "stdout: {}", line);
        }
        debug!(?pid, "stdout closed");
    });
}
