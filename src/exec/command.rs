// src/exec/command.rs

//! Deadline-bounded, fully captured command execution.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Output of a command that ran to completion (successfully or not).
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CapturedOutput {
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' did not finish within {timeout:?} and was killed")]
    TimedOut { program: String, timeout: Duration },
}

/// Run `cmd` to completion, capturing stdout and stderr in full.
///
/// The child is killed if it is still running after `timeout`.
pub async fn run_captured(mut cmd: Command, timeout: Duration) -> Result<CapturedOutput, CommandError> {
    let program = describe(&cmd);

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let started = Instant::now();
    let child = cmd.spawn().map_err(|source| CommandError::Spawn {
        program: program.clone(),
        source,
    })?;

    // On timeout the `wait_with_output` future is dropped together with the
    // child, and `kill_on_drop` takes the process down.
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => return Err(CommandError::Wait { program, source }),
        Err(_) => return Err(CommandError::TimedOut { program, timeout }),
    };

    debug!(
        cmd = %program,
        exit_code = output.status.code().unwrap_or(-1),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "command finished"
    );

    Ok(CapturedOutput {
        status: output.status,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

/// Program and arguments joined with spaces, for messages.
fn describe(cmd: &Command) -> String {
    let std = cmd.as_std();
    std::iter::once(std.get_program())
        .chain(std.get_args())
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
