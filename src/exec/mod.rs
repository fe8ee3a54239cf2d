// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] runs a command to completion under a deadline and captures
//!   its output; the toolchain uses it for `go list` and `go build`.
//! - [`supervisor`] owns the single long-running server process and restarts
//!   it on every successful build.

pub mod command;
pub mod supervisor;

pub use command::{CapturedOutput, CommandError, run_captured};
pub use supervisor::{RunConfig, Supervisor, SupervisorError};
