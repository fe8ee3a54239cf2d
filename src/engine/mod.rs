// src/engine/mod.rs

//! Orchestration engine for devloop.
//!
//! This module ties together:
//! - the poller (when to rebuild)
//! - the toolchain (frontend and backend builds)
//! - the bundler (embedding the frontend into the backend)
//! - the supervisor (restarting the server)
//!
//! A single pass is implemented in [`cycle`]; the long-running loop around it
//! in [`project`].

pub mod cycle;
pub mod project;

pub use cycle::{BundlerFactory, build_and_run};
pub use project::Project;
