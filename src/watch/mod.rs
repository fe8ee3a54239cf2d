// src/watch/mod.rs

//! Change detection by polling.
//!
//! This module is responsible for:
//! - Compiling the ignore patterns of a [`WatchConfig`].
//! - Scanning the project tree for the first entry newer than a cursor.
//! - Running that scan on an interval in a background task ([`Poller`]).
//!
//! It knows nothing about building; it only turns modification times into
//! change signals.

pub mod patterns;
pub mod poller;
pub mod scan;

pub use patterns::{IgnoreSet, WatchConfig};
pub use poller::{PollSignal, Poller};
pub use scan::{ScanError, scan};
