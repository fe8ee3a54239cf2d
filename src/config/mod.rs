// src/config/mod.rs

//! Per-project configuration.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Parse human duration strings (`duration.rs`).
//! - Load `Devloop.toml` on top of the defaults (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{CONFIG_FILENAME, load_from_path, load_project_config};
pub use model::ProjectConfig;
pub use validate::validate_config;
