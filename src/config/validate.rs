// src/config/validate.rs

use crate::config::model::ProjectConfig;
use crate::errors::{DevloopError, Result};
use crate::watch::IgnoreSet;

/// Check the invariants serde can't express.
pub fn validate_config(cfg: &ProjectConfig) -> Result<()> {
    validate_timeouts(cfg)?;
    validate_filenames(cfg)?;
    validate_ignore(cfg)?;
    validate_runner(cfg)?;
    Ok(())
}

fn validate_timeouts(cfg: &ProjectConfig) -> Result<()> {
    if cfg.max_wasm_build_time.is_zero() {
        return Err(DevloopError::ConfigError(
            "max_wasm_build_time must be greater than zero".to_string(),
        ));
    }
    if cfg.max_serve_build_time.is_zero() {
        return Err(DevloopError::ConfigError(
            "max_serve_build_time must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_filenames(cfg: &ProjectConfig) -> Result<()> {
    normalize_embed_filename(&cfg.embed_filename)?;
    if cfg.wasm_filename.trim().is_empty() {
        return Err(DevloopError::ConfigError(
            "wasm_filename must not be empty".to_string(),
        ));
    }
    if cfg.wasm_filename.contains(['/', '\\']) {
        return Err(DevloopError::ConfigError(format!(
            "wasm_filename must be a plain file name (got '{}')",
            cfg.wasm_filename
        )));
    }
    Ok(())
}

fn validate_ignore(cfg: &ProjectConfig) -> Result<()> {
    IgnoreSet::from_config(&cfg.poller)
        .map_err(|e| DevloopError::ConfigError(format!("[poller].ignore: {e:#}")))?;
    Ok(())
}

fn validate_runner(cfg: &ProjectConfig) -> Result<()> {
    for entry in &cfg.runner.env {
        match entry.split_once('=') {
            Some((key, _)) if !key.is_empty() => {}
            _ => {
                return Err(DevloopError::ConfigError(format!(
                    "[runner].env entry '{entry}' must look like KEY=VALUE"
                )));
            }
        }
    }
    Ok(())
}

/// The embed filename as a `/`-separated path relative to the project root,
/// the same shape the poller matches ignore patterns against.
///
/// `.` components and empty segments are dropped. Absolute paths and `..`
/// components are rejected: the file must live inside the watched tree.
pub fn normalize_embed_filename(name: &str) -> Result<String> {
    if name.starts_with(['/', '\\']) {
        return Err(DevloopError::ConfigError(format!(
            "embed_filename must be relative to the project dir (got '{name}')"
        )));
    }

    let mut parts = Vec::new();
    for part in name.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                return Err(DevloopError::ConfigError(format!(
                    "embed_filename must not contain '..' (got '{name}')"
                )));
            }
            part => parts.push(part),
        }
    }

    if parts.is_empty() {
        return Err(DevloopError::ConfigError(
            "embed_filename must not be empty".to_string(),
        ));
    }
    Ok(parts.join("/"))
}
