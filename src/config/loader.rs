// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::ProjectConfig;
use crate::config::validate::{normalize_embed_filename, validate_config};
use crate::errors::Result;

/// Optional per-project config file, looked up in the project directory.
pub const CONFIG_FILENAME: &str = "Devloop.toml";

/// Read and deserialize a config file. Keys it leaves out keep their default.
///
/// This does **not** validate; see [`load_project_config`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ProjectConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: ProjectConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Build the configuration for one cycle.
///
/// - Start from fresh defaults (nothing carries over between cycles).
/// - Overlay `Devloop.toml` from `dir` if it exists.
/// - Validate.
/// - Normalize the embed filename to a root-relative `a/b.go` path and append
///   it to the ignore list, so writing the bundle never looks like a source
///   change.
pub fn load_project_config(dir: &Path) -> Result<ProjectConfig> {
    let path = dir.join(CONFIG_FILENAME);

    let mut config = if path.is_file() {
        debug!(path = %path.display(), "loading project config");
        load_from_path(&path)?
    } else {
        ProjectConfig::default()
    };

    validate_config(&config)?;

    config.embed_filename = normalize_embed_filename(&config.embed_filename)?;
    config.poller.ignore.push(config.embed_filename.clone());
    Ok(config)
}
