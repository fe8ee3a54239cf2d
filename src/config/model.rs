// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::exec::RunConfig;
use crate::watch::WatchConfig;

/// Project configuration, optionally read from `Devloop.toml` in the project
/// directory:
///
/// ```toml
/// embed_filename = "bundle.go"
/// wasm_filename = "main.wasm"
/// max_wasm_build_time = "5s"
/// max_serve_build_time = "30s"
///
/// [poller]
/// ignore = ["node_modules", "*.log"]
///
/// [runner]
/// args = ["-addr", ":8080"]
/// env = ["APP_ENV=dev"]
/// ```
///
/// Every key is optional; missing keys keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Generated Go file holding the bundled frontend, relative to the
    /// project directory.
    pub embed_filename: String,

    /// Name of the wasm artifact inside the bundle.
    pub wasm_filename: String,

    /// Upper bound for the frontend build.
    #[serde(deserialize_with = "super::duration::deserialize")]
    pub max_wasm_build_time: Duration,

    /// Upper bound for the backend build.
    #[serde(deserialize_with = "super::duration::deserialize")]
    pub max_serve_build_time: Duration,

    pub poller: WatchConfig,

    pub runner: RunConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            embed_filename: "bundle.go".to_string(),
            wasm_filename: "main.wasm".to_string(),
            max_wasm_build_time: Duration::from_secs(5),
            max_serve_build_time: Duration::from_secs(30),
            poller: WatchConfig::default(),
            runner: RunConfig::default(),
        }
    }
}
