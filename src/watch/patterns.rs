// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;

/// Poller configuration, `[poller]` in `Devloop.toml`.
///
/// ```toml
/// [poller]
/// ignore = ["node_modules", "*.log", "web/dist"]
/// ```
///
/// A pushed config replaces the previous one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Patterns matched against the path relative to the watch root. A match
    /// on a directory ignores everything below it.
    pub ignore: Vec<String>,
}

/// Compiled ignore patterns.
///
/// Each pattern must match the *whole* root-relative path (forward slashes,
/// the root itself is `"."`), and `*` / `?` never match a `/`. So `"x/y"`
/// only matches the entry `x/y`, and `"*.log"` only matches logs at the top
/// level.
#[derive(Clone)]
pub struct IgnoreSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for IgnoreSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreSet")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }
}

impl IgnoreSet {
    pub fn new(patterns: &[String]) -> Result<Self> {
        Ok(Self {
            patterns: patterns.to_vec(),
            set: build_globset(patterns)?,
        })
    }

    pub fn from_config(cfg: &WatchConfig) -> Result<Self> {
        Self::new(&cfg.ignore)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns true if the entry at `rel_path` (relative to the watch root,
    /// e.g. `"web/main.go"`) should be left out of the scan.
    pub fn is_match(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid ignore pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
