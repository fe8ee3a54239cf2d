// src/watch/scan.rs

//! One pass over the watched tree.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tracing::trace;

use crate::fs::FileSystem;
use crate::watch::patterns::IgnoreSet;

/// A traversal failure. Aborts the scan it happened in, not the poller.
#[derive(Debug, Error)]
#[error("scanning '{}': {source}", .path.display())]
pub struct ScanError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl ScanError {
    fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

/// Walk the tree below `root` depth-first, children in lexical order, and
/// return the modification time of the **first** entry that is strictly newer
/// than `since`.
///
/// The root itself is visited first (as `"."`). Ignored directories are pruned
/// with everything below them, ignored files are skipped. Returns `Ok(None)`
/// when nothing newer exists.
pub fn scan(
    fs: &dyn FileSystem,
    root: &Path,
    since: SystemTime,
    ignore: &IgnoreSet,
) -> Result<Option<SystemTime>, ScanError> {
    let mut stack = vec![(root.to_path_buf(), String::from("."))];

    while let Some((path, rel)) = stack.pop() {
        let meta = fs.metadata(&path).map_err(|e| ScanError::new(&path, e))?;

        if ignore.is_match(&rel) {
            trace!(path = %rel, is_dir = meta.is_dir, "ignored");
            continue;
        }

        if meta.modified > since {
            trace!(path = %rel, "newer entry found");
            return Ok(Some(meta.modified));
        }

        if !meta.is_dir {
            continue;
        }

        let mut children = fs.read_dir(&path).map_err(|e| ScanError::new(&path, e))?;
        // Reverse order on the stack so entries pop in lexical order.
        children.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

        for child in children {
            let name = child
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let child_rel = if rel == "." {
                name
            } else {
                format!("{rel}/{name}")
            };
            stack.push((child, child_rel));
        }
    }

    Ok(None)
}
