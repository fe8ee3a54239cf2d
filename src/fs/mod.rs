// src/fs/mod.rs

//! Filesystem seam for the poller's tree scan.
//!
//! The scan only needs two things from the filesystem: entry metadata
//! (directory or not, modification time) and directory listings. Keeping that
//! behind a trait lets the traversal rules be tested against
//! [`mock::MockFileSystem`] with explicit timestamps.

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub mod mock;

/// The subset of metadata the scan looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub is_dir: bool,
    pub modified: SystemTime,
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Metadata for `path`. Symlinks are not followed.
    fn metadata(&self, path: &Path) -> io::Result<EntryMeta>;

    /// Return a list of entries in a directory.
    /// Returns full paths, in no particular order.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn metadata(&self, path: &Path) -> io::Result<EntryMeta> {
        let md = fs::symlink_metadata(path)?;
        Ok(EntryMeta {
            is_dir: md.is_dir(),
            modified: md.modified()?,
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            entries.push(entry.path());
        }
        Ok(entries)
    }
}
