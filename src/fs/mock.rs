// src/fs/mock.rs

use super::{EntryMeta, FileSystem};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

#[derive(Debug, Clone)]
enum MockEntry {
    File,
    Dir(Vec<String>), // child names, in insertion order
}

#[derive(Debug, Clone)]
struct MockNode {
    entry: MockEntry,
    modified: SystemTime,
}

/// In-memory filesystem with explicit modification times.
///
/// The root is `"."`; paths passed in should be relative to it, e.g.
/// `"./src/main.go"`. Parent directories are created implicitly with a
/// modification time of `UNIX_EPOCH`. `read_dir` returns children in insertion
/// order, not sorted.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    nodes: Arc<Mutex<HashMap<PathBuf, MockNode>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            PathBuf::from("."),
            MockNode {
                entry: MockEntry::Dir(Vec::new()),
                modified: SystemTime::UNIX_EPOCH,
            },
        );

        Self {
            nodes: Arc::new(Mutex::new(nodes)),
        }
    }

    /// Add (or replace) a file with the given modification time.
    pub fn add_file(&self, path: impl AsRef<Path>, modified: SystemTime) {
        self.insert(path.as_ref(), MockEntry::File, modified);
    }

    /// Add a directory with the given modification time. Existing children are
    /// kept when the directory already exists.
    pub fn add_dir(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let path = path.as_ref();
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(node) = nodes.get_mut(path) {
            node.modified = modified;
            return;
        }
        drop(nodes);
        self.insert(path, MockEntry::Dir(Vec::new()), modified);
    }

    /// Set the modification time of an existing entry.
    pub fn touch(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(node) = nodes.get_mut(path.as_ref()) {
            node.modified = modified;
        }
    }

    fn insert(&self, path: &Path, entry: MockEntry, modified: SystemTime) {
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(parent) = path.parent() {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            Self::ensure_dir(&mut nodes, parent);
            Self::link_child(&mut nodes, parent, path);
        }
        nodes.insert(path.to_path_buf(), MockNode { entry, modified });
    }

    fn ensure_dir(nodes: &mut HashMap<PathBuf, MockNode>, path: &Path) {
        if nodes.contains_key(path) {
            return;
        }
        nodes.insert(
            path.to_path_buf(),
            MockNode {
                entry: MockEntry::Dir(Vec::new()),
                modified: SystemTime::UNIX_EPOCH,
            },
        );
        if let Some(parent) = path.parent() {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            if parent != path {
                Self::ensure_dir(nodes, parent);
                Self::link_child(nodes, parent, path);
            }
        }
    }

    fn link_child(nodes: &mut HashMap<PathBuf, MockNode>, parent: &Path, child: &Path) {
        let Some(name) = child.file_name().and_then(|n| n.to_str()) else {
            return;
        };
        if let Some(MockNode {
            entry: MockEntry::Dir(children),
            ..
        }) = nodes.get_mut(parent)
        {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn metadata(&self, path: &Path) -> io::Result<EntryMeta> {
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(path) {
            Some(node) => Ok(EntryMeta {
                is_dir: matches!(node.entry, MockEntry::Dir(_)),
                modified: node.modified,
            }),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file or directory: {:?}", path),
            )),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(path) {
            Some(MockNode {
                entry: MockEntry::Dir(children),
                ..
            }) => Ok(children.iter().map(|name| path.join(name)).collect()),
            Some(_) => Err(io::Error::other(format!("not a directory: {:?}", path))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file or directory: {:?}", path),
            )),
        }
    }
}
