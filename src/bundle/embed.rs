// src/bundle/embed.rs

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;
use tracing::debug;

use super::{BundleError, Bundler};

/// Build constraint of the generated file: the server embeds the assets, the
/// wasm frontend must not.
pub const EMBED_BUILD_CONSTRAINT: &str = "!wasm";

/// Name of the generated `http.FileSystem` variable.
pub const EMBED_VARIABLE: &str = "assets";

/// Bundle staged in a temporary directory and written out as a Go source file.
///
/// The generated file declares, in `package main`, a read-only virtual
/// filesystem holding the staged tree:
///
/// ```go
/// var assets http.FileSystem
/// ```
///
/// Server code can hand it straight to `http.FileServer(assets)`. Every file
/// keeps its name, size and modification time. A file's contents are stored
/// gzip-compressed when that makes them smaller, raw otherwise. `Open`
/// decompresses transparently.
#[derive(Debug)]
pub struct EmbedBundle {
    staging: Option<TempDir>,
    path: PathBuf,
}

impl EmbedBundle {
    pub fn new() -> Result<Self, BundleError> {
        let staging = tempfile::Builder::new()
            .prefix("bundle_")
            .tempdir()
            .map_err(BundleError::Create)?;
        let path = staging.path().to_path_buf();
        debug!(dir = %path.display(), "bundle created");

        Ok(Self {
            staging: Some(staging),
            path,
        })
    }
}

impl Bundler for EmbedBundle {
    /// The staging directory. Still returns the old path after `clear`.
    fn dir(&self) -> &Path {
        &self.path
    }

    fn write(&self, dest: &Path) -> Result<(), BundleError> {
        let tree = collect_tree(&self.path)?;
        let source = render_go_source(&tree).map_err(|source| BundleError::Write {
            path: dest.to_path_buf(),
            source,
        })?;

        // Overwritten in place: replacing the file would touch the project
        // directory's mtime and retrigger the poller.
        fs::write(dest, source).map_err(|source| BundleError::Write {
            path: dest.to_path_buf(),
            source,
        })?;

        let files = tree.values().filter(|n| matches!(n.kind, NodeKind::File(_))).count();
        debug!(dest = %dest.display(), files, "embed file written");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), BundleError> {
        if let Some(staging) = self.staging.take() {
            staging.close().map_err(BundleError::Clear)?;
        }
        Ok(())
    }
}

/// One entry of the staged tree.
struct Node {
    modified: SystemTime,
    kind: NodeKind,
}

enum NodeKind {
    /// Keys of the children, in lexical order.
    Dir(Vec<String>),
    File(Vec<u8>),
}

/// The staged tree keyed by `/`-rooted path. The root itself is `"/"`.
fn collect_tree(root: &Path) -> Result<BTreeMap<String, Node>, BundleError> {
    let read_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| BundleError::Read { path, source }
    };

    let mut tree = BTreeMap::new();
    let mut stack = vec![(root.to_path_buf(), String::from("/"))];

    while let Some((dir, key)) = stack.pop() {
        let modified = fs::metadata(&dir)
            .and_then(|m| m.modified())
            .map_err(read_err(&dir))?;

        let mut children = Vec::new();
        for entry in fs::read_dir(&dir).map_err(read_err(&dir))? {
            let path = entry.map_err(read_err(&dir))?.path();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let child_key = if key == "/" {
                format!("/{name}")
            } else {
                format!("{key}/{name}")
            };

            if path.is_dir() {
                stack.push((path, child_key.clone()));
            } else {
                let meta = fs::metadata(&path).map_err(read_err(&path))?;
                let data = fs::read(&path).map_err(read_err(&path))?;
                tree.insert(
                    child_key.clone(),
                    Node {
                        modified: meta.modified().map_err(read_err(&path))?,
                        kind: NodeKind::File(data),
                    },
                );
            }
            children.push(child_key);
        }
        children.sort();

        tree.insert(
            key,
            Node {
                modified,
                kind: NodeKind::Dir(children),
            },
        );
    }

    Ok(tree)
}

fn render_go_source(tree: &BTreeMap<String, Node>) -> std::io::Result<String> {
    let mut out = String::new();
    out.push_str("// Code generated by devloop. DO NOT EDIT.\n\n");
    let _ = writeln!(out, "//go:build {EMBED_BUILD_CONSTRAINT}\n");
    out.push_str("package main\n\n");
    out.push_str(GO_IMPORTS);

    let _ = writeln!(out, "// {EMBED_VARIABLE} statically implements the bundled virtual filesystem.");
    let _ = writeln!(out, "var {EMBED_VARIABLE} = func() http.FileSystem {{");
    out.push_str("\tfs := bundleFS{\n");
    for (key, node) in tree {
        let (secs, nanos) = unix_time(node.modified);
        let _ = writeln!(out, "\t\t\"{}\": &{}{{", go_escape(key.as_bytes()), go_type(node));
        // gofmt alignment: file literals have the longer `compressed:` key.
        let pad = if matches!(node.kind, NodeKind::File(_)) { "    " } else { "" };
        let name = go_escape(base_name(key).as_bytes());
        let _ = writeln!(out, "\t\t\tname:    {pad}\"{name}\",");
        let _ = writeln!(out, "\t\t\tmodTime: {pad}time.Unix({secs}, {nanos}),");
        if let NodeKind::File(data) = &node.kind {
            let compressed = gzip(data)?;
            let (stored, is_compressed) = if compressed.len() < data.len() {
                (compressed, true)
            } else {
                (data.clone(), false)
            };
            let _ = writeln!(out, "\t\t\tsize:       {},", data.len());
            let _ = writeln!(out, "\t\t\tcompressed: {is_compressed},");
            let _ = writeln!(out, "\t\t\tcontent:    []byte(\"{}\"),", escape_bytes(&stored));
        }
        out.push_str("\t\t},\n");
    }
    out.push_str("\t}\n");

    for (key, node) in tree {
        let NodeKind::Dir(children) = &node.kind else {
            continue;
        };
        let _ = writeln!(
            out,
            "\tfs[\"{}\"].(*bundleDir).entries = []os.FileInfo{{",
            go_escape(key.as_bytes())
        );
        for child in children {
            let _ = writeln!(out, "\t\tfs[\"{}\"].(os.FileInfo),", go_escape(child.as_bytes()));
        }
        out.push_str("\t}\n");
    }
    out.push_str("\treturn fs\n}()\n\n");

    out.push_str(GO_FILESYSTEM);
    Ok(out)
}

fn go_type(node: &Node) -> &'static str {
    match node.kind {
        NodeKind::Dir(_) => "bundleDir",
        NodeKind::File(_) => "bundleFile",
    }
}

/// Last path segment of a key; the root keeps its name `/`.
fn base_name(key: &str) -> &str {
    match key.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ => key,
    }
}

/// Seconds and nanoseconds since the epoch, as `time.Unix` takes them.
fn unix_time(at: SystemTime) -> (u64, u32) {
    let since = at.duration_since(UNIX_EPOCH).unwrap_or_default();
    (since.as_secs(), since.subsec_nanos())
}

fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Printable ASCII as-is, everything else (and `"` / `\`) as `\xNN`.
fn go_escape(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len());
    for &b in data {
        if (b.is_ascii_graphic() && b != b'"' && b != b'\\') || b == b' ' {
            s.push(b as char);
        } else {
            let _ = write!(s, "\\x{b:02x}");
        }
    }
    s
}

/// Every byte as a `\xNN` escape, valid inside a Go interpreted string literal.
fn escape_bytes(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 4);
    for b in data {
        let _ = write!(s, "\\x{b:02x}");
    }
    s
}

const GO_IMPORTS: &str = r#"import (
	"bytes"
	"compress/gzip"
	"errors"
	"io"
	"net/http"
	"os"
	pathpkg "path"
	"time"
)

"#;

const GO_FILESYSTEM: &str = r#"type bundleFS map[string]interface{}

// Open implements http.FileSystem.
func (fs bundleFS) Open(path string) (http.File, error) {
	path = pathpkg.Clean("/" + path)
	entry, ok := fs[path]
	if !ok {
		return nil, &os.PathError{Op: "open", Path: path, Err: os.ErrNotExist}
	}

	switch entry := entry.(type) {
	case *bundleFile:
		if !entry.compressed {
			return &openFile{info: entry, Reader: bytes.NewReader(entry.content)}, nil
		}
		zr, err := gzip.NewReader(bytes.NewReader(entry.content))
		if err != nil {
			return nil, err
		}
		defer zr.Close()
		data, err := io.ReadAll(zr)
		if err != nil {
			return nil, err
		}
		return &openFile{info: entry, Reader: bytes.NewReader(data)}, nil
	case *bundleDir:
		return &openDir{info: entry}, nil
	default:
		return nil, &os.PathError{Op: "open", Path: path, Err: os.ErrInvalid}
	}
}

type bundleFile struct {
	name       string
	modTime    time.Time
	size       int64
	compressed bool
	content    []byte
}

func (f *bundleFile) Name() string       { return f.name }
func (f *bundleFile) Size() int64        { return f.size }
func (f *bundleFile) Mode() os.FileMode  { return 0444 }
func (f *bundleFile) ModTime() time.Time { return f.modTime }
func (f *bundleFile) IsDir() bool        { return false }
func (f *bundleFile) Sys() interface{}   { return nil }

type bundleDir struct {
	name    string
	modTime time.Time
	entries []os.FileInfo
}

func (d *bundleDir) Name() string       { return d.name }
func (d *bundleDir) Size() int64        { return 0 }
func (d *bundleDir) Mode() os.FileMode  { return 0755 | os.ModeDir }
func (d *bundleDir) ModTime() time.Time { return d.modTime }
func (d *bundleDir) IsDir() bool        { return true }
func (d *bundleDir) Sys() interface{}   { return nil }

type openFile struct {
	info *bundleFile
	*bytes.Reader
}

func (f *openFile) Close() error { return nil }

func (f *openFile) Readdir(count int) ([]os.FileInfo, error) {
	return nil, errors.New("cannot Readdir from file " + f.info.name)
}

func (f *openFile) Stat() (os.FileInfo, error) { return f.info, nil }

type openDir struct {
	info *bundleDir
	pos  int
}

func (d *openDir) Read([]byte) (int, error) {
	return 0, errors.New("cannot Read from directory " + d.info.name)
}

func (d *openDir) Seek(offset int64, whence int) (int64, error) {
	if offset == 0 && whence == io.SeekStart {
		d.pos = 0
		return 0, nil
	}
	return 0, errors.New("unsupported Seek in directory " + d.info.name)
}

func (d *openDir) Close() error { return nil }

func (d *openDir) Stat() (os.FileInfo, error) { return d.info, nil }

func (d *openDir) Readdir(count int) ([]os.FileInfo, error) {
	remaining := len(d.info.entries) - d.pos
	if count > 0 && remaining == 0 {
		return nil, io.EOF
	}
	if count <= 0 || count > remaining {
		count = remaining
	}
	entries := d.info.entries[d.pos : d.pos+count]
	d.pos += count
	return entries, nil
}
"#;
