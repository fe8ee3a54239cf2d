//! Small Go projects written into a temp dir.

use std::fs;
use std::io;
use std::path::Path;

/// `go.mod` declaring module `name`.
pub fn write_module(dir: &Path, name: &str) -> io::Result<()> {
    fs::write(dir.join("go.mod"), format!("module {name}\n\ngo 1.21\n"))
}

/// A `main` package that only builds for wasm.
pub fn write_frontend_program(dir: &Path) -> io::Result<()> {
    fs::write(
        dir.join("frontend.go"),
        "//go:build wasm\n\npackage main\n\nfunc main() {\n\tprintln(\"frontend\")\n}\n",
    )
}

/// A `main` package that builds for everything but wasm and blocks forever,
/// like a server would.
pub fn write_backend_program(dir: &Path) -> io::Result<()> {
    fs::write(
        dir.join("backend.go"),
        "//go:build !wasm\n\npackage main\n\nfunc main() {\n\tselect {}\n}\n",
    )
}

/// A library package, which has nothing to run.
pub fn write_library(dir: &Path) -> io::Result<()> {
    fs::write(
        dir.join("lib.go"),
        "package lib\n\nfunc Answer() int {\n\treturn 42\n}\n",
    )
}

/// A `main` package that doesn't compile.
pub fn write_broken_program(dir: &Path) -> io::Result<()> {
    fs::write(
        dir.join("broken.go"),
        "package main\n\nfunc main() {\n\tundefinedCall()\n}\n",
    )
}

/// Module with both a frontend and a backend program.
pub fn write_working_project(dir: &Path) -> io::Result<()> {
    write_module(dir, "app")?;
    write_frontend_program(dir)?;
    write_backend_program(dir)
}
