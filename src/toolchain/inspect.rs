// src/toolchain/inspect.rs

//! Interpreting `go list -json` results.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::error::ToolchainError;

#[derive(Debug, Clone, Copy)]
enum ListFailure {
    NoModule,
    NoPackage,
}

/// Known `go list` stderr messages, oldest toolchain wording first.
static LIST_FAILURES: LazyLock<Vec<(Regex, ListFailure)>> = LazyLock::new(|| {
    [
        // go: cannot find main module; see 'go help modules'
        (r"cannot find main module", ListFailure::NoModule),
        // go: go.mod file not found in current directory or any parent directory
        (r"go\.mod file not found", ListFailure::NoModule),
        // can't load package: package app: unknown import path "app": cannot find module for path app
        (r"cannot find module for path", ListFailure::NoPackage),
        // no Go files in /tmp/app
        (r"no Go files in", ListFailure::NoPackage),
        // build constraints exclude all Go files in /tmp/app
        (r"build constraints exclude all Go files", ListFailure::NoPackage),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(pattern).expect("static regex is valid"), kind))
    .collect()
});

/// Map a failed `go list` run to the matching inspection error.
pub fn classify_list_failure(dir: &Path, stderr: &str) -> ToolchainError {
    let dir = dir.to_path_buf();
    let known = LIST_FAILURES
        .iter()
        .find(|(re, _)| re.is_match(stderr))
        .map(|(_, kind)| *kind);

    match known {
        Some(ListFailure::NoModule) => ToolchainError::NoModuleDefined { dir },
        Some(ListFailure::NoPackage) => ToolchainError::NoBuildablePackage { dir },
        None => ToolchainError::InspectFailed {
            dir,
            message: format!("go list failed:\n{}", stderr.trim_end()),
        },
    }
}

/// The fields of a `go list -json` package record we care about.
#[derive(Debug, Deserialize)]
struct ListedPackage {
    #[serde(rename = "Name", default)]
    name: String,
}

/// Package name of the first record in `go list -json` output.
pub fn package_name(dir: &Path, stdout: &[u8]) -> Result<String, ToolchainError> {
    let mut records = serde_json::Deserializer::from_slice(stdout).into_iter::<ListedPackage>();

    match records.next() {
        Some(Ok(pkg)) => Ok(pkg.name),
        Some(Err(err)) => Err(ToolchainError::InspectFailed {
            dir: dir.to_path_buf(),
            message: format!("failed to decode `go list -json` output: {err}"),
        }),
        None => Err(ToolchainError::InspectFailed {
            dir: dir.to_path_buf(),
            message: "`go list -json` listed no package".to_string(),
        }),
    }
}
