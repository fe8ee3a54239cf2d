// src/engine/cycle.rs

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::bundle::{BundleError, Bundler};
use crate::config::{ProjectConfig, load_project_config};
use crate::errors::{DevloopError, Result};
use crate::exec::{RunConfig, Supervisor};
use crate::toolchain::{BuildTarget, Toolchain};
use crate::ui::Ui;
use crate::watch::Poller;

/// Creates the staging bundle for one cycle.
pub type BundlerFactory =
    Box<dyn Fn() -> std::result::Result<Box<dyn Bundler>, BundleError> + Send + Sync>;

/// One full cycle: reload config, build and embed the frontend, build the
/// backend, restart the server.
///
/// A phase with nothing to build (no module, no `main` package, no `go`) is
/// skipped. Every other failure ends the cycle with an error.
///
/// Returns the path of the binary that is now running, if a backend was built.
pub async fn build_and_run(
    ui: &mut dyn Ui,
    dir: &Path,
    new_bundle: &BundlerFactory,
    supervisor: &mut Supervisor,
    poller: &Poller,
) -> Result<Option<PathBuf>> {
    ui.rebuild_started();

    let cfg = load_project_config(dir)?;
    poller.update(cfg.poller.clone());
    ui.config_loaded();

    let mut bundle = new_bundle()?;
    ui.bundle_created();

    let bundled = bundle_frontend(ui, dir, &cfg, bundle.as_mut()).await;
    if let Err(err) = bundle.clear() {
        warn!(error = %err, dir = %bundle.dir().display(), "failed to clear bundle");
    }
    bundled?;
    ui.bundling_done();

    let binary = build_backend(dir, &cfg).await?;
    ui.building_done();

    if let Some(binary) = &binary {
        run_backend(supervisor, binary, &cfg.runner).await?;
        ui.running_done();
    }

    ui.rebuild_done();
    Ok(binary)
}

/// Build the wasm frontend into the bundle (if there is one) and write the
/// embed file either way.
async fn bundle_frontend(
    ui: &mut dyn Ui,
    dir: &Path,
    cfg: &ProjectConfig,
    bundle: &mut dyn Bundler,
) -> Result<()> {
    match Toolchain::new(BuildTarget::wasm(dir)).await {
        Ok(toolchain) => {
            let output = bundle.dir().join(&cfg.wasm_filename);
            toolchain
                .build(&output, cfg.max_wasm_build_time)
                .await
                .map_err(DevloopError::Frontend)?;
            ui.frontend_staged();
        }
        Err(reason) => {
            debug!(dir = %dir.display(), %reason, "no frontend to build; skipping");
        }
    }

    bundle.write(&dir.join(&cfg.embed_filename))?;
    ui.embed_file_written();
    Ok(())
}

/// Build the server binary into the temp dir. `None` if there is nothing to
/// build.
async fn build_backend(dir: &Path, cfg: &ProjectConfig) -> Result<Option<PathBuf>> {
    let toolchain = match Toolchain::new(BuildTarget::host(dir)).await {
        Ok(toolchain) => toolchain,
        Err(reason) => {
            debug!(dir = %dir.display(), %reason, "no backend to build; skipping");
            return Ok(None);
        }
    };

    let output = backend_output_path();
    toolchain
        .build(&output, cfg.max_serve_build_time)
        .await
        .map_err(DevloopError::Backend)?;

    debug!(binary = %output.display(), "backend built");
    Ok(Some(output))
}

/// Start the freshly built server. The binary is deleted if it cannot be
/// started, since nothing else will ever own it.
pub(crate) async fn run_backend(
    supervisor: &mut Supervisor,
    binary: &Path,
    cfg: &RunConfig,
) -> Result<()> {
    if let Err(err) = supervisor.run(binary, cfg).await {
        remove_binary(binary);
        return Err(err.into());
    }
    Ok(())
}

/// Best-effort removal of a server binary.
pub(crate) fn remove_binary(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        debug!(binary = %path.display(), error = %err, "failed to remove binary");
    }
}

/// A fresh `serve_<nanos>` path in the system temp dir.
fn backend_output_path() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("serve_{nanos}{}", std::env::consts::EXE_SUFFIX))
}
