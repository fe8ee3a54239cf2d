// src/engine/project.rs

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bundle::{BundleError, Bundler, EmbedBundle};
use crate::engine::cycle::{BundlerFactory, build_and_run, remove_binary};
use crate::errors::Result;
use crate::exec::Supervisor;
use crate::ui::{TerseTerminal, Ui};
use crate::watch::Poller;

/// A project directory under development.
///
/// Owns the server process across cycles. [`Project::run`] performs an
/// initial cycle, then one more for every change the poller reports, until
/// shutdown or the first error.
pub struct Project {
    dir: PathBuf,
    poll_interval: Duration,
    new_bundle: BundlerFactory,
    supervisor: Supervisor,
    running_binary: Option<PathBuf>,
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("dir", &self.dir)
            .field("poll_interval", &self.poll_interval)
            .field("supervisor", &self.supervisor)
            .field("running_binary", &self.running_binary)
            .finish_non_exhaustive()
    }
}

impl Project {
    pub fn new(dir: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            poll_interval,
            new_bundle: Box::new(new_embed_bundle),
            supervisor: Supervisor::new(),
            running_binary: None,
        }
    }

    /// Replace the bundle used for each cycle.
    pub fn with_bundler<F>(mut self, new_bundle: F) -> Self
    where
        F: Fn() -> std::result::Result<Box<dyn Bundler>, BundleError> + Send + Sync + 'static,
    {
        self.new_bundle = Box::new(new_bundle);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Run the development loop, reporting progress on stderr.
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut ui = TerseTerminal::new(io::stderr());
        self.run_with_ui(&mut ui, shutdown).await
    }

    /// Run the development loop until `shutdown` flips or a cycle fails.
    ///
    /// The server is stopped before returning, in both cases.
    pub async fn run_with_ui(
        &mut self,
        ui: &mut dyn Ui,
        shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut poller = Poller::spawn(&self.dir, self.poll_interval, shutdown);

        let result = self.watch_loop(ui, &mut poller).await;
        drop(poller);

        let stopped = self.stop().await;
        result.and(stopped)
    }

    /// Run a single cycle against an already running poller.
    pub async fn build_and_run(&mut self, ui: &mut dyn Ui, poller: &Poller) -> Result<()> {
        let binary = build_and_run(
            ui,
            &self.dir,
            &self.new_bundle,
            &mut self.supervisor,
            poller,
        )
        .await?;

        if let Some(binary) = binary {
            // The previous binary's process is gone by now.
            if let Some(previous) = self.running_binary.replace(binary) {
                remove_binary(&previous);
            }
        }
        Ok(())
    }

    async fn watch_loop(&mut self, ui: &mut dyn Ui, poller: &mut Poller) -> Result<()> {
        self.build_and_run(ui, poller).await?;

        while poller.next().await {
            if let Some(err) = poller.err() {
                warn!(error = %err, "watching failed; rebuilding anyway");
            } else {
                debug!(at = ?poller.last_change(), "change detected");
            }
            self.build_and_run(ui, poller).await?;
        }

        info!(dir = %self.dir.display(), "stopped watching");
        Ok(())
    }

    /// Kill the server and remove its binary. No-op when nothing is running.
    pub async fn stop(&mut self) -> Result<()> {
        self.supervisor.kill().await?;
        if let Some(binary) = self.running_binary.take() {
            remove_binary(&binary);
        }
        Ok(())
    }
}

fn new_embed_bundle() -> std::result::Result<Box<dyn Bundler>, BundleError> {
    Ok(Box::new(EmbedBundle::new()?))
}
