// src/watch/poller.rs

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::patterns::{IgnoreSet, WatchConfig};
use crate::watch::scan::{ScanError, scan};

/// What a single poll cycle reports to the consumer.
#[derive(Debug)]
pub enum PollSignal {
    /// Something in the tree is newer than the previous report.
    Changed(SystemTime),
    /// The scan failed; the poller keeps going.
    Failed(ScanError),
}

/// Polls a directory tree for modification-time changes.
///
/// The scanning loop runs as its own Tokio task and owns the scan cursor and
/// the ignore rules. Each tree walk runs on the blocking thread pool. Callers talk to it through two channels only:
///
/// - [`Poller::next`] takes the next change (or scan error). Hand-off is a
///   rendezvous: the loop does not start another cycle until the previous
///   signal was taken, so a slow consumer slows the scanning down.
/// - [`Poller::update`] replaces the ignore rules. The loop picks up the most
///   recent config at the start of its next cycle; nothing is merged.
///
/// The loop ends when `shutdown` flips to `true` (or its sender is dropped),
/// after which `next()` returns `false`.
pub struct Poller {
    signals: mpsc::Receiver<PollSignal>,
    config_tx: watch::Sender<WatchConfig>,
    last_change: Option<SystemTime>,
    last_err: Option<ScanError>,
    handle: JoinHandle<()>,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("last_change", &self.last_change)
            .field("last_err", &self.last_err)
            .finish_non_exhaustive()
    }
}

impl Poller {
    /// Start polling `root` on the real filesystem with no ignore rules.
    pub fn spawn(
        root: impl Into<PathBuf>,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self::spawn_with(
            Arc::new(RealFileSystem),
            root,
            interval,
            WatchConfig::default(),
            shutdown,
        )
    }

    /// Start polling with an explicit filesystem and initial config.
    pub fn spawn_with(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        interval: Duration,
        initial: WatchConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let root = root.into();
        let (signal_tx, signals) = mpsc::channel::<PollSignal>(1);
        let (config_tx, config_rx) = watch::channel(initial);

        let handle = tokio::spawn(poll_loop(
            fs, root, interval, config_rx, signal_tx, shutdown,
        ));

        Self {
            signals,
            config_tx,
            last_change: None,
            last_err: None,
            handle,
        }
    }

    /// Wait for the next change or scan error.
    ///
    /// Returns `true` while the loop is running (both a change and an error
    /// count), `false` once it has stopped.
    pub async fn next(&mut self) -> bool {
        match self.signals.recv().await {
            Some(PollSignal::Changed(at)) => {
                self.last_change = Some(at);
                self.last_err = None;
                true
            }
            Some(PollSignal::Failed(err)) => {
                self.last_err = Some(err);
                true
            }
            None => false,
        }
    }

    /// Replace the watch config, effective from the next scan.
    pub fn update(&self, cfg: WatchConfig) {
        self.config_tx.send_replace(cfg);
    }

    /// Timestamp of the most recent change taken with [`Poller::next`].
    pub fn last_change(&self) -> Option<SystemTime> {
        self.last_change
    }

    /// The scan error taken by the latest [`Poller::next`], if that call
    /// returned an error rather than a change.
    pub fn err(&self) -> Option<&ScanError> {
        self.last_err.as_ref()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn poll_loop(
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    interval: Duration,
    mut config_rx: watch::Receiver<WatchConfig>,
    signals: mpsc::Sender<PollSignal>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!(root = %root.display(), ?interval, "poller started");

    let mut cursor = SystemTime::now();
    let mut ignore = compile_ignore(&config_rx.borrow_and_update(), IgnoreSet::default());

    loop {
        if *shutdown.borrow() {
            break;
        }

        // Config is only ever swapped here, between two scans.
        if config_rx.has_changed().unwrap_or(false) {
            let cfg = config_rx.borrow_and_update().clone();
            ignore = compile_ignore(&cfg, ignore);
        }

        let Some(scanned) = scan_blocking(&fs, &root, cursor, &ignore, &mut shutdown).await else {
            break;
        };

        let signal = match scanned {
            Ok(Some(at)) => {
                debug!(?at, "change detected");
                Some(PollSignal::Changed(at))
            }
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "scan failed");
                Some(PollSignal::Failed(err))
            }
        };

        if let Some(signal) = signal {
            let at = match &signal {
                PollSignal::Changed(at) => Some(*at),
                PollSignal::Failed(_) => None,
            };
            if !deliver(&signals, signal, &mut shutdown).await {
                break;
            }
            if let Some(at) = at {
                cursor = at;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = shutdown.changed() => {
                // A dropped shutdown sender counts as shutdown.
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    debug!(root = %root.display(), "poller stopped");
}

/// Run one scan on the blocking pool so a slow tree walk never stalls the
/// runtime. Returns `None` if shutdown was requested while it was running.
async fn scan_blocking(
    fs: &Arc<dyn FileSystem>,
    root: &Path,
    since: SystemTime,
    ignore: &IgnoreSet,
    shutdown: &mut watch::Receiver<bool>,
) -> Option<Result<Option<SystemTime>, ScanError>> {
    let task = tokio::task::spawn_blocking({
        let fs = Arc::clone(fs);
        let root = root.to_path_buf();
        let ignore = ignore.clone();
        move || scan(fs.as_ref(), &root, since, &ignore)
    });

    tokio::select! {
        joined = task => Some(joined.unwrap_or_else(|e| {
            Err(ScanError {
                path: root.to_path_buf(),
                source: io::Error::other(e),
            })
        })),
        _ = shutdown.changed() => None,
    }
}

/// Hand `signal` to the consumer and wait until it has been taken.
///
/// Returns `false` if the loop should stop: shutdown was requested or the
/// `Poller` is gone.
async fn deliver(
    signals: &mpsc::Sender<PollSignal>,
    signal: PollSignal,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    let handoff = async {
        if signals.send(signal).await.is_err() {
            return false;
        }
        // The channel holds a single signal, so a permit is only available
        // again once the consumer has received it.
        signals.reserve().await.is_ok()
    };

    tokio::select! {
        taken = handoff => taken,
        _ = shutdown.changed() => false,
    }
}

/// Compile the ignore rules of `cfg`, keeping `previous` if they are invalid.
fn compile_ignore(cfg: &WatchConfig, previous: IgnoreSet) -> IgnoreSet {
    match IgnoreSet::from_config(cfg) {
        Ok(set) => {
            debug!(patterns = ?set.patterns(), "watch config applied");
            set
        }
        Err(err) => {
            warn!(error = %err, "invalid watch config; keeping previous ignore rules");
            previous
        }
    }
}
