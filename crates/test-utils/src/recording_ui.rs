use std::sync::{Arc, Mutex};

use devloop::ui::Ui;

/// A UI that records the name of every hook called, in order.
///
/// Clones share the same log, so a test can keep one while the engine owns
/// the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    /// Number of completed cycles seen so far.
    pub fn cycles_done(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == "rebuild_done")
            .count()
    }

    fn record(&self, event: &'static str) {
        self.events.lock().unwrap().push(event);
    }
}

impl Ui for RecordingUi {
    fn rebuild_started(&mut self) {
        self.record("rebuild_started");
    }

    fn config_loaded(&mut self) {
        self.record("config_loaded");
    }

    fn bundle_created(&mut self) {
        self.record("bundle_created");
    }

    fn frontend_staged(&mut self) {
        self.record("frontend_staged");
    }

    fn embed_file_written(&mut self) {
        self.record("embed_file_written");
    }

    fn bundling_done(&mut self) {
        self.record("bundling_done");
    }

    fn building_done(&mut self) {
        self.record("building_done");
    }

    fn running_done(&mut self) {
        self.record("running_done");
    }

    fn rebuild_done(&mut self) {
        self.record("rebuild_done");
    }
}
