// src/ui.rs

//! Progress reporting for a development cycle.
//!
//! The engine calls one hook per completed step. Hooks have no return value
//! and can't influence the cycle.

use std::io::Write;

/// Observer of a single build-and-run cycle.
pub trait Ui: Send {
    fn rebuild_started(&mut self);
    fn config_loaded(&mut self);
    fn bundle_created(&mut self);
    fn frontend_staged(&mut self);
    fn embed_file_written(&mut self);
    fn bundling_done(&mut self);
    fn building_done(&mut self);
    fn running_done(&mut self);
    fn rebuild_done(&mut self);
}

/// Prints `rebuilding`, a dot per step, then `done`.
///
/// A full cycle with a frontend and a backend looks like
/// `rebuilding.......done`. Write errors are ignored.
#[derive(Debug)]
pub struct TerseTerminal<W> {
    out: W,
}

impl<W: Write> TerseTerminal<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, s: &str) {
        let _ = self.out.write_all(s.as_bytes());
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> Ui for TerseTerminal<W> {
    fn rebuild_started(&mut self) {
        self.print("rebuilding");
    }

    fn config_loaded(&mut self) {
        self.print(".");
    }

    fn bundle_created(&mut self) {
        self.print(".");
    }

    fn frontend_staged(&mut self) {
        self.print(".");
    }

    fn embed_file_written(&mut self) {
        self.print(".");
    }

    fn bundling_done(&mut self) {
        self.print(".");
    }

    fn building_done(&mut self) {
        self.print(".");
    }

    fn running_done(&mut self) {
        self.print(".");
    }

    fn rebuild_done(&mut self) {
        self.print("done\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_a_dot_per_step() {
        let mut ui = TerseTerminal::new(Vec::new());
        ui.rebuild_started();
        ui.config_loaded();
        ui.bundle_created();
        ui.embed_file_written();
        ui.bundling_done();
        ui.building_done();
        ui.rebuild_done();

        assert_eq!(String::from_utf8_lossy(ui.get_ref()), "rebuilding.....done\n");
    }
}
