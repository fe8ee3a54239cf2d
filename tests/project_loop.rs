// tests/project_loop.rs
use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use devloop::engine::Project;
use devloop::errors::DevloopError;
use devloop_test_utils::recording_ui::RecordingUi;
use devloop_test_utils::{init_tracing, with_timeout_secs};
use filetime::FileTime;
use tokio::sync::watch;

type TestResult = Result<(), Box<dyn Error>>;

const INTERVAL: Duration = Duration::from_millis(20);

async fn wait_for_cycles(ui: &RecordingUi, n: usize) {
    while ui.cycles_done() < n {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Backdate everything in `dir` (and `dir` itself) so the poller starts quiet.
fn settle(dir: &Path) -> std::io::Result<()> {
    let past = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(60));
    for entry in fs::read_dir(dir)? {
        filetime::set_file_mtime(entry?.path(), past)?;
    }
    filetime::set_file_mtime(dir, past)
}

#[tokio::test]
async fn shutdown_after_the_first_cycle_returns_ok() -> TestResult {
    with_timeout_secs(60, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut project = Project::new(dir.path(), INTERVAL);
        let ui = RecordingUi::new();
        let mut engine_ui = ui.clone();

        let (result, _) = tokio::join!(project.run_with_ui(&mut engine_ui, shutdown_rx), async {
            wait_for_cycles(&ui, 1).await;
            let _ = shutdown_tx.send(true);
        });

        result?;
        assert!(ui.cycles_done() >= 1);
        assert!(!project.supervisor().is_running());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn first_cycle_error_ends_the_loop() -> TestResult {
    with_timeout_secs(60, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("Devloop.toml"), "not toml at all = = =\n")?;
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut project = Project::new(dir.path(), INTERVAL);

        let mut ui = RecordingUi::new();
        let result = project.run_with_ui(&mut ui, shutdown_rx).await;

        assert!(matches!(result, Err(DevloopError::TomlError(_))), "{result:?}");
        assert_eq!(ui.cycles_done(), 0);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn a_change_triggers_another_cycle() -> TestResult {
    with_timeout_secs(120, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("notes.txt"), "v1")?;
        // Pre-create the embed file so writing it doesn't add a directory entry.
        fs::write(dir.path().join("bundle.go"), "")?;
        settle(dir.path())?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut project = Project::new(dir.path(), INTERVAL);
        let ui = RecordingUi::new();
        let mut engine_ui = ui.clone();
        let notes = dir.path().join("notes.txt");

        let (result, quiet_cycles) =
            tokio::join!(project.run_with_ui(&mut engine_ui, shutdown_rx), async {
                wait_for_cycles(&ui, 1).await;

                // Rewriting the ignored embed file alone doesn't retrigger.
                tokio::time::sleep(INTERVAL * 15).await;
                let quiet_cycles = ui.cycles_done();

                let future = SystemTime::now() + Duration::from_secs(30);
                let _ = filetime::set_file_mtime(&notes, FileTime::from_system_time(future));
                wait_for_cycles(&ui, quiet_cycles + 1).await;

                let _ = shutdown_tx.send(true);
                quiet_cycles
            });

        result?;
        assert_eq!(quiet_cycles, 1);
        assert!(ui.cycles_done() >= 2);
        Ok(())
    })
    .await
}
