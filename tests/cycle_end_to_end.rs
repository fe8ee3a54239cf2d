// tests/cycle_end_to_end.rs
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use devloop::bundle::{BundleError, Bundler};
use devloop::engine::Project;
use devloop::errors::DevloopError;
use devloop::ui::TerseTerminal;
use devloop::watch::Poller;
use devloop_test_utils::fixtures::{write_broken_program, write_module, write_working_project};
use devloop_test_utils::recording_ui::RecordingUi;
use devloop_test_utils::{go_available, init_tracing, with_timeout, with_timeout_secs};
use tokio::sync::watch;

type TestResult = Result<(), Box<dyn Error>>;

/// A poller that never fires during the test; cycles only need it for
/// config updates.
fn idle_poller(dir: &Path) -> (Poller, watch::Sender<bool>) {
    let (tx, rx) = watch::channel(false);
    (Poller::spawn(dir, Duration::from_secs(3600), rx), tx)
}

/// Stages nothing and fails to write.
struct FailingBundle {
    dir: PathBuf,
}

impl Bundler for FailingBundle {
    fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, dest: &Path) -> Result<(), BundleError> {
        Err(BundleError::Write {
            path: dest.to_path_buf(),
            source: std::io::Error::other("disk full"),
        })
    }

    fn clear(&mut self) -> Result<(), BundleError> {
        Ok(())
    }
}

#[tokio::test]
async fn project_without_go_sources_skips_both_builds() -> TestResult {
    with_timeout_secs(60, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        let (poller, _shutdown) = idle_poller(dir.path());
        let mut project = Project::new(dir.path(), Duration::from_millis(50));

        let mut ui = TerseTerminal::new(Vec::new());
        project.build_and_run(&mut ui, &poller).await?;

        assert_eq!(String::from_utf8(ui.into_inner())?, "rebuilding.....done\n");
        assert!(dir.path().join("bundle.go").is_file());
        assert!(!project.supervisor().is_running());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn skipped_phases_report_no_artifact_steps() -> TestResult {
    with_timeout_secs(60, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        let (poller, _shutdown) = idle_poller(dir.path());
        let mut project = Project::new(dir.path(), Duration::from_millis(50));

        let mut ui = RecordingUi::new();
        project.build_and_run(&mut ui, &poller).await?;

        assert_eq!(
            ui.events(),
            [
                "rebuild_started",
                "config_loaded",
                "bundle_created",
                "embed_file_written",
                "bundling_done",
                "building_done",
                "rebuild_done",
            ]
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn invalid_config_stops_the_cycle_before_bundling() -> TestResult {
    with_timeout(async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("Devloop.toml"), "max_serve_build_time = \"0s\"\n")?;
        let (poller, _shutdown) = idle_poller(dir.path());
        let mut project = Project::new(dir.path(), Duration::from_millis(50));

        let mut ui = RecordingUi::new();
        let result = project.build_and_run(&mut ui, &poller).await;

        assert!(matches!(result, Err(DevloopError::ConfigError(_))), "{result:?}");
        assert_eq!(ui.events(), ["rebuild_started"]);
        assert!(!dir.path().join("bundle.go").exists());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn failing_bundle_write_is_a_bundle_error() -> TestResult {
    with_timeout_secs(60, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        let staging = dir.path().join("staging");
        let (poller, _shutdown) = idle_poller(dir.path());
        let mut project = Project::new(dir.path(), Duration::from_millis(50)).with_bundler(
            move || -> Result<Box<dyn Bundler>, BundleError> {
                Ok(Box::new(FailingBundle {
                    dir: staging.clone(),
                }))
            },
        );

        let mut ui = RecordingUi::new();
        let result = project.build_and_run(&mut ui, &poller).await;

        assert!(
            matches!(result, Err(DevloopError::Bundle(BundleError::Write { .. }))),
            "{result:?}"
        );
        assert_eq!(
            ui.events(),
            ["rebuild_started", "config_loaded", "bundle_created"]
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn full_project_builds_bundles_and_runs() -> TestResult {
    if !go_available() {
        return Ok(());
    }
    with_timeout_secs(300, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        write_working_project(dir.path())?;
        let (poller, _shutdown) = idle_poller(dir.path());
        let mut project = Project::new(dir.path(), Duration::from_millis(50));

        let mut ui = TerseTerminal::new(Vec::new());
        project.build_and_run(&mut ui, &poller).await?;

        assert_eq!(String::from_utf8_lossy(ui.get_ref()), "rebuilding.......done\n");
        assert!(project.supervisor().is_running());
        let embed = fs::read_to_string(dir.path().join("bundle.go"))?;
        assert!(embed.contains("\"/main.wasm\""));

        project.stop().await?;
        assert!(!project.supervisor().is_running());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn frontend_compile_failure_is_a_frontend_error() -> TestResult {
    if !go_available() {
        return Ok(());
    }
    with_timeout_secs(300, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        write_module(dir.path(), "app")?;
        write_broken_program(dir.path())?;
        let (poller, _shutdown) = idle_poller(dir.path());
        let mut project = Project::new(dir.path(), Duration::from_millis(50));

        let mut ui = RecordingUi::new();
        let result = project.build_and_run(&mut ui, &poller).await;

        match result {
            Err(DevloopError::Frontend(err)) => assert_eq!(err.dir, dir.path()),
            other => panic!("expected a frontend build error, got {other:?}"),
        }
        assert!(!ui.events().contains(&"frontend_staged"));
        assert!(!project.supervisor().is_running());
        Ok(())
    })
    .await
}
