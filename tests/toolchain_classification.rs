// tests/toolchain_classification.rs
use std::error::Error;
use std::path::Path;
use std::time::Duration;

use devloop::toolchain::inspect::{classify_list_failure, package_name};
use devloop::toolchain::{BuildTarget, Toolchain, ToolchainError};
use devloop_test_utils::fixtures::{
    write_backend_program, write_broken_program, write_frontend_program, write_library,
    write_module,
};
use devloop_test_utils::{go_available, init_tracing, with_timeout_secs};

type TestResult = Result<(), Box<dyn Error>>;

const BUILD_TIMEOUT: Duration = Duration::from_secs(120);

#[test]
fn list_failures_are_classified_by_message() {
    let dir = Path::new("/tmp/app");

    let cases = [
        "go: cannot find main module; see 'go help modules'",
        "go: go.mod file not found in current directory or any parent directory; see 'go help modules'",
    ];
    for stderr in cases {
        assert!(
            matches!(classify_list_failure(dir, stderr), ToolchainError::NoModuleDefined { .. }),
            "{stderr}"
        );
    }

    let cases = [
        "can't load package: package app: unknown import path \"app\": cannot find module for path app",
        "no Go files in /tmp/app",
        "package app: build constraints exclude all Go files in /tmp/app",
    ];
    for stderr in cases {
        assert!(
            matches!(classify_list_failure(dir, stderr), ToolchainError::NoBuildablePackage { .. }),
            "{stderr}"
        );
    }

    match classify_list_failure(dir, "go: something else broke\n") {
        ToolchainError::InspectFailed { message, .. } => {
            assert!(message.contains("something else broke"), "{message}")
        }
        other => panic!("unexpected classification: {other}"),
    }
}

#[test]
fn package_name_reads_the_first_listed_record() {
    let dir = Path::new("/tmp/app");
    let stdout = br#"{"Dir": "/tmp/app", "Name": "main", "ImportPath": "app"}
{"Dir": "/tmp/app/sub", "Name": "sub"}"#;

    assert_eq!(package_name(dir, stdout).unwrap(), "main");
    assert!(matches!(
        package_name(dir, b""),
        Err(ToolchainError::InspectFailed { .. })
    ));
    assert!(matches!(
        package_name(dir, b"not json"),
        Err(ToolchainError::InspectFailed { .. })
    ));
}

#[tokio::test]
async fn missing_executable_is_tool_not_found() -> TestResult {
    with_timeout_secs(5, async {
        init_tracing();
        let dir = tempfile::tempdir()?;

        let err = Toolchain::with_executable("devloop-no-such-go", BuildTarget::host(dir.path()))
            .await
            .expect_err("bogus executable should not be found");
        assert!(
            matches!(&err, ToolchainError::ToolNotFound(name) if name == "devloop-no-such-go"),
            "{err}"
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn empty_dir_has_no_module() -> TestResult {
    if !go_available() {
        return Ok(());
    }
    with_timeout_secs(60, async {
        init_tracing();
        let dir = tempfile::tempdir()?;

        let err = Toolchain::new(BuildTarget::host(dir.path()))
            .await
            .expect_err("empty dir is not buildable");
        assert!(matches!(err, ToolchainError::NoModuleDefined { .. }), "{err}");
        Ok(())
    })
    .await
}

#[tokio::test]
async fn module_without_sources_has_no_package() -> TestResult {
    if !go_available() {
        return Ok(());
    }
    with_timeout_secs(60, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        write_module(dir.path(), "app")?;

        let err = Toolchain::new(BuildTarget::host(dir.path()))
            .await
            .expect_err("module without sources is not buildable");
        assert!(matches!(err, ToolchainError::NoBuildablePackage { .. }), "{err}");
        Ok(())
    })
    .await
}

#[tokio::test]
async fn library_package_is_not_a_program() -> TestResult {
    if !go_available() {
        return Ok(());
    }
    with_timeout_secs(60, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        write_module(dir.path(), "app")?;
        write_library(dir.path())?;

        let err = Toolchain::new(BuildTarget::host(dir.path()))
            .await
            .expect_err("library is not a program");
        match err {
            ToolchainError::NotAProgram { package, .. } => assert_eq!(package, "lib"),
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    })
    .await
}

#[tokio::test]
async fn build_constraints_decide_what_each_target_sees() -> TestResult {
    if !go_available() {
        return Ok(());
    }
    with_timeout_secs(60, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        write_module(dir.path(), "app")?;
        write_backend_program(dir.path())?;

        // The only source file is excluded when targeting wasm.
        let err = Toolchain::new(BuildTarget::wasm(dir.path()))
            .await
            .expect_err("backend-only module has no frontend");
        assert!(matches!(err, ToolchainError::NoBuildablePackage { .. }), "{err}");

        Toolchain::new(BuildTarget::host(dir.path())).await?;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn compile_failure_is_a_build_error_for_the_dir() -> TestResult {
    if !go_available() {
        return Ok(());
    }
    with_timeout_secs(180, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        let out = tempfile::tempdir()?;
        write_module(dir.path(), "app")?;
        write_broken_program(dir.path())?;

        let toolchain = Toolchain::new(BuildTarget::host(dir.path())).await?;
        let err = toolchain
            .build(&out.path().join("serve"), BUILD_TIMEOUT)
            .await
            .expect_err("broken program should not compile");

        assert_eq!(err.dir, dir.path());
        assert!(err.message.contains("undefinedCall"), "{}", err.message);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn builds_runnable_binaries_for_both_targets() -> TestResult {
    if !go_available() {
        return Ok(());
    }
    with_timeout_secs(300, async {
        init_tracing();
        let dir = tempfile::tempdir()?;
        let out = tempfile::tempdir()?;
        write_module(dir.path(), "app")?;
        write_frontend_program(dir.path())?;
        write_backend_program(dir.path())?;

        let server = out.path().join("serve");
        Toolchain::new(BuildTarget::host(dir.path()))
            .await?
            .build(&server, BUILD_TIMEOUT)
            .await?;
        assert!(server.is_file());

        let wasm = out.path().join("main.wasm");
        Toolchain::new(BuildTarget::wasm(dir.path()))
            .await?
            .build(&wasm, BUILD_TIMEOUT)
            .await?;
        // Every wasm module starts with "\0asm".
        assert_eq!(&std::fs::read(&wasm)?[..4], b"\0asm");
        Ok(())
    })
    .await
}
