// tests/scan_mock_fs.rs
use std::error::Error;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use devloop::fs::mock::MockFileSystem;
use devloop::watch::{IgnoreSet, scan};

type TestResult = Result<(), Box<dyn Error>>;

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

fn ignore(patterns: &[&str]) -> Result<IgnoreSet, Box<dyn Error>> {
    let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
    Ok(IgnoreSet::new(&patterns)?)
}

#[test]
fn nothing_newer_returns_none() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./main.go", at(10));
    fs.add_file("./web/app.go", at(20));

    let found = scan(&fs, Path::new("."), at(20), &IgnoreSet::default())?;
    assert_eq!(found, None);
    Ok(())
}

#[test]
fn equal_timestamp_is_not_newer() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./main.go", at(10));

    assert_eq!(scan(&fs, Path::new("."), at(10), &IgnoreSet::default())?, None);
    assert_eq!(
        scan(&fs, Path::new("."), at(9), &IgnoreSet::default())?,
        Some(at(10))
    );
    Ok(())
}

#[test]
fn first_newer_entry_in_lexical_order_wins() -> TestResult {
    let fs = MockFileSystem::new();
    // Inserted out of order; the mock lists children in insertion order.
    fs.add_file("./b.go", at(300));
    fs.add_file("./a.go", at(200));

    let found = scan(&fs, Path::new("."), at(100), &IgnoreSet::default())?;
    assert_eq!(found, Some(at(200)));
    Ok(())
}

#[test]
fn directory_is_visited_before_its_children() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./src/x.go", at(200));
    fs.add_dir("./src", at(500));

    let found = scan(&fs, Path::new("."), at(100), &IgnoreSet::default())?;
    assert_eq!(found, Some(at(500)));
    Ok(())
}

#[test]
fn subtree_is_searched_before_later_siblings() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./z.go", at(900));
    fs.add_file("./a/deep/x.go", at(400));

    let found = scan(&fs, Path::new("."), at(100), &IgnoreSet::default())?;
    assert_eq!(found, Some(at(400)));
    Ok(())
}

#[test]
fn root_itself_counts_as_an_entry() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./main.go", at(10));
    fs.touch(".", at(50));

    let found = scan(&fs, Path::new("."), at(20), &IgnoreSet::default())?;
    assert_eq!(found, Some(at(50)));
    Ok(())
}

#[test]
fn ignored_file_is_skipped() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./bundle.go", at(500));
    fs.add_file("./main.go", at(10));

    let found = scan(&fs, Path::new("."), at(100), &ignore(&["bundle.go"])?)?;
    assert_eq!(found, None);
    Ok(())
}

#[test]
fn ignored_directory_prunes_descendants() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./vendor/lib/x.go", at(500));
    fs.add_file("./main.go", at(10));

    let found = scan(&fs, Path::new("."), at(100), &ignore(&["vendor"])?)?;
    assert_eq!(found, None);
    Ok(())
}

#[test]
fn top_level_glob_does_not_ignore_nested_files() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./server.log", at(500));
    fs.add_file("./logs/server.log", at(600));

    let found = scan(&fs, Path::new("."), at(100), &ignore(&["*.log"])?)?;
    assert_eq!(found, Some(at(600)));
    Ok(())
}

#[test]
fn missing_root_is_an_error() {
    let fs = MockFileSystem::new();

    let err = scan(&fs, Path::new("./missing"), at(0), &IgnoreSet::default())
        .expect_err("scan of a missing root should fail");
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
    assert_eq!(err.path, Path::new("./missing"));
}
