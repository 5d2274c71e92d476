use std::path::Path;

use childrun::exec::write_outputs;
use childrun::fs::RealFileSystem;
use childrun::fs::mock::MockFileSystem;
use childrun_test_utils::OutcomeBuilder;
use tempfile::TempDir;

#[test]
fn test_separate_files_are_truncated() {
    let fs = MockFileSystem::new();
    fs.add_file("/out/stdout.txt", "stale stdout contents");
    fs.add_file("/out/stderr.txt", "stale stderr contents");

    let outcome = OutcomeBuilder::new().stdout("new out\n").stderr("new err\n").build();
    write_outputs(
        &fs,
        &outcome,
        Some(Path::new("/out/stdout.txt")),
        Some(Path::new("/out/stderr.txt")),
    )
    .unwrap();

    assert_eq!(fs.read_to_string("/out/stdout.txt").unwrap(), "new out\n");
    assert_eq!(fs.read_to_string("/out/stderr.txt").unwrap(), "new err\n");
}

#[test]
fn test_same_file_appends_stderr_after_stdout() {
    let fs = MockFileSystem::new();
    fs.add_file("/out/all.txt", "previous run");

    let outcome = OutcomeBuilder::new().stdout("out\n").stderr("err\n").build();
    write_outputs(
        &fs,
        &outcome,
        Some(Path::new("/out/all.txt")),
        Some(Path::new("/out/./all.txt")),
    )
    .unwrap();

    assert_eq!(fs.read_to_string("/out/all.txt").unwrap(), "out\nerr\n");
}

#[test]
fn test_same_file_detected_through_link() {
    let fs = MockFileSystem::new();
    fs.add_link("/link/log.txt", "/real/log.txt");

    let outcome = OutcomeBuilder::new().stdout("A").stderr("B").build();
    write_outputs(
        &fs,
        &outcome,
        Some(Path::new("/real/log.txt")),
        Some(Path::new("/link/log.txt")),
    )
    .unwrap();

    assert_eq!(fs.read_to_string("/real/log.txt").unwrap(), "AB");
}

#[test]
fn test_missing_destinations_discard_output() {
    let fs = MockFileSystem::new();
    let outcome = OutcomeBuilder::new().stdout("out").stderr("err").build();

    write_outputs(&fs, &outcome, None, Some(Path::new("/only/stderr.txt"))).unwrap();

    assert_eq!(fs.read_to_string("/only/stderr.txt").unwrap(), "err");
    assert!(fs.contents("/only/stdout.txt").is_none());
}

#[test]
fn test_stderr_alone_truncates() {
    let fs = MockFileSystem::new();
    fs.add_file("/x/err.txt", "old");

    let outcome = OutcomeBuilder::new().stderr("fresh").build();
    write_outputs(&fs, &outcome, None, Some(Path::new("/x/err.txt"))).unwrap();

    assert_eq!(fs.read_to_string("/x/err.txt").unwrap(), "fresh");
}

#[test]
fn test_real_filesystem_same_file_via_relative_spelling() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("combined.log");
    std::fs::write(&path, "left over from an earlier run").unwrap();

    let outcome = OutcomeBuilder::new().stdout("stdout line\n").stderr("stderr line\n").build();
    let other_spelling = dir.path().join(".").join("combined.log");

    write_outputs(&RealFileSystem, &outcome, Some(&path), Some(&other_spelling)).unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "stdout line\nstderr line\n"
    );
}

#[cfg(unix)]
#[test]
fn test_real_filesystem_same_file_via_symlink() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("target.log");
    let link = dir.path().join("link.log");
    std::fs::write(&target, "").unwrap();
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let outcome = OutcomeBuilder::new().stdout("1").stderr("2").build();
    write_outputs(&RealFileSystem, &outcome, Some(&target), Some(&link)).unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "12");
}
