//! End-to-end CLI tests: build a package from blocks JSON, then inspect it

use assert_cmd::Command;
use predicates::prelude::*;

const BLOCKS_JSON: &str = r#"{
    "pages": [{ "width": 595.0, "height": 842.0 }],
    "blocks": [
        { "text": "second paragraph", "bbox": { "x0": 10.0, "y0": 200.0, "x1": 300.0, "y1": 212.0 }, "page_index": 0 },
        { "text": "first paragraph", "bbox": { "x0": 10.0, "y0": 40.0, "x1": 300.0, "y1": 52.0 }, "page_index": 0 }
    ]
}"#;

fn build_package(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let blocks = dir.path().join("doc.json");
    std::fs::write(&blocks, BLOCKS_JSON).unwrap();
    let package = dir.path().join("doc.hwpx");

    Command::cargo_bin("hanji")
        .unwrap()
        .args([
            "build",
            blocks.to_str().unwrap(),
            "-o",
            package.to_str().unwrap(),
        ])
        .assert()
        .success();
    package
}

#[test]
fn test_build_then_validate() {
    let dir = tempfile::tempdir().unwrap();
    let package = build_package(&dir);

    Command::cargo_bin("hanji")
        .unwrap()
        .args(["validate", package.to_str().unwrap(), "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn test_text_prints_reading_order() {
    let dir = tempfile::tempdir().unwrap();
    let package = build_package(&dir);

    Command::cargo_bin("hanji")
        .unwrap()
        .args(["text", package.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("first paragraph\nsecond paragraph"));
}

#[test]
fn test_search_finds_match() {
    let dir = tempfile::tempdir().unwrap();
    let package = build_package(&dir);

    Command::cargo_bin("hanji")
        .unwrap()
        .args(["search", package.to_str().unwrap(), "second"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 match(es)"));
}

#[test]
fn test_replace_rewrites_package() {
    let dir = tempfile::tempdir().unwrap();
    let package = build_package(&dir);
    let edited = dir.path().join("edited.hwpx");

    Command::cargo_bin("hanji")
        .unwrap()
        .args([
            "replace",
            package.to_str().unwrap(),
            "-o",
            edited.to_str().unwrap(),
            "paragraph",
            "section",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 replacement(s)"));

    Command::cargo_bin("hanji")
        .unwrap()
        .args(["text", edited.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("first section"));
}

#[test]
fn test_corrupt_package_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.hwpx");
    std::fs::write(&bogus, b"not a package").unwrap();

    Command::cargo_bin("hanji")
        .unwrap()
        .args(["info", bogus.to_str().unwrap()])
        .assert()
        .failure()
        .code(2);
}
