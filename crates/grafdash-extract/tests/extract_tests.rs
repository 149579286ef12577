//! Integration tests for extracting several artifacts into one root.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use grafdash_extract::{ExtractError, extract_archives};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn test_later_archive_overwrites_duplicate() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("platform.jar");
    let second = temp.path().join("service.jar");
    write_zip(
        &first,
        &[("latency.json", r#"{"v":1}"#), ("errors.json", "{}")],
    );
    write_zip(&second, &[("latency.json", r#"{"v":2}"#)]);
    let into = temp.path().join("artifacts");

    let report = extract_archives(&[&first, &second], &into).unwrap();

    assert_eq!(report.archives, vec![first.clone(), second.clone()]);
    assert_eq!(
        report.files,
        vec![PathBuf::from("errors.json"), PathBuf::from("latency.json")]
    );
    assert_eq!(
        fs::read_to_string(into.join("latency.json")).unwrap(),
        r#"{"v":2}"#
    );

    assert_eq!(report.duplicates.len(), 1);
    let duplicate = &report.duplicates[0];
    assert_eq!(duplicate.path, PathBuf::from("latency.json"));
    assert_eq!(duplicate.kept, second);
    assert_eq!(duplicate.replaced, first);
}

#[test]
fn test_no_archives_creates_target() {
    let temp = TempDir::new().unwrap();
    let into = temp.path().join("artifacts");

    let report = extract_archives::<PathBuf>(&[], &into).unwrap();

    assert!(into.is_dir());
    assert_eq!(report.extracted(), 0);
}

#[test]
fn test_missing_archive_stops_extraction() {
    let temp = TempDir::new().unwrap();
    let good = temp.path().join("good.zip");
    write_zip(&good, &[("a.json", "{}")]);
    let missing = temp.path().join("missing.zip");

    let err = extract_archives(&[good, missing.clone()], &temp.path().join("out")).unwrap_err();

    match err {
        ExtractError::ArchiveNotFound { path } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
}
