//! Zip and jar archive extraction.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zip::ZipArchive;

use crate::error::ExtractError;

/// An entry path provided by more than one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duplicate {
    /// Entry path relative to the target directory.
    pub path: PathBuf,
    /// Archive whose copy is on disk.
    pub kept: PathBuf,
    /// Archive whose copy was overwritten.
    pub replaced: PathBuf,
}

/// Summary of an extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractReport {
    /// Directory the archives were extracted into.
    pub target: PathBuf,
    /// Archives extracted, in order.
    pub archives: Vec<PathBuf>,
    /// Extracted files relative to `target`, sorted.
    pub files: Vec<PathBuf>,
    /// Entries that more than one archive provided.
    pub duplicates: Vec<Duplicate>,
}

impl ExtractReport {
    /// Number of distinct files extracted.
    pub fn extracted(&self) -> usize {
        self.files.len()
    }
}

/// Extract a single archive into `into`.
pub fn extract_archive(archive: &Path, into: &Path) -> Result<ExtractReport, ExtractError> {
    extract_archives(&[archive], into)
}

/// Extract every archive into `into`, preserving entry paths.
///
/// Archives are processed in the order given. When two archives provide the
/// same entry path the later one overwrites the earlier copy and the
/// collision is reported as a [`Duplicate`].
pub fn extract_archives<P: AsRef<Path>>(
    archives: &[P],
    into: &Path,
) -> Result<ExtractReport, ExtractError> {
    fs::create_dir_all(into).map_err(|e| ExtractError::io(into, e))?;

    let mut owners: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
    let mut report = ExtractReport {
        target: into.to_path_buf(),
        ..Default::default()
    };

    for archive in archives {
        let archive = archive.as_ref();
        let count = extract_into(archive, into, &mut owners, &mut report.duplicates)?;
        tracing::debug!("Extracted {} entries from {}", count, archive.display());
        report.archives.push(archive.to_path_buf());
    }

    report.files = owners.into_keys().collect();

    tracing::info!(
        "Extracted {} file(s) from {} archive(s) into {}",
        report.files.len(),
        report.archives.len(),
        into.display()
    );
    Ok(report)
}

fn extract_into(
    archive_path: &Path,
    into: &Path,
    owners: &mut BTreeMap<PathBuf, PathBuf>,
    duplicates: &mut Vec<Duplicate>,
) -> Result<usize, ExtractError> {
    let file = File::open(archive_path).map_err(|e| ExtractError::open(archive_path, e))?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| ExtractError::archive(archive_path, e))?;

    let mut count = 0;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| ExtractError::archive(archive_path, e))?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(ExtractError::UnsafeEntry {
                archive: archive_path.to_path_buf(),
                entry: entry.name().to_string(),
            });
        };
        let target = into.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| ExtractError::io(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| ExtractError::io(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| ExtractError::io(&target, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| ExtractError::io(&target, e))?;
        count += 1;

        if let Some(previous) = owners.insert(relative.clone(), archive_path.to_path_buf()) {
            if previous != archive_path {
                tracing::warn!(
                    "Duplicate entry {}: {} overwrites {}",
                    relative.display(),
                    archive_path.display(),
                    previous.display()
                );
                duplicates.push(Duplicate {
                    path: relative,
                    kept: archive_path.to_path_buf(),
                    replaced: previous,
                });
            }
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_preserves_paths() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("lib.jar");
        write_zip(
            &archive,
            &[
                ("dashboards/", ""),
                ("dashboards/latency.json", "{}"),
                ("dashboards/team/errors.rhai", "\"{}\""),
            ],
        );
        let into = temp.path().join("out");

        let report = extract_archive(&archive, &into).unwrap();

        assert_eq!(report.extracted(), 2);
        assert_eq!(
            report.files,
            vec![
                PathBuf::from("dashboards/latency.json"),
                PathBuf::from("dashboards/team/errors.rhai"),
            ]
        );
        assert_eq!(
            fs::read_to_string(into.join("dashboards/team/errors.rhai")).unwrap(),
            "\"{}\""
        );
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn test_empty_directory_entries_are_created() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("empty.zip");
        write_zip(&archive, &[("nothing-here/", "")]);
        let into = temp.path().join("out");

        let report = extract_archive(&archive, &into).unwrap();

        assert_eq!(report.extracted(), 0);
        assert!(into.join("nothing-here").is_dir());
    }

    #[test]
    fn test_missing_archive() {
        let temp = TempDir::new().unwrap();
        let err = extract_archive(&temp.path().join("gone.zip"), temp.path()).unwrap_err();
        assert!(matches!(err, ExtractError::ArchiveNotFound { .. }));
    }

    #[test]
    fn test_not_a_zip() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("fake.jar");
        fs::write(&archive, "definitely not a zip").unwrap();
        let err = extract_archive(&archive, &temp.path().join("out")).unwrap_err();
        assert!(matches!(err, ExtractError::Archive { .. }));
    }

    #[test]
    fn test_escaping_entry_is_rejected() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.zip");
        write_zip(&archive, &[("../evil.json", "{}")]);
        let into = temp.path().join("out");

        let err = extract_archive(&archive, &into).unwrap_err();

        match err {
            ExtractError::UnsafeEntry { entry, .. } => assert_eq!(entry, "../evil.json"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!temp.path().join("evil.json").exists());
    }
}
