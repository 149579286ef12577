//! Source discovery with jwalk.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use jwalk::{Parallelism, WalkDir};

use grafdash_core::{CollectError, FailureKind, FileFailure};

/// Files found under one root.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Regular files, sorted lexicographically by path.
    pub files: Vec<PathBuf>,
    /// Entries that could not be read during the walk.
    pub errors: Vec<FileFailure>,
}

/// Compile exclude patterns into a matcher.
pub fn build_exclude_set(patterns: &[String]) -> Result<GlobSet, CollectError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| CollectError::InvalidConfig {
            message: format!("invalid exclude pattern '{pattern}': {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| CollectError::InvalidConfig {
        message: e.to_string(),
    })
}

/// Check that a root exists and is a directory.
pub fn check_root(root: &Path) -> Result<(), CollectError> {
    let metadata = fs::metadata(root).map_err(|e| CollectError::root(root, e))?;
    if !metadata.is_dir() {
        return Err(CollectError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    Ok(())
}

/// Enumerate all regular files under `root`.
///
/// The walk is serial and sorted so that output is reproducible. Exclude
/// patterns match paths relative to `root`.
pub fn discover(
    root: &Path,
    exclude: &GlobSet,
    include_hidden: bool,
) -> Result<Discovery, CollectError> {
    check_root(root)?;

    let walker = WalkDir::new(root)
        .parallelism(Parallelism::Serial)
        .sort(true)
        .skip_hidden(!include_hidden)
        .follow_links(false);

    let mut discovery = Discovery::default();

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                tracing::warn!("Cannot read {}: {}", path.display(), err);
                discovery.errors.push(FileFailure {
                    path,
                    message: err.to_string(),
                    kind: FailureKind::Read,
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path.as_path());
        if exclude.is_match(relative) {
            tracing::debug!("Excluded {}", path.display());
            continue;
        }

        discovery.files.push(path);
    }

    discovery.files.sort();
    Ok(discovery)
}
