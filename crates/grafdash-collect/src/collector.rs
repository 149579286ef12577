//! Dashboard collection across the directory and artifact roots.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use tempfile::NamedTempFile;

use grafdash_core::{
    CollectConfig, CollectError, ContentError, Dashboard, DashboardSource, FileFailure,
    SourceOrigin, dashboard_name,
};
use grafdash_script::ScriptEngine;
use grafdash_script::rhai::RhaiEngine;

use crate::creator::{ContentCreator, ScriptContentCreator, StaticContentCreator};
use crate::discover::{build_exclude_set, check_root, discover};
use crate::report::{CollectReport, CollectedDashboard, Resolution};

/// Resolves every dashboard source under the configured roots into one flat
/// output directory.
///
/// Roots are processed in precedence order, lowest priority first, and a
/// later dashboard replaces an earlier one with the same name. With the
/// default precedence artifact dashboards act as defaults that locally
/// authored dashboards override.
pub struct DashboardCollector {
    config: CollectConfig,
    creators: Vec<Box<dyn ContentCreator>>,
    exclude: GlobSet,
}

impl DashboardCollector {
    /// Create a collector with creators in priority order.
    pub fn new(
        config: CollectConfig,
        creators: Vec<Box<dyn ContentCreator>>,
    ) -> Result<Self, CollectError> {
        let exclude = build_exclude_set(&config.exclude)?;
        Ok(Self {
            config,
            creators,
            exclude,
        })
    }

    /// Create a collector with the static creator followed by a Rhai script
    /// creator initialized with the config's classpath.
    pub fn with_default_creators(config: CollectConfig) -> Result<Self, CollectError> {
        let mut engine = RhaiEngine::new();
        engine
            .initialize(&config.classpath_set())
            .map_err(|e| CollectError::InvalidConfig {
                message: e.to_string(),
            })?;

        let creators: Vec<Box<dyn ContentCreator>> = vec![
            Box::new(StaticContentCreator::new()),
            Box::new(ScriptContentCreator::new(
                engine,
                config.script_extensions.clone(),
            )),
        ];
        Self::new(config, creators)
    }

    /// Configuration of this collector.
    pub fn config(&self) -> &CollectConfig {
        &self.config
    }

    /// First creator that supports the file.
    fn select_creator(&self, path: &Path) -> Option<&dyn ContentCreator> {
        self.creators
            .iter()
            .map(|creator| creator.as_ref())
            .find(|creator| creator.is_supported(path))
    }

    /// Record a per-file failure, or abort when fail-fast is enabled.
    fn fail(&self, resolution: &mut Resolution, err: ContentError) -> Result<(), CollectError> {
        if self.config.fail_fast {
            return Err(err.into());
        }
        tracing::error!("{}", err);
        resolution.failures.push(FileFailure::from(&err));
        Ok(())
    }

    /// Resolve every source into memory without writing anything.
    pub fn resolve(&self) -> Result<Resolution, CollectError> {
        let roots = self.config.roots();
        // Missing roots abort before any work starts.
        for (_, root) in &roots {
            check_root(root)?;
        }

        let mut resolution = Resolution::default();
        for (origin, root) in roots {
            self.resolve_root(origin, root, &mut resolution)?;
        }

        tracing::debug!(
            dashboards = resolution.dashboards.len(),
            skipped = resolution.skipped.len(),
            failures = resolution.failures.len(),
            "Resolved dashboards"
        );
        Ok(resolution)
    }

    fn resolve_root(
        &self,
        origin: SourceOrigin,
        root: &Path,
        resolution: &mut Resolution,
    ) -> Result<(), CollectError> {
        tracing::debug!("Scanning {} root {}", origin, root.display());
        let discovery = discover(root, &self.exclude, self.config.include_hidden)?;

        if let Some(failure) = discovery.errors.first() {
            if self.config.fail_fast {
                return Err(CollectError::Content(ContentError::Io {
                    path: failure.path.clone(),
                    source: std::io::Error::other(failure.message.clone()),
                }));
            }
        }
        resolution.failures.extend(discovery.errors);

        for path in discovery.files {
            if self.config.is_library_path(&path) {
                tracing::debug!("Skipping classpath file {}", path.display());
                continue;
            }

            let Some(creator) = self.select_creator(&path) else {
                tracing::debug!("Skipping unsupported file {}", path.display());
                resolution.skipped.push(path);
                continue;
            };

            let Some(name) = dashboard_name(&path) else {
                self.fail(resolution, ContentError::InvalidName { path })?;
                continue;
            };

            match creator.create_content(&path) {
                Ok(content) => {
                    tracing::debug!("Resolved {} from {}", name, path.display());
                    let source = DashboardSource::new(path, creator.kind(), origin);
                    resolution.insert(Dashboard::new(name, content, source));
                }
                Err(err) => self.fail(resolution, err)?,
            }
        }
        Ok(())
    }

    /// Run a full collection: resolve, then write `<name>.json` files.
    pub fn collect(&self) -> Result<CollectReport, CollectError> {
        let resolution = self.resolve()?;
        self.write(resolution)
    }

    /// Write resolved dashboards to the output directory.
    pub fn write(&self, resolution: Resolution) -> Result<CollectReport, CollectError> {
        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|e| CollectError::output(output_dir, e))?;

        let removed = if self.config.clean {
            remove_stale(output_dir)?
        } else {
            Vec::new()
        };

        let mut dashboards = Vec::with_capacity(resolution.dashboards.len());
        for dashboard in resolution.dashboards.into_values() {
            let path = write_atomic(output_dir, &dashboard.file_name(), &dashboard.content)?;
            dashboards.push(CollectedDashboard {
                size: dashboard.size(),
                name: dashboard.name,
                path,
                source: dashboard.source,
            });
        }

        tracing::info!(
            "Collected {} dashboard(s) into {}",
            dashboards.len(),
            output_dir.display()
        );

        Ok(CollectReport {
            output_dir: output_dir.clone(),
            dashboards,
            skipped: resolution.skipped,
            overrides: resolution.overrides,
            removed,
            failures: resolution.failures,
        })
    }
}

/// Replace `dir/file_name` as a whole file.
fn write_atomic(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, CollectError> {
    let target = dir.join(file_name);
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CollectError::output(dir, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| CollectError::output(tmp.path(), e))?;
    tmp.persist(&target)
        .map_err(|e| CollectError::output(&target, e.error))?;
    Ok(target)
}

/// Remove `*.json` files left by a previous run.
fn remove_stale(dir: &Path) -> Result<Vec<PathBuf>, CollectError> {
    let mut removed = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| CollectError::output(dir, e))? {
        let entry = entry.map_err(|e| CollectError::output(dir, e))?;
        let path = entry.path();
        let is_json = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json && path.is_file() {
            fs::remove_file(&path).map_err(|e| CollectError::output(&path, e))?;
            tracing::debug!("Removed stale {}", path.display());
            removed.push(path);
        }
    }
    removed.sort();
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Creator that claims every file and fails on request.
    struct Failing;

    impl ContentCreator for Failing {
        fn kind(&self) -> grafdash_core::SourceKind {
            grafdash_core::SourceKind::Static
        }

        fn is_supported(&self, path: &Path) -> bool {
            path.extension().is_some_and(|e| e == "bad")
        }

        fn create_content(&self, path: &Path) -> Result<String, ContentError> {
            Err(ContentError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("nope"),
            })
        }
    }

    fn config(root: &Path, out: &Path, fail_fast: bool) -> CollectConfig {
        CollectConfig::builder()
            .dir(root)
            .output_dir(out)
            .fail_fast(fail_fast)
            .build()
            .unwrap()
    }

    #[test]
    fn test_creator_priority_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("x.bad"), "").unwrap();
        fs::write(root.join("y.json"), "{}").unwrap();

        let creators: Vec<Box<dyn ContentCreator>> =
            vec![Box::new(Failing), Box::new(StaticContentCreator)];
        let collector =
            DashboardCollector::new(config(&root, &temp.path().join("out"), false), creators)
                .unwrap();
        let report = collector.collect().unwrap();

        assert_eq!(report.written(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("x.bad"));
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let temp = TempDir::new().unwrap();
        let path = write_atomic(temp.path(), "a.json", "{\"v\":1}").unwrap();
        write_atomic(temp.path(), "a.json", "{\"v\":2}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{\"v\":2}");
        // Only the target remains: no temporary files left behind.
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_remove_stale_only_json() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("old.json"), "{}").unwrap();
        fs::write(temp.path().join("README.md"), "keep").unwrap();
        let removed = remove_stale(temp.path()).unwrap();
        assert_eq!(removed, vec![temp.path().join("old.json")]);
        assert!(temp.path().join("README.md").exists());
    }

    #[test]
    fn test_resolve_does_not_write() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.json"), "{}").unwrap();
        let out = temp.path().join("out");

        let collector = DashboardCollector::with_default_creators(config(&root, &out, true)).unwrap();
        let resolution = collector.resolve().unwrap();
        assert_eq!(resolution.dashboards.len(), 1);
        assert!(!out.exists());
    }
}
