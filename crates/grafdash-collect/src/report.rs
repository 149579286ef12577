//! Collection results.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use grafdash_core::{Dashboard, DashboardSource, FileFailure};

/// A dashboard written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedDashboard {
    /// Dashboard name.
    pub name: String,
    /// Written output file.
    pub path: PathBuf,
    /// Source the content came from.
    pub source: DashboardSource,
    /// Content size in bytes.
    pub size: u64,
}

/// A name collision resolved by precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    /// Dashboard name both sources map to.
    pub name: String,
    /// Source whose content is kept.
    pub kept: DashboardSource,
    /// Source whose content was discarded.
    pub replaced: DashboardSource,
}

/// Dashboards resolved in memory, before anything is written.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Winning dashboards keyed by name, in first-discovery order.
    pub dashboards: IndexMap<String, Dashboard>,
    /// Files no content creator supports.
    pub skipped: Vec<PathBuf>,
    /// Name collisions.
    pub overrides: Vec<Override>,
    /// Per-file failures.
    pub failures: Vec<FileFailure>,
}

impl Resolution {
    /// Insert a dashboard, replacing and recording any earlier one of the same name.
    pub(crate) fn insert(&mut self, dashboard: Dashboard) {
        let kept = dashboard.source.clone();
        if let Some(previous) = self.dashboards.insert(dashboard.name.clone(), dashboard) {
            tracing::warn!(
                "Dashboard '{}' from {} overrides {}",
                previous.name,
                kept.path.display(),
                previous.source.path.display()
            );
            self.overrides.push(Override {
                name: previous.name,
                kept,
                replaced: previous.source,
            });
        }
    }
}

/// Summary of a collection run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectReport {
    /// Output directory.
    pub output_dir: PathBuf,
    /// Dashboards written, in output order.
    pub dashboards: Vec<CollectedDashboard>,
    /// Files no content creator supports.
    pub skipped: Vec<PathBuf>,
    /// Name collisions resolved by precedence.
    pub overrides: Vec<Override>,
    /// Stale files removed before writing (`clean`).
    pub removed: Vec<PathBuf>,
    /// Per-file failures.
    pub failures: Vec<FileFailure>,
}

impl CollectReport {
    /// Number of dashboards written.
    pub fn written(&self) -> usize {
        self.dashboards.len()
    }

    /// Total bytes written.
    pub fn total_size(&self) -> u64 {
        self.dashboards.iter().map(|d| d.size).sum()
    }

    /// True when no per-file failure was recorded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Look up a written dashboard by name.
    pub fn dashboard(&self, name: &str) -> Option<&CollectedDashboard> {
        self.dashboards.iter().find(|d| d.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafdash_core::{SourceKind, SourceOrigin};

    fn dashboard(name: &str, path: &str, origin: SourceOrigin) -> Dashboard {
        Dashboard::new(
            name,
            "{}",
            DashboardSource::new(path, SourceKind::Static, origin),
        )
    }

    #[test]
    fn test_insert_records_override() {
        let mut resolution = Resolution::default();
        resolution.insert(dashboard("latency", "lib/latency.json", SourceOrigin::Artifact));
        resolution.insert(dashboard("errors", "lib/errors.json", SourceOrigin::Artifact));
        resolution.insert(dashboard("latency", "app/latency.json", SourceOrigin::Directory));

        assert_eq!(resolution.dashboards.len(), 2);
        assert_eq!(
            resolution.dashboards["latency"].source.origin,
            SourceOrigin::Directory
        );
        assert_eq!(resolution.overrides.len(), 1);
        assert_eq!(
            resolution.overrides[0].replaced.path,
            PathBuf::from("lib/latency.json")
        );
        // Position of the first discovery is kept.
        assert_eq!(resolution.dashboards.get_index(0).unwrap().0, "latency");
    }

    #[test]
    fn test_report_helpers() {
        let mut report = CollectReport::default();
        assert!(report.is_success());
        report.dashboards.push(CollectedDashboard {
            name: "a".into(),
            path: "out/a.json".into(),
            source: DashboardSource::new("a.json", SourceKind::Static, SourceOrigin::Directory),
            size: 7,
        });
        assert_eq!(report.written(), 1);
        assert_eq!(report.total_size(), 7);
        assert!(report.dashboard("a").is_some());
        assert!(report.dashboard("b").is_none());
    }
}
