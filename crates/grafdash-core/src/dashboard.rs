//! Dashboard sources and resolved dashboards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a dashboard source produces its JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceKind {
    /// JSON authored directly.
    Static,
    /// JSON produced by evaluating a script.
    Script,
}

/// Which source root a dashboard was discovered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceOrigin {
    /// Dashboards authored in the project itself.
    Directory,
    /// Dashboards extracted from upstream library artifacts.
    Artifact,
}

/// Which root wins when both produce a dashboard with the same name.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Precedence {
    /// Artifact dashboards are defaults; locally authored ones override them.
    #[default]
    #[serde(alias = "directory-wins")]
    Directory,
    /// Artifact dashboards override locally authored ones.
    #[serde(alias = "artifact-wins")]
    Artifact,
}

impl Precedence {
    /// Root processing order, lowest priority first.
    ///
    /// Later roots overwrite earlier ones, so the winning origin comes last.
    pub fn processing_order(self) -> [SourceOrigin; 2] {
        match self {
            Self::Directory => [SourceOrigin::Artifact, SourceOrigin::Directory],
            Self::Artifact => [SourceOrigin::Directory, SourceOrigin::Artifact],
        }
    }
}

/// A discovered dashboard definition file.
///
/// Identity is the path; a source is discovered fresh on every run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DashboardSource {
    /// Path to the definition file.
    pub path: PathBuf,
    /// Static JSON or script.
    pub kind: SourceKind,
    /// Root the file was found under.
    pub origin: SourceOrigin,
}

impl DashboardSource {
    /// Create a new dashboard source.
    pub fn new(path: impl Into<PathBuf>, kind: SourceKind, origin: SourceOrigin) -> Self {
        Self {
            path: path.into(),
            kind,
            origin,
        }
    }

    /// Dashboard name derived from the file's base name.
    pub fn name(&self) -> Option<String> {
        dashboard_name(&self.path)
    }
}

/// Derive a dashboard name from a file path by stripping the final extension.
///
/// `team/latency.json` becomes `latency`, `api.v2.kts` becomes `api.v2`.
pub fn dashboard_name(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

/// A resolved dashboard: a unique name and its JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Dashboard name, unique within one collection run.
    pub name: String,
    /// JSON text exactly as produced by the content creator.
    pub content: String,
    /// Where the content came from.
    pub source: DashboardSource,
}

impl Dashboard {
    /// Create a resolved dashboard.
    pub fn new(name: impl Into<String>, content: impl Into<String>, source: DashboardSource) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            source,
        }
    }

    /// File name used in the output directory.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }

    /// Content size in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_dashboard_name_strips_last_extension() {
        assert_eq!(dashboard_name(Path::new("a/b/latency.json")).as_deref(), Some("latency"));
        assert_eq!(dashboard_name(Path::new("api.v2.kts")).as_deref(), Some("api.v2"));
        assert_eq!(dashboard_name(Path::new("noext")).as_deref(), Some("noext"));
    }

    #[test]
    fn test_precedence_processing_order() {
        assert_eq!(
            Precedence::Directory.processing_order(),
            [SourceOrigin::Artifact, SourceOrigin::Directory]
        );
        assert_eq!(
            Precedence::Artifact.processing_order(),
            [SourceOrigin::Directory, SourceOrigin::Artifact]
        );
        assert_eq!(Precedence::default(), Precedence::Directory);
    }

    #[test]
    fn test_enum_strings() {
        assert_eq!(SourceKind::Script.to_string(), "script");
        assert_eq!(SourceOrigin::Artifact.to_string(), "artifact");
        assert_eq!(Precedence::from_str("artifact").unwrap(), Precedence::Artifact);
    }

    #[test]
    fn test_dashboard_file_name() {
        let source = DashboardSource::new("x/beta.kts", SourceKind::Script, SourceOrigin::Directory);
        let dashboard = Dashboard::new("beta", "{\"b\":2}", source);
        assert_eq!(dashboard.file_name(), "beta.json");
        assert_eq!(dashboard.size(), 7);
    }
}
