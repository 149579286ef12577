//! Collection and upload configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::classpath::ClasspathSet;
use crate::dashboard::{Precedence, SourceOrigin};

/// Extensions recognized as dashboard scripts unless configured otherwise.
pub const DEFAULT_SCRIPT_EXTENSIONS: &[&str] = &["kts", "rhai"];

/// Configuration for one collection run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CollectConfig {
    /// Root with dashboards authored in the project.
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Root with dashboards extracted from library artifacts.
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,

    /// Flat directory receiving one `<name>.json` per dashboard.
    pub output_dir: PathBuf,

    /// Library locations for script evaluation. Files inside them are never
    /// collected, even when nested under a root.
    #[builder(default)]
    #[serde(default)]
    pub classpath: Vec<PathBuf>,

    /// Abort on the first per-file failure instead of collecting all.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub fail_fast: bool,

    /// Which root wins name collisions.
    #[builder(default)]
    #[serde(default)]
    pub precedence: Precedence,

    /// File extensions treated as dashboard scripts (without the dot).
    #[builder(default = "default_script_extensions()")]
    #[serde(default = "default_script_extensions")]
    pub script_extensions: Vec<String>,

    /// Glob patterns, relative to a root, of files to leave out.
    #[builder(default)]
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Include files or directories whose name starts with a dot.
    #[builder(default = "false")]
    #[serde(default)]
    pub include_hidden: bool,

    /// Remove existing `*.json` files from the output directory first.
    #[builder(default = "false")]
    #[serde(default)]
    pub clean: bool,
}

fn default_true() -> bool {
    true
}

fn default_script_extensions() -> Vec<String> {
    DEFAULT_SCRIPT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl CollectConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let dir = self.dir.as_ref().and_then(Option::as_ref);
        let artifact_dir = self.artifact_dir.as_ref().and_then(Option::as_ref);
        if dir.is_none() && artifact_dir.is_none() {
            return Err("At least one dashboard root is required".to_string());
        }
        match self.output_dir {
            Some(ref output) if output.as_os_str().is_empty() => {
                return Err("Output directory cannot be empty".to_string());
            }
            None => return Err("Output directory is required".to_string()),
            _ => {}
        }
        if let Some(ref extensions) = self.script_extensions {
            if extensions.iter().any(|e| e.trim_start_matches('.').is_empty()) {
                return Err("Script extensions cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl CollectConfig {
    /// Create a new collect config builder.
    pub fn builder() -> CollectConfigBuilder {
        CollectConfigBuilder::default()
    }

    /// Root configured for an origin.
    pub fn root(&self, origin: SourceOrigin) -> Option<&Path> {
        match origin {
            SourceOrigin::Directory => self.dir.as_deref(),
            SourceOrigin::Artifact => self.artifact_dir.as_deref(),
        }
    }

    /// Configured roots in processing order, lowest priority first.
    pub fn roots(&self) -> Vec<(SourceOrigin, &Path)> {
        self.precedence
            .processing_order()
            .into_iter()
            .filter_map(|origin| self.root(origin).map(|root| (origin, root)))
            .collect()
    }

    /// Check whether an extension (with or without the dot) marks a script.
    pub fn is_script_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        self.script_extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    /// Classpath for script evaluation.
    ///
    /// Holds only the configured library directories. Source roots are not
    /// added, every script under a root is collected as a dashboard.
    pub fn classpath_set(&self) -> ClasspathSet {
        self.classpath.iter().cloned().collect()
    }

    /// Check whether a path lies inside a classpath directory.
    pub fn is_library_path(&self, path: &Path) -> bool {
        self.classpath.iter().any(|lib| path.starts_with(lib))
    }
}

/// Grafana credentials.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Service account or API token sent as `Authorization: Bearer`.
    Token(String),
    /// HTTP basic authentication.
    Basic { username: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(***)"),
            Self::Basic { username, .. } => write!(f, "Basic({username}:***)"),
        }
    }
}

impl From<String> for Credentials {
    fn from(token: String) -> Self {
        Self::Token(token)
    }
}

impl From<&str> for Credentials {
    fn from(token: &str) -> Self {
        Self::Token(token.to_string())
    }
}

/// Configuration for uploading collected dashboards.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct UploadConfig {
    /// Base URL of the Grafana server.
    pub url: String,

    /// Credentials sent with every request.
    pub credentials: Credentials,

    /// Per-request timeout in seconds.
    #[builder(default = "30")]
    pub timeout_secs: u64,

    /// Folder receiving the dashboards.
    #[builder(setter(into, strip_option), default)]
    pub folder_uid: Option<String>,

    /// Tags added to every uploaded dashboard.
    #[builder(default)]
    pub tags: Vec<String>,

    /// Version history message.
    #[builder(setter(into, strip_option), default)]
    pub message: Option<String>,

    /// Replace existing dashboards with the same uid or title.
    #[builder(default = "true")]
    pub overwrite: bool,

    /// Stop at the first failed upload.
    #[builder(default = "false")]
    pub fail_fast: bool,
}

impl UploadConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.url.as_deref().map(str::trim) {
            None | Some("") => return Err("Grafana URL is required".to_string()),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                return Err(format!("Grafana URL must be http(s): {url}"));
            }
            _ => {}
        }
        if let Some(Credentials::Token(ref token)) = self.credentials {
            if token.trim().is_empty() {
                return Err("Grafana token cannot be empty".to_string());
            }
        }
        if self.timeout_secs == Some(0) {
            return Err("Timeout must be at least one second".to_string());
        }
        Ok(())
    }
}

impl UploadConfig {
    /// Create a new upload config builder.
    pub fn builder() -> UploadConfigBuilder {
        UploadConfigBuilder::default()
    }

    /// Dashboard import endpoint.
    pub fn dashboards_endpoint(&self) -> String {
        format!("{}/api/dashboards/db", self.url.trim().trim_end_matches('/'))
    }
}
