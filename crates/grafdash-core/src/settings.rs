//! Settings file loading.
//!
//! Every field is optional so that command-line flags can fill or override
//! what the file leaves out. [`Settings::collect_config`] and
//! [`Settings::upload_config`] turn the merged values into validated
//! configurations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{CollectConfig, Credentials, UploadConfig};
use crate::dashboard::Precedence;
use crate::error::ConfigError;

/// Settings file looked up in the working directory when none is named.
pub const DEFAULT_SETTINGS_FILE: &str = "grafdash.toml";

const DEFAULT_DIR: &str = "grafana";
const DEFAULT_OUTPUT_DIR: &str = "build/grafana-dashboards";

/// Contents of a settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub collect: CollectSettings,
    pub grafana: GrafanaSettings,
    pub extract: ExtractSettings,
}

/// `[collect]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectSettings {
    pub dir: Option<PathBuf>,
    pub artifact_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub classpath: Vec<PathBuf>,
    pub fail_fast: Option<bool>,
    pub precedence: Option<Precedence>,
    pub script_extensions: Option<Vec<String>>,
    pub exclude: Vec<String>,
    pub include_hidden: Option<bool>,
    pub clean: Option<bool>,
}

/// `[grafana]` section.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrafanaSettings {
    pub url: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub folder_uid: Option<String>,
    pub tags: Vec<String>,
    pub message: Option<String>,
    pub overwrite: Option<bool>,
    pub fail_fast: Option<bool>,
}

impl std::fmt::Debug for GrafanaSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrafanaSettings")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("folder_uid", &self.folder_uid)
            .field("tags", &self.tags)
            .field("message", &self.message)
            .field("overwrite", &self.overwrite)
            .field("fail_fast", &self.fail_fast)
            .finish()
    }
}

/// `[extract]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractSettings {
    /// Zip or jar archives holding dashboards.
    pub archives: Vec<PathBuf>,
    /// Target directory; falls back to `collect.artifact_dir`. Also used as
    /// the artifact root when `collect.artifact_dir` is unset.
    pub into: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from TOML text. `path` is used for error context.
    pub fn from_toml(content: &str, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.into(),
            message: e.to_string(),
        })
    }

    /// Load a settings file.
    ///
    /// With `required = false` a missing file yields default settings.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Build the validated collection configuration.
    pub fn collect_config(&self) -> Result<CollectConfig, ConfigError> {
        let c = &self.collect;
        let mut builder = CollectConfig::builder();
        builder
            .output_dir(self.output_dir())
            .classpath(c.classpath.clone())
            .exclude(c.exclude.clone());
        if let Some(dir) = self.directory_root() {
            builder.dir(dir);
        }
        if let Some(artifact_dir) = self.artifact_root() {
            builder.artifact_dir(artifact_dir);
        }
        if let Some(fail_fast) = c.fail_fast {
            builder.fail_fast(fail_fast);
        }
        if let Some(precedence) = c.precedence {
            builder.precedence(precedence);
        }
        if let Some(ref extensions) = c.script_extensions {
            builder.script_extensions(extensions.clone());
        }
        if let Some(include_hidden) = c.include_hidden {
            builder.include_hidden(include_hidden);
        }
        if let Some(clean) = c.clean {
            builder.clean(clean);
        }
        builder.build().map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })
    }

    /// Build the validated upload configuration.
    pub fn upload_config(&self) -> Result<UploadConfig, ConfigError> {
        let g = &self.grafana;
        let url = g
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ConfigError::missing("grafana.url"))?;
        let credentials = match (&g.token, &g.username, &g.password) {
            (Some(token), _, _) if !token.trim().is_empty() => Credentials::Token(token.clone()),
            (_, Some(username), Some(password)) => Credentials::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            _ => return Err(ConfigError::missing("grafana.token")),
        };

        let mut builder = UploadConfig::builder();
        builder
            .url(url)
            .credentials(credentials)
            .tags(g.tags.clone());
        if let Some(timeout) = g.timeout_secs {
            builder.timeout_secs(timeout);
        }
        if let Some(ref folder_uid) = g.folder_uid {
            builder.folder_uid(folder_uid.clone());
        }
        if let Some(ref message) = g.message {
            builder.message(message.clone());
        }
        if let Some(overwrite) = g.overwrite {
            builder.overwrite(overwrite);
        }
        if let Some(fail_fast) = g.fail_fast {
            builder.fail_fast(fail_fast);
        }
        builder.build().map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })
    }

    /// Directory collected dashboards are written to and uploaded from.
    pub fn output_dir(&self) -> PathBuf {
        self.collect
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Directory root for collection.
    ///
    /// An explicit `collect.dir` is always used. The `grafana` default is
    /// dropped when an artifact root is configured and the default directory
    /// does not exist.
    fn directory_root(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.collect.dir {
            return Some(dir.clone());
        }
        let default = PathBuf::from(DEFAULT_DIR);
        if self.artifact_root().is_none() || default.is_dir() {
            return Some(default);
        }
        tracing::debug!(
            "Default dashboard directory {} not found, collecting the artifact root only",
            default.display()
        );
        None
    }

    /// Artifact root: `collect.artifact_dir`, then `extract.into`.
    fn artifact_root(&self) -> Option<PathBuf> {
        self.collect
            .artifact_dir
            .clone()
            .or_else(|| self.extract.into.clone())
    }

    /// Directory archives are extracted into.
    pub fn extract_target(&self) -> Result<PathBuf, ConfigError> {
        self.extract
            .into
            .clone()
            .or_else(|| self.collect.artifact_dir.clone())
            .ok_or_else(|| ConfigError::missing("extract.into"))
    }

    /// Check that archives extracted by a full run land in the artifact root.
    pub fn check_extract_target(&self) -> Result<(), ConfigError> {
        if self.extract.archives.is_empty() {
            return Ok(());
        }
        let target = self.extract_target()?;
        match self.artifact_root() {
            Some(ref root) if *root == target => Ok(()),
            Some(root) => Err(ConfigError::Invalid {
                message: format!(
                    "extract.into ({}) differs from collect.artifact_dir ({}); extracted dashboards would not be collected",
                    target.display(),
                    root.display()
                ),
            }),
            None => Err(ConfigError::missing("collect.artifact_dir")),
        }
    }
}
