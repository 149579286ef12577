//! Error types for collection runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that resolve a single dashboard source.
///
/// These are per-file: under the collect-and-report policy they are recorded
/// and the run continues.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The source file could not be read.
    #[error("cannot read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source file is not valid UTF-8.
    #[error("file is not valid UTF-8: {path}")]
    InvalidUtf8 { path: PathBuf },

    /// The dashboard script failed to produce a JSON string.
    #[error("cannot evaluate dashboard script {path}: {message}")]
    ScriptEvaluation { path: PathBuf, message: String },

    /// No dashboard name can be derived from the file name.
    #[error("cannot derive a dashboard name from {path}")]
    InvalidName { path: PathBuf },
}

impl ContentError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::InvalidData {
            return Self::InvalidUtf8 { path };
        }
        Self::Io { path, source }
    }

    /// Path of the source that failed.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. }
            | Self::InvalidUtf8 { path }
            | Self::ScriptEvaluation { path, .. }
            | Self::InvalidName { path } => path,
        }
    }

    /// Failure category used in reports.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Io { .. } | Self::InvalidUtf8 { .. } => FailureKind::Read,
            Self::ScriptEvaluation { .. } => FailureKind::Script,
            Self::InvalidName { .. } => FailureKind::Name,
        }
    }
}

/// Errors that abort a whole collection run.
#[derive(Debug, Error)]
pub enum CollectError {
    /// A configured source root does not exist.
    #[error("dashboard root not found: {path}")]
    RootNotFound { path: PathBuf },

    /// A configured source root is not a directory.
    #[error("dashboard root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A per-file failure while fail-fast is enabled.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// The output directory could not be prepared or written.
    #[error("cannot write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CollectError {
    /// Create an error for a root that cannot be inspected.
    pub fn root(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::RootNotFound { path },
            _ => Self::Output { path, source },
        }
    }

    /// Create an output error with path context.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }
}

/// Errors in the configuration surface. Always fatal, raised before any work.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required option has no value.
    #[error("missing required option `{option}`")]
    Missing { option: String },

    /// An option has an unusable value.
    #[error("invalid configuration: {message}")]
    Invalid { message: String },

    /// The settings file could not be read.
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for the settings schema.
    #[error("cannot parse settings file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl ConfigError {
    pub fn missing(option: impl Into<String>) -> Self {
        Self::Missing {
            option: option.into(),
        }
    }
}

/// Category of a recorded per-file failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The file could not be read or decoded.
    Read,
    /// Script evaluation failed.
    Script,
    /// The file name does not yield a dashboard name.
    Name,
}

/// A per-file failure recorded in a collection report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// Source file that failed.
    pub path: PathBuf,
    /// Human-readable cause.
    pub message: String,
    /// Failure category.
    pub kind: FailureKind,
}

impl From<&ContentError> for FileFailure {
    fn from(err: &ContentError) -> Self {
        Self {
            path: err.path().clone(),
            message: err.to_string(),
            kind: err.kind(),
        }
    }
}
