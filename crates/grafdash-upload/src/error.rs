//! Error types for dashboard upload.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while uploading dashboards.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The request could not be sent or its response not read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Grafana answered with a non-success status.
    #[error("Grafana responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The dashboard file is not valid JSON.
    #[error("invalid dashboard JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The JSON is valid but not a usable dashboard.
    #[error("invalid dashboard: {reason}")]
    InvalidDashboard { reason: String },

    /// A dashboard file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory of collected dashboards does not exist.
    #[error("dashboard output directory not found: {path}")]
    OutputNotFound { path: PathBuf },
}

impl UploadError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an error for an output directory that cannot be listed.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::OutputNotFound { path },
            _ => Self::Io { path, source },
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidDashboard {
            reason: reason.into(),
        }
    }
}
