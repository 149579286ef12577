//! Upload orchestration over a directory of collected dashboards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use grafdash_core::{UploadConfig, dashboard_name};

use crate::client::GrafanaClient;
use crate::error::UploadError;
use crate::payload::build_payload;
use crate::publisher::DashboardPublisher;

/// A dashboard Grafana accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDashboard {
    pub name: String,
    pub path: PathBuf,
    pub uid: Option<String>,
    pub url: Option<String>,
    pub version: Option<u64>,
}

/// A dashboard that could not be uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFailure {
    pub name: String,
    pub path: PathBuf,
    pub message: String,
}

/// Summary of an upload run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadReport {
    pub uploaded: Vec<UploadedDashboard>,
    pub failures: Vec<UploadFailure>,
}

impl UploadReport {
    /// True when every dashboard was uploaded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Uploads collected dashboards through a publisher.
pub struct DashboardUploader<P: DashboardPublisher = GrafanaClient> {
    config: UploadConfig,
    publisher: P,
}

impl DashboardUploader<GrafanaClient> {
    /// Create an uploader talking to the configured Grafana server.
    pub fn from_config(config: UploadConfig) -> Result<Self, UploadError> {
        let publisher = GrafanaClient::new(&config)?;
        Ok(Self::new(config, publisher))
    }
}

impl<P: DashboardPublisher> DashboardUploader<P> {
    pub fn new(config: UploadConfig, publisher: P) -> Self {
        Self { config, publisher }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Upload every `*.json` file in `dir`, in file name order.
    pub fn upload_dir(&self, dir: &Path) -> Result<UploadReport, UploadError> {
        let files = dashboard_files(dir)?;
        let mut report = UploadReport::default();

        for path in files {
            let name = dashboard_name(&path).unwrap_or_default();
            match self.upload_file(&name, &path) {
                Ok(uploaded) => {
                    tracing::info!(
                        "Uploaded '{}' ({})",
                        uploaded.name,
                        uploaded.url.as_deref().unwrap_or("no url")
                    );
                    report.uploaded.push(uploaded);
                }
                Err(err) => {
                    tracing::error!("Failed to upload '{}': {}", name, err);
                    report.failures.push(UploadFailure {
                        name,
                        path,
                        message: err.to_string(),
                    });
                    if self.config.fail_fast {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            "Uploaded {} dashboard(s), {} failed",
            report.uploaded.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Upload a single dashboard file as `name`.
    pub fn upload_file(&self, name: &str, path: &Path) -> Result<UploadedDashboard, UploadError> {
        let content = fs::read_to_string(path).map_err(|e| UploadError::io(path, e))?;
        let payload = build_payload(&content, &self.config)?;
        let response = self.publisher.publish(name, &payload)?;

        Ok(UploadedDashboard {
            name: name.to_string(),
            path: path.to_path_buf(),
            uid: response.uid,
            url: response.url,
            version: response.version,
        })
    }
}

/// `*.json` files directly inside `dir`, sorted by path.
pub fn dashboard_files(dir: &Path) -> Result<Vec<PathBuf>, UploadError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| UploadError::output(dir, e))? {
        let path = entry.map_err(|e| UploadError::io(dir, e))?.path();
        let is_json = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dashboard_files_sorted_json_only() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.json"), "{}").unwrap();
        fs::write(temp.path().join("a.JSON"), "{}").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        fs::create_dir(temp.path().join("dir.json")).unwrap();

        let files = dashboard_files(temp.path()).unwrap();
        assert_eq!(
            files,
            vec![temp.path().join("a.JSON"), temp.path().join("b.json")]
        );
    }

    #[test]
    fn test_dashboard_files_missing_dir() {
        let temp = TempDir::new().unwrap();
        let err = dashboard_files(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, UploadError::OutputNotFound { .. }));
    }
}
