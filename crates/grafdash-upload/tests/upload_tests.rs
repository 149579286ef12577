//! Upload orchestration against a recording publisher.

use std::fs;
use std::sync::Mutex;

use grafdash_upload::{
    DashboardPublisher, DashboardUploader, DryRunPublisher, PublishResponse, UploadConfig,
    UploadError,
};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Records every payload and fails for selected dashboards.
#[derive(Default)]
struct Recording {
    published: Mutex<Vec<(String, Value)>>,
    reject: Vec<&'static str>,
}

impl Recording {
    fn rejecting(names: &[&'static str]) -> Self {
        Self {
            reject: names.to_vec(),
            ..Default::default()
        }
    }

    fn names(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl DashboardPublisher for Recording {
    fn publish(&self, name: &str, payload: &Value) -> Result<PublishResponse, UploadError> {
        self.published
            .lock()
            .unwrap()
            .push((name.to_string(), payload.clone()));
        if self.reject.iter().any(|r| *r == name) {
            return Err(UploadError::Status {
                status: 412,
                body: r#"{"message":"version-mismatch"}"#.to_string(),
            });
        }
        Ok(PublishResponse {
            uid: Some(format!("uid-{name}")),
            url: Some(format!("/d/uid-{name}/{name}")),
            status: Some("success".to_string()),
            version: Some(1),
            ..Default::default()
        })
    }
}

fn config(fail_fast: bool) -> UploadConfig {
    UploadConfig::builder()
        .url("http://grafana:3000")
        .credentials("secret")
        .tags(vec!["generated".to_string()])
        .fail_fast(fail_fast)
        .build()
        .unwrap()
}

fn output_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("alpha.json"), r#"{"id":7,"title":"Alpha"}"#).unwrap();
    fs::write(temp.path().join("beta.json"), r#"{"title":"Beta","tags":["x"]}"#).unwrap();
    fs::write(temp.path().join("gamma.json"), r#"{"title":"Gamma"}"#).unwrap();
    fs::write(temp.path().join("README.md"), "not a dashboard").unwrap();
    temp
}

#[test]
fn test_uploads_every_dashboard_in_order() {
    let dir = output_dir();
    let publisher = Recording::default();
    let uploader = DashboardUploader::new(config(false), &publisher);

    let report = uploader.upload_dir(dir.path()).unwrap();

    assert!(report.is_success());
    assert_eq!(publisher.names(), vec!["alpha", "beta", "gamma"]);
    assert_eq!(report.uploaded[0].uid.as_deref(), Some("uid-alpha"));
    assert_eq!(report.uploaded[2].url.as_deref(), Some("/d/uid-gamma/gamma"));

    let published = publisher.published.lock().unwrap();
    assert_eq!(
        published[0].1,
        json!({
            "dashboard": {"id": null, "title": "Alpha", "tags": ["generated"]},
            "overwrite": true
        })
    );
    assert_eq!(published[1].1["dashboard"]["tags"], json!(["x", "generated"]));
}

#[test]
fn test_failures_are_recorded_and_run_continues() {
    let dir = output_dir();
    let publisher = Recording::rejecting(&["beta"]);
    let uploader = DashboardUploader::new(config(false), &publisher);

    let report = uploader.upload_dir(dir.path()).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "beta");
    assert!(report.failures[0].message.contains("412"));
    assert_eq!(publisher.names(), vec!["alpha", "beta", "gamma"]);
}

#[test]
fn test_fail_fast_stops_at_first_failure() {
    let dir = output_dir();
    let publisher = Recording::rejecting(&["beta"]);
    let uploader = DashboardUploader::new(config(true), &publisher);

    let report = uploader.upload_dir(dir.path()).unwrap();

    assert_eq!(report.uploaded.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(publisher.names(), vec!["alpha", "beta"]);
}

#[test]
fn test_invalid_dashboard_is_not_published() {
    let dir = output_dir();
    fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
    let publisher = Recording::default();
    let uploader = DashboardUploader::new(config(false), &publisher);

    let report = uploader.upload_dir(dir.path()).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "broken");
    assert!(!publisher.names().contains(&"broken".to_string()));
}

#[test]
fn test_missing_output_dir_is_fatal() {
    let temp = TempDir::new().unwrap();
    let uploader = DashboardUploader::new(config(false), Recording::default());

    let err = uploader.upload_dir(&temp.path().join("missing")).unwrap_err();

    assert!(matches!(err, UploadError::OutputNotFound { .. }));
}

#[test]
fn test_dry_run_publisher() {
    let dir = output_dir();
    let uploader = DashboardUploader::new(config(false), DryRunPublisher);

    let report = uploader.upload_dir(dir.path()).unwrap();

    assert!(report.is_success());
    assert_eq!(report.uploaded.len(), 3);
    assert!(report.uploaded.iter().all(|d| d.uid.is_none()));
}
