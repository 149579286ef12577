//! The seam between upload orchestration and transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::UploadError;

/// Grafana's answer to a dashboard import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishResponse {
    pub id: Option<u64>,
    pub uid: Option<String>,
    pub url: Option<String>,
    pub status: Option<String>,
    pub version: Option<u64>,
    pub slug: Option<String>,
}

/// Sends one dashboard payload somewhere.
pub trait DashboardPublisher {
    /// Publish the payload built for dashboard `name`.
    fn publish(&self, name: &str, payload: &Value) -> Result<PublishResponse, UploadError>;
}

impl<P: DashboardPublisher + ?Sized> DashboardPublisher for &P {
    fn publish(&self, name: &str, payload: &Value) -> Result<PublishResponse, UploadError> {
        (**self).publish(name, payload)
    }
}

impl<P: DashboardPublisher + ?Sized> DashboardPublisher for Box<P> {
    fn publish(&self, name: &str, payload: &Value) -> Result<PublishResponse, UploadError> {
        (**self).publish(name, payload)
    }
}

/// Publisher that only logs what would be sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunPublisher;

impl DashboardPublisher for DryRunPublisher {
    fn publish(&self, name: &str, payload: &Value) -> Result<PublishResponse, UploadError> {
        let dashboard = &payload["dashboard"];
        tracing::info!(
            "Dry run: would upload '{}' (uid {})",
            name,
            dashboard["uid"].as_str().unwrap_or("-")
        );
        Ok(PublishResponse {
            uid: dashboard["uid"].as_str().map(str::to_string),
            status: Some("dry-run".to_string()),
            ..Default::default()
        })
    }
}
