//! Grafana HTTP API client.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use grafdash_core::{Credentials, UploadConfig};

use crate::error::UploadError;
use crate::publisher::{DashboardPublisher, PublishResponse};

/// Longest response body kept in a status error.
const MAX_ERROR_BODY: usize = 512;

/// Publishes dashboards through `POST /api/dashboards/db`.
pub struct GrafanaClient {
    client: Client,
    endpoint: String,
    credentials: Credentials,
}

impl GrafanaClient {
    /// Create a client for the configured server.
    pub fn new(config: &UploadConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("grafdash/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.dashboards_endpoint(),
            credentials: config.credentials.clone(),
        })
    }

    /// Endpoint dashboards are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl DashboardPublisher for GrafanaClient {
    fn publish(&self, name: &str, payload: &Value) -> Result<PublishResponse, UploadError> {
        tracing::debug!("POST {} for '{}'", self.endpoint, name);

        let request = self.client.post(&self.endpoint).json(payload);
        let request = match &self.credentials {
            Credentials::Token(token) => request.bearer_auth(token),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        };

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(UploadError::Status {
                status: status.as_u16(),
                body: truncate(body.trim(), MAX_ERROR_BODY),
            });
        }

        Ok(response.json::<PublishResponse>()?)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
