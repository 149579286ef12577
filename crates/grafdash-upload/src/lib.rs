//! Dashboard upload for grafdash.
//!
//! Collected `<name>.json` files are wrapped in Grafana's dashboard import
//! payload and published through a [`DashboardPublisher`]. The
//! [`GrafanaClient`] publisher talks to the Grafana HTTP API; other
//! publishers can stand in for it, for dry runs or in tests.

mod client;
mod error;
mod payload;
mod publisher;
mod uploader;

pub use client::GrafanaClient;
pub use error::UploadError;
pub use payload::build_payload;
pub use publisher::{DashboardPublisher, DryRunPublisher, PublishResponse};
pub use uploader::{
    DashboardUploader, UploadFailure, UploadReport, UploadedDashboard, dashboard_files,
};

// Re-export core types for convenience
pub use grafdash_core::{Credentials, UploadConfig};
