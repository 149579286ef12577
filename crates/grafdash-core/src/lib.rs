//! Core types and configuration for grafdash.
//!
//! This crate provides the data model shared by every stage of a collection
//! run: dashboard sources, resolved dashboards, the script classpath, the
//! error taxonomy and the configuration surface.

mod classpath;
mod config;
mod dashboard;
mod error;
mod settings;

pub use classpath::ClasspathSet;
pub use config::{
    CollectConfig, CollectConfigBuilder, Credentials, UploadConfig, UploadConfigBuilder,
    DEFAULT_SCRIPT_EXTENSIONS,
};
pub use dashboard::{
    dashboard_name, Dashboard, DashboardSource, Precedence, SourceKind, SourceOrigin,
};
pub use error::{CollectError, ConfigError, ContentError, FailureKind, FileFailure};
pub use settings::{
    CollectSettings, ExtractSettings, GrafanaSettings, Settings, DEFAULT_SETTINGS_FILE,
};
