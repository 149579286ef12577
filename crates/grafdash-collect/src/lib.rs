//! Dashboard collection for grafdash.
//!
//! This crate turns a mixed tree of static and scripted dashboard sources
//! into a flat directory of `<name>.json` files:
//!
//! 1. Each configured root is walked in a deterministic order
//! 2. Every file is handed to the first [`ContentCreator`] that supports it
//! 3. Results are merged by name, following the configured precedence
//! 4. Each dashboard is written to the output directory as a whole file
//!
//! # Example
//!
//! ```rust,no_run
//! use grafdash_collect::DashboardCollector;
//! use grafdash_core::CollectConfig;
//!
//! let config = CollectConfig::builder()
//!     .dir("grafana")
//!     .artifact_dir("build/grafana")
//!     .output_dir("build/grafana-dashboards")
//!     .build()
//!     .unwrap();
//!
//! let collector = DashboardCollector::with_default_creators(config).unwrap();
//! let report = collector.collect().unwrap();
//!
//! println!("Collected {} dashboards", report.written());
//! for failure in &report.failures {
//!     eprintln!("{}: {}", failure.path.display(), failure.message);
//! }
//! ```

mod collector;
mod creator;
mod discover;
mod report;

pub use collector::DashboardCollector;
pub use creator::{ContentCreator, ScriptContentCreator, StaticContentCreator};
pub use discover::{Discovery, discover};
pub use report::{CollectReport, CollectedDashboard, Override, Resolution};

// Re-export core types for convenience
pub use grafdash_core::{CollectConfig, CollectError, Dashboard, FileFailure, Precedence};
