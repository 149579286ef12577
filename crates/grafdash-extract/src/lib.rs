//! Dashboard artifact extraction for grafdash.
//!
//! Libraries ship their dashboards as zip or jar archives. This crate
//! unpacks a set of such archives into one directory, which then serves as
//! the artifact root of a collection run.

mod error;
mod extract;

pub use error::ExtractError;
pub use extract::{Duplicate, ExtractReport, extract_archive, extract_archives};
