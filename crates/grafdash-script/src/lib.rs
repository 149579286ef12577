//! Script engine adapter for grafdash.
//!
//! Scripted dashboards are ordinary script files whose final expression is
//! the dashboard JSON as a string. This crate hides the scripting runtime
//! behind the [`ScriptEngine`] trait so that the collector never depends on
//! a particular language.
//!
//! # Runtimes
//!
//! - [`rhai::RhaiEngine`]: Rhai with helper modules resolved from the
//!   classpath.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use grafdash_core::ClasspathSet;
//! use grafdash_script::{ScriptEngine, rhai::RhaiEngine};
//!
//! let classpath = ClasspathSet::new().with("grafana/lib");
//! let engine = RhaiEngine::with_classpath(&classpath).unwrap();
//! let json = engine
//!     .evaluate(r#"json(#{ title: "Latency", panels: [] })"#, Path::new("latency.rhai"))
//!     .unwrap();
//! assert!(json.contains("Latency"));
//! ```

mod limits;
pub mod rhai;
mod runtime;
mod types;

pub use limits::EngineLimits;
pub use runtime::ScriptEngine;
pub use types::{ScriptError, ScriptResult};
