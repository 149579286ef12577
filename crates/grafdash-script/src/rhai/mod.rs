//! Rhai script engine.
//!
//! Rhai has a Rust-like syntax and is embedded directly, so scripted
//! dashboards need no external toolchain.

mod engine;

pub use engine::RhaiEngine;
