//! Resource limits for script evaluation.
//!
//! Dashboard scripts run arbitrary user code at build time. The limits bound
//! what a single evaluation may consume so that a runaway script fails with
//! an error instead of hanging the collection run.

use serde::{Deserialize, Serialize};

/// Resource limits applied to a script engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineLimits {
    /// Maximum expression nesting depth (global and inside functions).
    pub max_expr_depth: usize,

    /// Maximum function call nesting.
    pub max_call_levels: usize,

    /// Maximum number of operations per evaluation (0 = unlimited).
    pub max_operations: u64,

    /// Maximum number of imported modules.
    pub max_modules: usize,

    /// Maximum string length in bytes.
    pub max_string_size: usize,

    /// Maximum array length.
    pub max_array_size: usize,

    /// Maximum object map size.
    pub max_map_size: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_expr_depth: 128,
            max_call_levels: 64,
            max_operations: 10_000_000,
            max_modules: 100,
            max_string_size: 16 * 1024 * 1024, // 16 MB, large dashboards
            max_array_size: 100_000,
            max_map_size: 100_000,
        }
    }
}

impl EngineLimits {
    /// Tight limits, for evaluating untrusted scripts.
    pub fn strict() -> Self {
        Self {
            max_expr_depth: 32,
            max_call_levels: 32,
            max_operations: 100_000,
            max_modules: 10,
            max_string_size: 1024 * 1024,
            max_array_size: 1000,
            max_map_size: 1000,
        }
    }

    /// Set the operation budget.
    pub fn with_max_operations(mut self, max_operations: u64) -> Self {
        self.max_operations = max_operations;
        self
    }
}
