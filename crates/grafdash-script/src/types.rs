//! Core types for script evaluation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for script operations.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors that can occur while evaluating a dashboard script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// `evaluate` was called before `initialize`.
    #[error("script engine '{engine}' used before initialization")]
    NotInitialized { engine: &'static str },

    /// The script does not parse.
    #[error("syntax error in {origin}: {message}")]
    Compile { origin: PathBuf, message: String },

    /// The script raised an error while running.
    #[error("runtime error in {origin}: {message}")]
    Runtime { origin: PathBuf, message: String },

    /// The final expression is not a string.
    #[error("script {origin} must evaluate to a string, got {type_name}")]
    NotAString { origin: PathBuf, type_name: String },
}

impl ScriptError {
    /// The cause without the script path, for reports that already show it.
    pub fn detail(&self) -> String {
        match self {
            Self::NotInitialized { .. } => self.to_string(),
            Self::Compile { message, .. } => format!("syntax error: {message}"),
            Self::Runtime { message, .. } => format!("runtime error: {message}"),
            Self::NotAString { type_name, .. } => {
                format!("expected a string result, got {type_name}")
            }
        }
    }
}
