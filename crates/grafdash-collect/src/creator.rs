//! Content creators: turn one dashboard source file into JSON text.

use std::fs;
use std::path::Path;

use grafdash_core::{ContentError, SourceKind};
use grafdash_script::ScriptEngine;

/// Produces a dashboard's JSON text from a single source file.
///
/// Creators are tried in a fixed priority order and the first one whose
/// [`is_supported`](Self::is_supported) returns true handles the file.
pub trait ContentCreator: Send + Sync {
    /// Kind of source this creator handles.
    fn kind(&self) -> SourceKind;

    /// Whether this creator handles the file.
    fn is_supported(&self, path: &Path) -> bool;

    /// Produce the dashboard JSON for the file.
    fn create_content(&self, path: &Path) -> Result<String, ContentError>;
}

/// Case-insensitive extension comparison.
fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension.trim_start_matches('.')))
}

fn read_source(path: &Path) -> Result<String, ContentError> {
    fs::read_to_string(path).map_err(|e| ContentError::io(path, e))
}

/// Passes `.json` files through unmodified.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticContentCreator;

impl StaticContentCreator {
    pub fn new() -> Self {
        Self
    }
}

impl ContentCreator for StaticContentCreator {
    fn kind(&self) -> SourceKind {
        SourceKind::Static
    }

    fn is_supported(&self, path: &Path) -> bool {
        has_extension(path, "json")
    }

    fn create_content(&self, path: &Path) -> Result<String, ContentError> {
        read_source(path)
    }
}

/// Evaluates dashboard scripts; the final string value is the JSON.
pub struct ScriptContentCreator<E: ScriptEngine = Box<dyn ScriptEngine>> {
    engine: E,
    extensions: Vec<String>,
}

impl<E: ScriptEngine> ScriptContentCreator<E> {
    /// Create a creator for the given script extensions (without the dot).
    ///
    /// The engine must already be initialized with the run's classpath.
    pub fn new(engine: E, extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            engine,
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a creator for the engine's own file extensions.
    pub fn with_engine_extensions(engine: E) -> Self {
        let extensions = engine.file_extensions().to_vec();
        Self::new(engine, extensions)
    }

    /// The underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Extensions treated as scripts.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl<E: ScriptEngine> ContentCreator for ScriptContentCreator<E> {
    fn kind(&self) -> SourceKind {
        SourceKind::Script
    }

    fn is_supported(&self, path: &Path) -> bool {
        self.extensions.iter().any(|ext| has_extension(path, ext))
    }

    fn create_content(&self, path: &Path) -> Result<String, ContentError> {
        let script = read_source(path)?;
        self.engine
            .evaluate(&script, path)
            .map_err(|e| ContentError::ScriptEvaluation {
                path: path.to_path_buf(),
                message: e.detail(),
            })
    }
}
