//! Script engine trait.
//!
//! This module defines the language-agnostic [`ScriptEngine`] trait that
//! every scripting runtime used for dashboard generation must satisfy.

use std::path::Path;

use grafdash_core::ClasspathSet;

use crate::types::ScriptResult;

/// A scripting runtime that turns a dashboard script into JSON text.
///
/// One engine instance serves a whole collection run. It is configured once
/// with the run's classpath and then evaluates scripts one at a time; callers
/// must not evaluate concurrently against the same instance.
pub trait ScriptEngine: Send + Sync {
    /// Name of this runtime (e.g. "rhai").
    fn name(&self) -> &'static str;

    /// File extensions natively handled by this runtime, without the dot.
    fn file_extensions(&self) -> &'static [&'static str];

    /// Configure the libraries scripts may import.
    ///
    /// Must be called before [`evaluate`](Self::evaluate). Calling it again
    /// replaces the previous classpath.
    fn initialize(&mut self, classpath: &ClasspathSet) -> ScriptResult<()>;

    /// Whether [`initialize`](Self::initialize) has been called.
    fn is_initialized(&self) -> bool;

    /// Run a script to completion and return its final value as a string.
    ///
    /// `origin` is the script's path, used to resolve relative imports and
    /// in error messages.
    fn evaluate(&self, source: &str, origin: &Path) -> ScriptResult<String>;
}

impl<E: ScriptEngine + ?Sized> ScriptEngine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        (**self).file_extensions()
    }

    fn initialize(&mut self, classpath: &ClasspathSet) -> ScriptResult<()> {
        (**self).initialize(classpath)
    }

    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }

    fn evaluate(&self, source: &str, origin: &Path) -> ScriptResult<String> {
        (**self).evaluate(source, origin)
    }
}
