//! Library locations available to dashboard scripts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free set of library locations for script evaluation.
///
/// Built once per collection run and shared read-only by every script
/// evaluated in that run. Earlier entries are searched first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClasspathSet {
    entries: Vec<PathBuf>,
}

impl ClasspathSet {
    /// Create an empty classpath.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry unless it is already present.
    pub fn push(&mut self, entry: impl Into<PathBuf>) {
        let entry = entry.into();
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    /// Builder-style variant of [`push`](Self::push).
    pub fn with(mut self, entry: impl Into<PathBuf>) -> Self {
        self.push(entry);
        self
    }

    /// Entries in search order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Iterate entries in search order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for ClasspathSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<P: Into<PathBuf>> Extend<P> for ClasspathSet {
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}
