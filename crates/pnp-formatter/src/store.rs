//! Sources for templates referenced through `SharePointProvisioningTemplateFile`.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::FormatterError;

/// Fetches a named document referenced from a provisioning wrapper.
pub trait DocumentStore {
    /// Return the full contents of `name`.
    ///
    /// Failing to produce the document is reported as
    /// [`FormatterError::UnresolvedReference`].
    fn get_file_stream(&self, name: &str) -> Result<Bytes, FormatterError>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn get_file_stream(&self, name: &str) -> Result<Bytes, FormatterError> {
        (**self).get_file_stream(name)
    }
}

/// In-memory store keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<String, Bytes>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, contents: impl Into<Bytes>) {
        self.files.insert(name.into(), contents.into());
    }

    pub fn with_file(mut self, name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        self.insert(name, contents);
        self
    }
}

impl DocumentStore for MemoryStore {
    fn get_file_stream(&self, name: &str) -> Result<Bytes, FormatterError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| FormatterError::UnresolvedReference(name.to_string()))
    }
}

/// Store reading files below a root directory.
///
/// Names are interpreted relative to the root; absolute names and names that
/// climb out of the root with `..` are refused.
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    root: PathBuf,
}

impl FileSystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSystemStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let confined = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        confined.then(|| self.root.join(relative))
    }
}

impl DocumentStore for FileSystemStore {
    fn get_file_stream(&self, name: &str) -> Result<Bytes, FormatterError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| FormatterError::UnresolvedReference(format!("{name}: outside store root")))?;
        debug!(path = %path.display(), "reading referenced template");
        std::fs::read(&path)
            .map(Bytes::from)
            .map_err(|err| FormatterError::UnresolvedReference(format!("{name}: {err}")))
    }
}
