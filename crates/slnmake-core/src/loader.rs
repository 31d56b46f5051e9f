//! The project-loading capability handed to the assembler.
//!
//! Core code never touches storage. Whatever drives a conversion supplies a
//! [`ProjectLoader`] that maps a solution-relative manifest path to its text.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Why a manifest could not be produced.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("not found")]
    NotFound,

    #[error("unreadable: {0}")]
    Unreadable(String),
}

/// Path-keyed text loading.
pub trait ProjectLoader {
    /// Load the manifest at `path`, relative to the solution directory.
    fn load(&self, path: &Path) -> Result<String, LoadError>;
}

impl<F> ProjectLoader for F
where
    F: Fn(&Path) -> Result<String, LoadError>,
{
    fn load(&self, path: &Path) -> Result<String, LoadError> {
        self(path)
    }
}

/// Loader backed by an in-memory map, keyed by `/`-separated paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a manifest; builder-style.
    pub fn with(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.files.insert(path.as_ref().to_path_buf(), text.into());
    }
}

impl ProjectLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<String, LoadError> {
        self.files.get(path).cloned().ok_or(LoadError::NotFound)
    }
}
