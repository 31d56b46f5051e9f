//! Loading project manifests from disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use slnmake_core::loader::{LoadError, ProjectLoader};

/// Reads manifests relative to the solution directory.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ProjectLoader for FsLoader {
    fn load(&self, path: &Path) -> Result<String, LoadError> {
        let full = self.root.join(path);
        std::fs::read_to_string(&full).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LoadError::NotFound,
            _ => LoadError::Unreadable(e.to_string()),
        })
    }
}
