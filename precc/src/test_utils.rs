//! Shared helpers for unit tests.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::FileAccess;

/// In-memory [`FileAccess`] backed by a path-to-content map.
#[derive(Debug, Default)]
pub struct MemFs {
    files: HashMap<PathBuf, String>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder-style.
    pub fn file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl FileAccess for MemFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display()))
        })
    }
}
