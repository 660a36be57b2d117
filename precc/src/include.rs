//! Include-file search and include-stack bookkeeping.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;

use crate::config::{FileAccess, PreprocessorConfig};
use crate::error::{PreprocessError, Result};

/// Stack of files currently open for inclusion, innermost last.
///
/// The top entry is always the file whose tokens are being produced; it
/// anchors relative resolution for that file's own includes and backs the
/// circular-include check for header-style files.
#[derive(Debug, Default)]
pub struct IncludeStack {
    entries: Vec<PathBuf>,
}

impl IncludeStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a file onto the stack as it starts being processed.
    pub fn push(&mut self, filename: impl Into<PathBuf>) {
        self.entries.push(filename.into());
    }

    /// Remove the innermost entry. Popping an empty stack is a no-op.
    pub fn pop(&mut self) {
        self.entries.pop();
    }

    /// The file currently being processed, if any.
    #[must_use]
    pub fn top(&self) -> Option<&Path> {
        self.entries.last().map(PathBuf::as_path)
    }

    /// Whether `path` is already somewhere on the stack (cycle check).
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|entry| entry == path)
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}

/// Search-path resolution for `#include` targets.
pub struct IncludeResolver {
    system_dirs: Vec<PathBuf>,
    max_filename_len: usize,
    fs: Rc<dyn FileAccess>,
}

impl IncludeResolver {
    /// Build a resolver from the preprocessor configuration.
    #[must_use]
    pub fn new(config: &PreprocessorConfig) -> Self {
        IncludeResolver {
            system_dirs: config.system_include_dirs.clone(),
            max_filename_len: config.max_filename_len,
            fs: Rc::clone(&config.file_access),
        }
    }

    /// Resolve an include target to the first existing path.
    ///
    /// Search order: the directory containing `current_file` (when given),
    /// then the filename as-is against the working directory, then — for
    /// system includes only — each configured system directory in order.
    /// `Ok(None)` means no search location had the file; the caller decides
    /// whether that is fatal.
    ///
    /// # Errors
    /// Returns [`PreprocessError::FilenameTooLong`] before any filesystem
    /// access if `filename` exceeds the configured bound.
    pub fn resolve(
        &self,
        filename: &str,
        is_system: bool,
        current_file: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        if filename.len() > self.max_filename_len {
            return Err(PreprocessError::FilenameTooLong {
                len: filename.len(),
                limit: self.max_filename_len,
            });
        }

        if let Some(current) = current_file
            && let Some(dir) = current.parent()
        {
            let candidate = dir.join(filename);
            if self.fs.exists(&candidate) {
                debug!("resolved {filename:?} next to {}", current.display());
                return Ok(Some(candidate));
            }
        }

        let bare = Path::new(filename);
        if self.fs.exists(bare) {
            debug!("resolved {filename:?} against the working directory");
            return Ok(Some(bare.to_path_buf()));
        }

        if is_system {
            for dir in &self.system_dirs {
                let candidate = dir.join(filename);
                if self.fs.exists(&candidate) {
                    debug!("resolved <{filename}> in {}", dir.display());
                    return Ok(Some(candidate));
                }
            }
        }

        debug!("no match for {filename:?} (system: {is_system})");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MemFs;

    fn resolver(fs: MemFs) -> IncludeResolver {
        let config = PreprocessorConfig::new()
            .with_system_include_dirs(vec![
                PathBuf::from("/usr/include"),
                PathBuf::from("/usr/local/include"),
            ])
            .with_file_access(Rc::new(fs));
        IncludeResolver::new(&config)
    }

    #[test]
    fn stack_discipline() {
        let mut stack = IncludeStack::new();
        assert_eq!(stack.top(), None);
        stack.pop(); // no-op on empty

        stack.push("/x/a.c");
        stack.push("/x/b.h");
        assert_eq!(stack.top(), Some(Path::new("/x/b.h")));
        assert_eq!(stack.depth(), 2);
        assert!(stack.contains(Path::new("/x/a.c")));

        stack.pop();
        assert_eq!(stack.top(), Some(Path::new("/x/a.c")));
        assert!(!stack.contains(Path::new("/x/b.h")));
    }

    #[test]
    fn current_file_directory_wins() {
        let fs = MemFs::new()
            .file("/x/y/foo.h", "")
            .file("foo.h", "")
            .file("/usr/include/foo.h", "");
        let r = resolver(fs);
        let found = r
            .resolve("foo.h", false, Some(Path::new("/x/y/main.c")))
            .unwrap();
        assert_eq!(found, Some(PathBuf::from("/x/y/foo.h")));
    }

    #[test]
    fn working_directory_before_system_paths() {
        let fs = MemFs::new().file("foo.h", "").file("/usr/include/foo.h", "");
        let r = resolver(fs);
        let found = r
            .resolve("foo.h", true, Some(Path::new("/x/y/main.c")))
            .unwrap();
        assert_eq!(found, Some(PathBuf::from("foo.h")));
    }

    #[test]
    fn system_path_fallback_only_for_system_includes() {
        let fs = MemFs::new().file("/usr/include/stdio.h", "");
        let r = resolver(fs);

        let system = r
            .resolve("stdio.h", true, Some(Path::new("/x/y/main.c")))
            .unwrap();
        assert_eq!(system, Some(PathBuf::from("/usr/include/stdio.h")));

        let quoted = r
            .resolve("stdio.h", false, Some(Path::new("/x/y/main.c")))
            .unwrap();
        assert_eq!(quoted, None);
    }

    #[test]
    fn system_dirs_searched_in_order() {
        let fs = MemFs::new()
            .file("/usr/include/both.h", "")
            .file("/usr/local/include/both.h", "");
        let r = resolver(fs);
        let found = r.resolve("both.h", true, None).unwrap();
        assert_eq!(found, Some(PathBuf::from("/usr/include/both.h")));
    }

    #[test]
    fn overlong_filename_rejected_before_lookup() {
        let r = resolver(MemFs::new());
        let long = "a".repeat(5000);
        let err = r.resolve(&long, false, None).unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::FilenameTooLong { len: 5000, limit: 4096 }
        ));
    }
}
