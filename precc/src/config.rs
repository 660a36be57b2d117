use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Filesystem surface the preprocessor depends on.
///
/// The core only ever probes for existence and reads whole files; routing
/// both through one trait keeps include resolution testable without touching
/// the real filesystem.
pub trait FileAccess {
    /// Whether `path` names an existing file.
    fn exists(&self, path: &Path) -> bool;
    /// Read the whole file at `path` into a string.
    ///
    /// # Errors
    /// Returns the underlying I/O error if the file cannot be read.
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// [`FileAccess`] implementation over `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFileAccess;

impl FileAccess for OsFileAccess {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Configuration for the preprocessor.
#[derive(Clone)]
pub struct PreprocessorConfig {
    /// Directories searched for system (`<...>`) includes, in order
    pub system_include_dirs: Vec<PathBuf>,
    /// Extension marking a file as header-style (without the dot)
    pub header_suffix: String,
    /// Extension of the implementation file paired with a header
    pub source_suffix: String,
    /// Whether including a header also pulls in its same-basename source file
    pub pair_sources: bool,
    /// Maximum include nesting depth
    pub max_include_depth: usize,
    /// Maximum include filename length in bytes
    pub max_filename_len: usize,
    /// Filesystem access used for resolution and reading
    pub file_access: Rc<dyn FileAccess>,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PreprocessorConfig {
    /// Create the default configuration: `/usr/include` and
    /// `/usr/local/include` as system directories, `.h`/`.c` pairing on,
    /// depth limit 64, filename bound 4096 bytes.
    #[must_use]
    pub fn new() -> Self {
        PreprocessorConfig {
            system_include_dirs: vec![
                PathBuf::from("/usr/include"),
                PathBuf::from("/usr/local/include"),
            ],
            header_suffix: "h".to_string(),
            source_suffix: "c".to_string(),
            pair_sources: true,
            max_include_depth: 64,
            max_filename_len: 4096,
            file_access: Rc::new(OsFileAccess),
        }
    }

    /// Replace the system include search directories.
    #[must_use]
    pub fn with_system_include_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.system_include_dirs = dirs;
        self
    }

    /// Enable or disable header/source pairing.
    #[must_use]
    pub fn with_pair_sources(mut self, pair: bool) -> Self {
        self.pair_sources = pair;
        self
    }

    /// Set the include nesting depth limit.
    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Substitute the filesystem implementation.
    #[must_use]
    pub fn with_file_access(mut self, fs: Rc<dyn FileAccess>) -> Self {
        self.file_access = fs;
        self
    }

    /// Whether `filename` is header-style under this configuration.
    #[must_use]
    pub fn is_header(&self, filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .is_some_and(|ext| ext == self.header_suffix.as_str())
    }

    /// Derive the implementation filename paired with a header name,
    /// e.g. `util.h` -> `util.c`.
    #[must_use]
    pub fn paired_source_name(&self, header: &str) -> String {
        Path::new(header)
            .with_extension(&self.source_suffix)
            .to_string_lossy()
            .into_owned()
    }
}
