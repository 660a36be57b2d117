use std::path::PathBuf;

/// Errors that can occur during preprocessing.
///
/// Every variant is detected synchronously; the engine logs a diagnostic at
/// the point of detection and the error then propagates out of the whole
/// preprocessing pass.
#[derive(thiserror::Error, Debug)]
pub enum PreprocessError {
    /// Malformed `#define` or `#include` directive
    #[error("malformed #{directive} directive: {reason}")]
    MalformedDirective {
        /// Directive name without the leading `#`
        directive: &'static str,
        /// Human-readable description of what was expected
        reason: &'static str,
    },
    /// System include `<...>` with no closing `>` before end of input
    #[error("unterminated system include")]
    UnterminatedSystemInclude,
    /// Reconstructed or requested include filename exceeds the configured bound
    #[error("include filename too long ({len} bytes, limit {limit})")]
    FilenameTooLong {
        /// Actual filename length in bytes
        len: usize,
        /// Configured maximum
        limit: usize,
    },
    /// Requested include file not found in any search location
    #[error("include file not found: {0}")]
    IncludeNotFound(String),
    /// Header-style include resolves to a file already being processed
    #[error("circular include detected: {}", .0.display())]
    CircularInclude(PathBuf),
    /// Include nesting went past the configured depth limit
    #[error("include depth limit ({0}) exceeded")]
    IncludeDepthExceeded(usize),
    /// The resolved include file could not be read
    #[error("error reading include file: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PreprocessError>;
