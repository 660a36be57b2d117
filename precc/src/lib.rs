#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # precc
//!
//! The preprocessing stage of a small C compiler front end: it resolves
//! `#include` directives (quoted and `<...>` forms), expands single-token
//! object-style `#define` macros, and produces one flat, fully expanded
//! token stream ready for parsing.
//!
//! ## Behavior in brief
//!
//! - Includes resolve against the including file's directory first, then the
//!   working directory, then (for `<...>` only) the configured system
//!   directories.
//! - Including a header also pulls in its same-basename implementation file
//!   when one resolves (configurable).
//! - Header-style includes are cycle-checked against the stack of files
//!   currently being processed; all includes are bounded by a depth limit.
//! - Each file gets its own macro table: macros never leak across file
//!   boundaries in either direction.
//!
//! ## Example
//!
//! ```rust
//! use precc::{preprocess_tokens, tokenize, Token};
//!
//! let tokens = tokenize("#define LIMIT 64\nint cap = LIMIT;");
//! let out = preprocess_tokens(&tokens, None).unwrap();
//! assert!(out.contains(&Token::Num(64)));
//! ```

mod config;
mod error;
mod include;
mod lexer;
mod macro_table;
mod preprocessor;
#[cfg(test)]
mod test_utils;
mod token;

pub use config::{FileAccess, OsFileAccess, PreprocessorConfig};
pub use error::PreprocessError;
pub use include::{IncludeResolver, IncludeStack};
pub use lexer::{convert_keywords, tokenize};
pub use macro_table::MacroTable;
pub use preprocessor::Preprocessor;
pub use token::Token;

use std::path::Path;

/// Preprocess an already-tokenized chain with the default configuration.
///
/// `file` is the path the tokens came from, if known; it seeds the include
/// stack and anchors relative resolution for the file's own includes.
///
/// # Errors
/// Returns `PreprocessError` if any directive is malformed, an include
/// cannot be resolved or read, or a header cycle is detected.
pub fn preprocess_tokens(
    tokens: &[Token],
    file: Option<&Path>,
) -> Result<Vec<Token>, PreprocessError> {
    Preprocessor::new().preprocess(tokens, file)
}

/// Tokenize and preprocess raw source text with the given configuration.
///
/// The input has no originating file, so its includes resolve against the
/// working directory and the system directories only.
///
/// # Errors
/// Returns `PreprocessError` if preprocessing fails.
pub fn preprocess_source(
    input: &str,
    config: &PreprocessorConfig,
) -> Result<Vec<Token>, PreprocessError> {
    let tokens = tokenize(input);
    Preprocessor::with_config(config.clone()).preprocess(&tokens, None)
}

/// Read, tokenize, and preprocess a source file.
///
/// The file itself seeds the include stack, so its includes resolve relative
/// to its containing directory first.
///
/// # Errors
/// Returns `PreprocessError` if the file cannot be read or preprocessing
/// fails.
pub fn preprocess_file<P: AsRef<Path>>(
    path: P,
    config: &PreprocessorConfig,
) -> Result<Vec<Token>, PreprocessError> {
    let path = path.as_ref();
    let content = config.file_access.read(path)?;
    let tokens = tokenize(&content);
    Preprocessor::with_config(config.clone()).preprocess(&tokens, Some(path))
}
