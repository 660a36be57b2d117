//! The directive-driven token-stream assembly loop.

use std::path::Path;

use log::error;

use crate::config::PreprocessorConfig;
use crate::error::{PreprocessError, Result};
use crate::include::{IncludeResolver, IncludeStack};
use crate::lexer::tokenize;
use crate::macro_table::MacroTable;
use crate::token::Token;

/// The preprocessing engine.
///
/// One instance drives one top-level pass and all the nested passes its
/// `#include` directives trigger. The include stack is shared across the
/// whole recursion so header cycles are caught at any depth; the macro table
/// is not — every file gets a fresh one.
pub struct Preprocessor {
    config: PreprocessorConfig,
    resolver: IncludeResolver,
    include_stack: IncludeStack,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor {
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PreprocessorConfig::new())
    }

    /// Create an engine with the given configuration.
    #[must_use]
    pub fn with_config(config: PreprocessorConfig) -> Self {
        let resolver = IncludeResolver::new(&config);
        Preprocessor {
            config,
            resolver,
            include_stack: IncludeStack::new(),
        }
    }

    /// Run one preprocessing pass over `tokens`.
    ///
    /// `file` is the path the tokens came from; when given, it seeds the
    /// include stack so the file's own includes resolve relative to it. The
    /// push/pop pair brackets the whole pass, including early error returns.
    ///
    /// # Errors
    /// Any directive failure (see [`PreprocessError`]) aborts the pass and
    /// propagates; no scanning resumes after a failed directive.
    pub fn preprocess(&mut self, tokens: &[Token], file: Option<&Path>) -> Result<Vec<Token>> {
        if let Some(f) = file {
            self.include_stack.push(f);
        }
        let result = self.run(tokens);
        if file.is_some() {
            self.include_stack.pop();
        }
        result
    }

    /// The main loop: one forward walk over the input chain.
    fn run(&mut self, tokens: &[Token]) -> Result<Vec<Token>> {
        let mut defines = MacroTable::new();
        let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
        let mut pos = 0;

        while pos < tokens.len() {
            match &tokens[pos] {
                Token::Define => {
                    pos = handle_define(tokens, pos, &mut defines)?;
                }
                Token::Include => {
                    let (included, next) = self.handle_include(tokens, pos)?;
                    out.extend(included);
                    pos = next;
                }
                Token::Ident(name) => {
                    if let Some(replacement) = defines.lookup(name) {
                        // Single-pass: the replacement is never re-scanned.
                        out.push(replacement.clone());
                    } else {
                        out.push(tokens[pos].clone());
                    }
                    pos += 1;
                }
                other => {
                    out.push(other.clone());
                    pos += 1;
                }
            }
        }
        Ok(out)
    }

    /// Handle one `#include` directive starting at `pos`.
    ///
    /// Returns the fully expanded token chain of the included file(s) and
    /// the position where scanning of the including file resumes.
    fn handle_include(&mut self, tokens: &[Token], pos: usize) -> Result<(Vec<Token>, usize)> {
        let mut cur = pos + 1;

        let (filename, is_system) = match tokens.get(cur) {
            Some(Token::Str(name)) => {
                cur += 1;
                (name.clone(), false)
            }
            Some(Token::Punct('<')) => {
                cur += 1;
                let name = self.scan_system_name(tokens, &mut cur)?;
                (name, true)
            }
            _ => {
                error!("invalid #include syntax");
                return Err(PreprocessError::MalformedDirective {
                    directive: "include",
                    reason: "expected \"file\" or <file> after #include",
                });
            }
        };

        let current_file = self.include_stack.top().map(Path::to_path_buf);
        let resolved = self
            .resolver
            .resolve(&filename, is_system, current_file.as_deref())?
            .ok_or_else(|| {
                error!("include file not found: {filename}");
                PreprocessError::IncludeNotFound(filename.clone())
            })?;

        if self.include_stack.depth() >= self.config.max_include_depth {
            error!(
                "include depth limit exceeded while including {}",
                resolved.display()
            );
            return Err(PreprocessError::IncludeDepthExceeded(
                self.config.max_include_depth,
            ));
        }

        let included = if self.config.is_header(&filename) {
            // Only header-style includes are cycle-checked; source includes
            // rely on the depth limit instead.
            if self.include_stack.contains(&resolved) {
                error!("circular include detected: {filename}");
                return Err(PreprocessError::CircularInclude(resolved));
            }

            let mut chain = self.include_file(&resolved)?;

            if self.config.pair_sources {
                let source_name = self.config.paired_source_name(&filename);
                if let Some(source_path) =
                    self.resolver
                        .resolve(&source_name, is_system, current_file.as_deref())?
                {
                    chain.extend(self.include_file(&source_path)?);
                }
            }
            chain
        } else {
            self.include_file(&resolved)?
        };

        Ok((included, cur))
    }

    /// Reconstruct a `<...>` include name from the tokens between the angle
    /// brackets: identifier text and `.` contribute, anything else is
    /// skipped. `cur` ends up just past the closing `>`.
    fn scan_system_name(&self, tokens: &[Token], cur: &mut usize) -> Result<String> {
        let mut name = String::new();
        loop {
            match tokens.get(*cur) {
                None => {
                    error!("unterminated system include");
                    return Err(PreprocessError::UnterminatedSystemInclude);
                }
                Some(Token::Punct('>')) => {
                    *cur += 1;
                    return Ok(name);
                }
                Some(Token::Ident(part)) => {
                    if name.len() + part.len() > self.config.max_filename_len {
                        error!("include filename too long");
                        return Err(PreprocessError::FilenameTooLong {
                            len: name.len() + part.len(),
                            limit: self.config.max_filename_len,
                        });
                    }
                    name.push_str(part);
                    *cur += 1;
                }
                Some(Token::Punct('.')) => {
                    name.push('.');
                    *cur += 1;
                }
                Some(_) => {
                    *cur += 1;
                }
            }
        }
    }

    /// Read, tokenize, and recursively preprocess one resolved file.
    fn include_file(&mut self, path: &Path) -> Result<Vec<Token>> {
        let content = self.config.file_access.read(path).map_err(|err| {
            error!("error reading include file {}: {err}", path.display());
            PreprocessError::from(err)
        })?;
        let tokens = tokenize(&content);
        self.preprocess(&tokens, Some(path))
    }
}

/// Handle one `#define` directive: consume exactly the marker, the macro
/// name, and the single replacement token, then return the resume position.
fn handle_define(tokens: &[Token], pos: usize, defines: &mut MacroTable) -> Result<usize> {
    let Some(Token::Ident(name)) = tokens.get(pos + 1) else {
        error!("malformed #define: expected a macro name");
        return Err(PreprocessError::MalformedDirective {
            directive: "define",
            reason: "expected a macro name",
        });
    };
    let Some(replacement) = tokens.get(pos + 2) else {
        error!("malformed #define: missing replacement token for {name}");
        return Err(PreprocessError::MalformedDirective {
            directive: "define",
            reason: "missing replacement token",
        });
    };
    defines.define(name.clone(), replacement.clone());
    Ok(pos + 3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MemFs;
    use similar_asserts::assert_eq;
    use std::rc::Rc;

    fn engine_with(fs: MemFs) -> Preprocessor {
        Preprocessor::with_config(PreprocessorConfig::new().with_file_access(Rc::new(fs)))
    }

    fn run(src: &str, fs: MemFs) -> Result<Vec<Token>> {
        engine_with(fs).preprocess(&tokenize(src), None)
    }

    #[test]
    fn define_then_expand() {
        let out = run("#define FOO 42\nFOO", MemFs::new()).unwrap();
        assert_eq!(out, vec![Token::Num(42)]);
    }

    #[test]
    fn define_consumes_exactly_three_tokens() {
        let out = run("#define A 1 2", MemFs::new()).unwrap();
        assert_eq!(out, vec![Token::Num(2)]);
    }

    #[test]
    fn replacement_is_not_rescanned() {
        let out = run("#define A B\n#define B 1\nA B", MemFs::new()).unwrap();
        assert_eq!(out, vec![Token::Ident("B".to_string()), Token::Num(1)]);
    }

    #[test]
    fn define_without_name_is_an_error() {
        let err = run("#define 1 2", MemFs::new()).unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::MalformedDirective { directive: "define", .. }
        ));
    }

    #[test]
    fn define_without_replacement_is_an_error() {
        let err = run("#define FOO", MemFs::new()).unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::MalformedDirective { directive: "define", .. }
        ));
    }

    #[test]
    fn passthrough_without_directives() {
        let src = "int main ( ) { return 0 ; }";
        let input = tokenize(src);
        let out = run(src, MemFs::new()).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn quoted_include_is_spliced_in_place() {
        let fs = MemFs::new().file("other.c", "int b ;");
        let out = run("int a ; #include \"other.c\"\nint c ;", fs).unwrap();
        assert_eq!(out, tokenize("int a ; int b ; int c ;"));
    }

    #[test]
    fn system_include_name_reconstruction() {
        let fs = MemFs::new().file("/usr/include/stdio.h", "int x ;");
        let out = run("#include <stdio.h>", fs).unwrap();
        assert_eq!(out, tokenize("int x ;"));
    }

    #[test]
    fn unterminated_system_include() {
        let err = run("#include <stdio", MemFs::new()).unwrap_err();
        assert!(matches!(err, PreprocessError::UnterminatedSystemInclude));
    }

    #[test]
    fn include_without_target_is_an_error() {
        let err = run("#include 42", MemFs::new()).unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::MalformedDirective { directive: "include", .. }
        ));
    }

    #[test]
    fn missing_include_file() {
        let err = run("#include \"missing.h\"", MemFs::new()).unwrap_err();
        assert!(matches!(err, PreprocessError::IncludeNotFound(name) if name == "missing.h"));
    }

    #[test]
    fn macros_do_not_cross_file_boundaries() {
        let fs = MemFs::new().file("inc.h", "#define Y 2\nY X");
        let out = run("#define X 1\n#include \"inc.h\"\nX Y", fs).unwrap();
        assert_eq!(
            out,
            vec![
                Token::Num(2),                  // Y inside inc.h
                Token::Ident("X".to_string()),  // X is unknown inside inc.h
                Token::Num(1),                  // X in the including file
                Token::Ident("Y".to_string()),  // Y is unknown outside inc.h
            ]
        );
    }

    #[test]
    fn header_pulls_in_paired_source() {
        let fs = MemFs::new()
            .file("one.h", "int a ;")
            .file("one.c", "int b ;");
        let out = run("#include \"one.h\"", fs).unwrap();
        assert_eq!(out, tokenize("int a ; int b ;"));
    }

    #[test]
    fn missing_paired_source_is_not_an_error() {
        let fs = MemFs::new().file("lone.h", "int a ;");
        let out = run("#include \"lone.h\"", fs).unwrap();
        assert_eq!(out, tokenize("int a ;"));
    }

    #[test]
    fn pairing_can_be_disabled() {
        let fs = MemFs::new()
            .file("one.h", "int a ;")
            .file("one.c", "int b ;");
        let config = PreprocessorConfig::new()
            .with_file_access(Rc::new(fs))
            .with_pair_sources(false);
        let out = Preprocessor::with_config(config)
            .preprocess(&tokenize("#include \"one.h\""), None)
            .unwrap();
        assert_eq!(out, tokenize("int a ;"));
    }

    #[test]
    fn header_cycle_is_detected() {
        let fs = MemFs::new()
            .file("a.h", "#include \"b.h\"")
            .file("b.h", "#include \"a.h\"");
        let err = run("#include \"a.h\"", fs).unwrap_err();
        assert!(matches!(err, PreprocessError::CircularInclude(_)));
    }

    #[test]
    fn self_include_is_detected() {
        let fs = MemFs::new().file("a.h", "#include \"a.h\"");
        let err = run("#include \"a.h\"", fs).unwrap_err();
        assert!(matches!(err, PreprocessError::CircularInclude(_)));
    }

    #[test]
    fn non_header_loop_hits_depth_limit() {
        let fs = MemFs::new()
            .file("x.c", "#include \"y.c\"")
            .file("y.c", "#include \"x.c\"");
        let config = PreprocessorConfig::new()
            .with_file_access(Rc::new(fs))
            .with_max_include_depth(8);
        let err = Preprocessor::with_config(config)
            .preprocess(&tokenize("#include \"x.c\""), None)
            .unwrap_err();
        assert!(matches!(err, PreprocessError::IncludeDepthExceeded(8)));
    }

    #[test]
    fn stack_is_clean_after_a_failed_pass() {
        let fs = MemFs::new().file("bad.h", "#include \"missing.h\"");
        let mut pp = engine_with(fs);
        let err = pp
            .preprocess(&tokenize("#include \"bad.h\""), Some(Path::new("top.c")))
            .unwrap_err();
        assert!(matches!(err, PreprocessError::IncludeNotFound(_)));
        assert_eq!(pp.include_stack.depth(), 0);
    }
}
