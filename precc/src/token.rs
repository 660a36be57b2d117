use std::fmt;
use std::rc::Rc;

/// Check if a character can start an identifier (letter or underscore)
pub const fn is_identifier_start(c: char) -> bool {
    (c >= 'a' && c <= 'z') || (c >= 'A' && c <= 'Z') || c == '_'
}

/// Check if a character can continue an identifier (letter, digit, or underscore)
pub const fn is_identifier_continue(c: char) -> bool {
    (c >= 'a' && c <= 'z') || (c >= 'A' && c <= 'Z') || (c >= '0' && c <= '9') || c == '_'
}

/// A single lexical token.
///
/// Tokens travel in owned `Vec<Token>` chains; a chain belongs to exactly one
/// owner, and splicing one chain onto another is a plain `extend`. `Clone`
/// deep-copies owned text payloads (`Ident`, `Str`) and pointer-copies the
/// shared `Keyword` lexeme, so a cloned token is always safe to hand to a
/// different chain.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// `#define` directive marker
    Define,
    /// `#include` directive marker
    Include,
    /// Identifier with its owned text
    Ident(String),
    /// String literal; the payload excludes the surrounding quotes
    Str(String),
    /// Integer literal (character constants lex to their scalar value)
    Num(i64),
    /// Reserved word; the lexeme is shared with every other occurrence
    Keyword(Rc<str>),
    /// Single punctuation character
    Punct(char),
}

impl Token {
    /// The identifier text, if this token is an identifier.
    #[must_use]
    pub fn ident(&self) -> Option<&str> {
        match self {
            Token::Ident(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this token is the punctuation character `c`.
    #[must_use]
    pub fn is_punct(&self, c: char) -> bool {
        matches!(self, Token::Punct(p) if *p == c)
    }

    /// Short kind name used in diagnostics and structured output.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Define => "define",
            Token::Include => "include",
            Token::Ident(_) => "ident",
            Token::Str(_) => "string",
            Token::Num(_) => "number",
            Token::Keyword(_) => "keyword",
            Token::Punct(_) => "punct",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Define => write!(f, "#define"),
            Token::Include => write!(f, "#include"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Num(n) => write!(f, "{n}"),
            Token::Keyword(k) => write!(f, "{k}"),
            Token::Punct(c) => write!(f, "{c}"),
        }
    }
}
