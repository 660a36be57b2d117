//! Tokenizer for raw source text.
//!
//! The lexer has no macro or include awareness: `#define` and `#include` are
//! recognized purely as directive marker tokens, and everything else comes
//! out as ordinary lexical tokens for the preprocessing engine to walk.

use std::iter::Peekable;
use std::rc::Rc;
use std::str::Chars;

use crate::token::{Token, is_identifier_continue, is_identifier_start};

/// Reserved words recognized by [`convert_keywords`].
const KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "int", "long", "register", "return", "short",
    "signed", "sizeof", "static", "struct", "switch", "typedef", "union", "unsigned", "void",
    "volatile", "while",
];

/// Tokenize raw source text into an owned token chain.
///
/// Comments and whitespace are consumed and produce no tokens. A `#`
/// followed by `define` or `include` becomes the matching directive marker;
/// any other `#` sequence is left as ordinary tokens.
#[must_use]
pub fn tokenize(content: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut it = content.chars().peekable();

    while let Some(&ch) = it.peek() {
        if ch.is_whitespace() {
            it.next();
        } else if is_identifier_start(ch) {
            tokens.push(Token::Ident(read_word(&mut it)));
        } else if ch.is_ascii_digit() {
            tokens.push(Token::Num(read_number(&mut it)));
        } else if ch == '"' {
            it.next();
            tokens.push(Token::Str(read_string(&mut it, '"')));
        } else if ch == '\'' {
            it.next();
            let text = read_string(&mut it, '\'');
            let value = text.chars().next().map_or(0, |c| c as i64);
            tokens.push(Token::Num(value));
        } else if ch == '/' {
            it.next();
            match it.peek() {
                Some('/') => skip_line_comment(&mut it),
                Some('*') => skip_block_comment(&mut it),
                _ => tokens.push(Token::Punct('/')),
            }
        } else if ch == '#' {
            it.next();
            match it.peek() {
                Some(&c) if is_identifier_start(c) => {
                    let word = read_word(&mut it);
                    match word.as_str() {
                        "define" => tokens.push(Token::Define),
                        "include" => tokens.push(Token::Include),
                        _ => {
                            tokens.push(Token::Punct('#'));
                            tokens.push(Token::Ident(word));
                        }
                    }
                }
                _ => tokens.push(Token::Punct('#')),
            }
        } else {
            it.next();
            tokens.push(Token::Punct(ch));
        }
    }
    tokens
}

/// Rewrite identifier tokens that are reserved words into keyword tokens.
///
/// Every occurrence of the same keyword shares one interned lexeme. This runs
/// after preprocessing, so directive payloads such as `<float.h>` still lex
/// as plain identifiers while the engine needs them.
pub fn convert_keywords(tokens: &mut [Token]) {
    let interned: Vec<Rc<str>> = KEYWORDS.iter().map(|&k| Rc::from(k)).collect();
    for token in tokens {
        if let Token::Ident(name) = token
            && let Ok(pos) = KEYWORDS.binary_search(&name.as_str())
        {
            *token = Token::Keyword(Rc::clone(&interned[pos]));
        }
    }
}

fn read_word(it: &mut Peekable<Chars>) -> String {
    let mut s = String::new();
    while let Some(&c) = it.peek() {
        if is_identifier_continue(c) {
            s.push(c);
            it.next();
        } else {
            break;
        }
    }
    s
}

fn read_number(it: &mut Peekable<Chars>) -> i64 {
    let mut digits = String::new();
    let mut radix = 10;

    if it.peek() == Some(&'0') {
        it.next();
        if let Some(&c) = it.peek()
            && (c == 'x' || c == 'X')
        {
            it.next();
            radix = 16;
        } else {
            digits.push('0');
        }
    }
    while let Some(&c) = it.peek() {
        if c.is_digit(radix) {
            digits.push(c);
            it.next();
        } else {
            break;
        }
    }
    i64::from_str_radix(&digits, radix).unwrap_or(i64::MAX)
}

/// Read a quoted literal body up to `quote`, decoding simple escapes.
/// The opening quote is already consumed; the closing quote is consumed here.
fn read_string(it: &mut Peekable<Chars>, quote: char) -> String {
    let mut s = String::new();
    while let Some(c) = it.next() {
        if c == quote {
            break;
        }
        if c == '\\' {
            match it.next() {
                Some('n') => s.push('\n'),
                Some('t') => s.push('\t'),
                Some('r') => s.push('\r'),
                Some('0') => s.push('\0'),
                Some(other) => s.push(other),
                None => break,
            }
        } else {
            s.push(c);
        }
    }
    s
}

fn skip_line_comment(it: &mut Peekable<Chars>) {
    for c in it.by_ref() {
        if c == '\n' {
            break;
        }
    }
}

fn skip_block_comment(it: &mut Peekable<Chars>) {
    it.next();
    let mut prev = '\0';
    for c in it.by_ref() {
        if prev == '*' && c == '/' {
            break;
        }
        prev = c;
    }
}
