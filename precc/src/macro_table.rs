use std::collections::HashMap;

use crate::token::Token;

/// Mapping from macro name to its single replacement token.
///
/// One table is scoped to exactly one `preprocess` invocation: each included
/// file starts with a fresh, empty table, so macros never leak across file
/// boundaries. Iteration order does not affect output; only presence and the
/// matched replacement matter.
#[derive(Debug, Default)]
pub struct MacroTable {
    defs: HashMap<String, Token>,
}

impl MacroTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a macro. Redefining a name replaces the earlier definition.
    pub fn define(&mut self, name: impl Into<String>, replacement: Token) {
        self.defs.insert(name.into(), replacement);
    }

    /// Look up the replacement token for `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Token> {
        self.defs.get(name)
    }

    /// Whether `name` is defined.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Number of registered macros.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the table holds no macros.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let mut table = MacroTable::new();
        assert!(table.is_empty());
        table.define("FOO", Token::Num(42));
        assert_eq!(table.lookup("FOO"), Some(&Token::Num(42)));
        assert!(table.is_defined("FOO"));
        assert!(!table.is_defined("BAR"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn redefinition_replaces() {
        let mut table = MacroTable::new();
        table.define("FOO", Token::Num(1));
        table.define("FOO", Token::Num(2));
        assert_eq!(table.lookup("FOO"), Some(&Token::Num(2)));
        assert_eq!(table.len(), 1);
    }
}
