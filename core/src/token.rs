//! Lexical tokens as produced by an external lexer.
//!
//! The engine never tokenizes. It consumes a stream of [`Token`]s from
//! whatever lexer the embedding application uses and only requires that
//! every token carry a kind tag, its literal text, and a source position.
//! Tokens compare and hash by value because a token doubles as the
//! position component of the memoization cache key.

use core::fmt;

/// Classifies a token.
///
/// The set of kinds is owned by the external lexer; the engine treats the
/// tag as opaque. [`TokenKind::END`] is reserved for the end-of-input
/// sentinel and must not be produced by a lexer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKind(pub u16);

impl TokenKind {
    /// Reserved kind of the end-of-input sentinel token.
    pub const END: TokenKind = TokenKind(u16::MAX);
}

/// One lexical unit: a kind tag, the matched text, and a source position.
///
/// Tokens are immutable once created. Line and column are 1-based by
/// convention, but the engine only threads them through for diagnostics
/// and never interprets them.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// The kind tag assigned by the lexer.
    pub kind: TokenKind,
    /// The literal matched text.
    pub text: String,
    /// Source line of the first character.
    pub line: u32,
    /// Source column of the first character.
    pub column: u32,
}

impl Token {
    /// Creates a token from its parts.
    #[inline]
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// The sentinel fed to the root parser once the source is exhausted,
    /// so that in-flight optionals, repetitions, groups and choices can
    /// finalize.
    #[inline]
    pub fn end_of_input() -> Self {
        Self {
            kind: TokenKind::END,
            text: String::new(),
            line: 0,
            column: 0,
        }
    }

    /// Whether this is the end-of-input sentinel.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::END
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end() {
            write!(f, "<end of input>")
        } else {
            write!(f, "{:?} at {}:{}", self.text, self.line, self.column)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_sentinel() {
        let end = Token::end_of_input();
        assert!(end.is_end());
        assert_eq!(end, Token::end_of_input());
        assert!(!Token::new(TokenKind(0), "x", 1, 1).is_end());
    }

    #[test_case::test_case(TokenKind(0), false; "ordinary kind")]
    #[test_case::test_case(TokenKind(u16::MAX - 1), false; "largest ordinary kind")]
    #[test_case::test_case(TokenKind::END, true; "reserved sentinel kind")]
    fn test_is_end_by_kind(kind: TokenKind, expected: bool) {
        assert_eq!(Token::new(kind, "", 1, 1).is_end(), expected);
    }

    #[test]
    fn test_value_equality() {
        let a = Token::new(TokenKind(1), "42", 3, 7);
        let b = Token::new(TokenKind(1), "42", 3, 7);
        let c = Token::new(TokenKind(1), "42", 3, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_carries_position() {
        let t = Token::new(TokenKind(2), "if", 4, 12);
        assert_eq!(t.to_string(), "\"if\" at 4:12");
    }
}
