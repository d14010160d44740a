// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for SCM lexical analysis.
//!
//! The SCM surface syntax is small: parentheses, a freestanding dot used
//! for dotted pairs, `#t`/`#f` booleans, numbers, double-quoted strings,
//! and bare symbols. Comments (`;` to end of line) and whitespace are
//! skipped by the lexer and never appear as tokens.
//!
//! A dot is only a [`TokenKind::Dot`] when it stands alone between
//! delimiters; dots inside atoms stay part of the atom, so `h2o<l>` and
//! `1.225` each lex as a single token.

use ecow::EcoString;

use super::Span;

/// The kind of token, not including source location.
///
/// Number tokens carry their parsed value; symbol, string, and error
/// tokens carry their text as [`EcoString`] so tokens stay cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Left parenthesis: `(`
    LParen,

    /// Right parenthesis: `)`
    RParen,

    /// A freestanding dot separating a dotted pair: `(density . 1.225)`
    Dot,

    /// A boolean literal: `#t` or `#f`
    Bool(bool),

    /// A numeric literal in integer, fixed, or scientific form: `300`,
    /// `1.225`, `1.716e-5`, `-1.966e-10`
    Number(f64),

    /// A double-quoted string with backslash escapes resolved.
    Str(EcoString),

    /// A bare symbol: `density`, `piecewise-linear`, `h2o<l>`
    Symbol(EcoString),

    /// End of input.
    Eof,

    /// Invalid input preserved for error reporting (unterminated string,
    /// malformed number, bad escape).
    Error(EcoString),
}

impl TokenKind {
    /// Returns `true` if this token is an atom (a leaf s-expression value).
    #[must_use]
    pub const fn is_atom(&self) -> bool {
        matches!(
            self,
            Self::Bool(_) | Self::Number(_) | Self::Str(_) | Self::Symbol(_)
        )
    }

    /// Returns `true` if this is the end-of-input marker.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Returns `true` if this is an error token.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the symbol text if this token is a symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value if this token is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::Dot => write!(f, "."),
            Self::Bool(true) => write!(f, "#t"),
            Self::Bool(false) => write!(f, "#f"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Symbol(s) => write!(f, "{s}"),
            Self::Eof => write!(f, "<eof>"),
            Self::Error(s) => write!(f, "<error: {s}>"),
        }
    }
}

/// A token with its source location.
///
/// # Examples
///
/// ```
/// use matdb_core::source_analysis::{Span, Token, TokenKind};
///
/// let token = Token::new(TokenKind::Symbol("density".into()), Span::new(1, 8));
/// assert_eq!(token.kind().as_symbol(), Some("density"));
/// assert_eq!(token.span().len(), 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the kind of this token.
    #[must_use]
    pub const fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Consumes the token and returns its kind.
    #[must_use]
    pub fn into_kind(self) -> TokenKind {
        self.kind
    }

    /// Returns the source span of this token.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_kind_display() {
        assert_eq!(TokenKind::LParen.to_string(), "(");
        assert_eq!(TokenKind::Dot.to_string(), ".");
        assert_eq!(TokenKind::Bool(true).to_string(), "#t");
        assert_eq!(TokenKind::Bool(false).to_string(), "#f");
        assert_eq!(TokenKind::Number(1.5).to_string(), "1.5");
        assert_eq!(TokenKind::Str("h2o".into()).to_string(), "\"h2o\"");
        assert_eq!(TokenKind::Symbol("viscosity".into()).to_string(), "viscosity");
        assert_eq!(TokenKind::Eof.to_string(), "<eof>");
    }

    #[test]
    fn token_kind_predicates() {
        assert!(TokenKind::Number(1.0).is_atom());
        assert!(TokenKind::Symbol("air".into()).is_atom());
        assert!(TokenKind::Bool(false).is_atom());
        assert!(TokenKind::Str("x".into()).is_atom());
        assert!(!TokenKind::LParen.is_atom());
        assert!(!TokenKind::Dot.is_atom());

        assert!(TokenKind::Eof.is_eof());
        assert!(!TokenKind::RParen.is_eof());
        assert!(TokenKind::Error("1.2.3".into()).is_error());
    }

    #[test]
    fn token_kind_accessors() {
        assert_eq!(TokenKind::Symbol("ch4".into()).as_symbol(), Some("ch4"));
        assert_eq!(TokenKind::Number(2.5).as_symbol(), None);
        assert_eq!(TokenKind::Number(2.5).as_number(), Some(2.5));
        assert_eq!(TokenKind::Symbol("ch4".into()).as_number(), None);
    }

    #[test]
    fn token_accessors() {
        let token = Token::new(TokenKind::Number(300.0), Span::new(10, 13));
        assert_eq!(token.span().start(), 10);
        assert!(matches!(token.kind(), TokenKind::Number(n) if *n == 300.0));
        assert!(matches!(token.into_kind(), TokenKind::Number(_)));
    }
}
