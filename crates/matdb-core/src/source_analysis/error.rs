// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical error types.
//!
//! The lexer recovers from bad input by emitting error tokens, but it also
//! records structured [`LexError`]s so callers can treat lexical problems
//! as fatal for the file. Errors carry a [`Span`] and integrate with
//! [`miette`] for labeled source reporting.

use miette::Diagnostic;
use thiserror::Error;

use super::Span;

/// A lexical error encountered during tokenization.
///
/// Lexical errors are fatal for the file being parsed: the grammar cannot
/// meaningfully recover from an unterminated string or a malformed number,
/// so [`parse_catalog`](crate::catalog::parse_catalog) returns the first
/// one instead of a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic()]
pub struct LexError {
    /// The kind of lexical error.
    #[source]
    pub kind: LexErrorKind,
    /// The source location of the error.
    #[label("here")]
    pub span: Span,
}

impl LexError {
    /// Creates a new lexical error.
    #[must_use]
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Creates an "unterminated string" error.
    #[must_use]
    pub fn unterminated_string(span: Span) -> Self {
        Self::new(LexErrorKind::UnterminatedString, span)
    }

    /// Creates an "unknown escape" error.
    #[must_use]
    pub fn unknown_escape(c: char, span: Span) -> Self {
        Self::new(LexErrorKind::UnknownEscape(c), span)
    }

    /// Creates a "malformed number" error.
    #[must_use]
    pub fn malformed_number(text: impl Into<String>, span: Span) -> Self {
        Self::new(LexErrorKind::MalformedNumber(text.into()), span)
    }
}

/// The kind of lexical error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// A string literal ran to end of input without a closing quote.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// A backslash escape the SCM dialect does not define.
    #[error("unknown escape sequence '\\{0}'")]
    UnknownEscape(char),

    /// An atom that starts like a number but is not one, e.g. `1.2.3`.
    #[error("malformed number '{0}'")]
    MalformedNumber(String),
}
