// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for SCM material databases.
//!
//! This module converts source text into a stream of [`Token`]s. The lexer
//! is hand-written for maximum control over atom classification: the SCM
//! dialect allows a wide punctuation set inside symbols (`h2o<l>`,
//! `blottner-curve-fit`, `[n2]`), and the freestanding-dot rule means `.`
//! is a token of its own only when the whole atom is a single dot.
//!
//! # Design Principles
//!
//! - **Total**: any atom that is not a number, boolean, or string is a
//!   symbol. The lexer never rejects input outright.
//! - **Error recovery**: unterminated strings, unknown escapes, and
//!   malformed numbers produce [`TokenKind::Error`] tokens and are also
//!   recorded as structured [`LexError`]s for the caller.
//! - **Precise spans**: every token carries its exact byte range.
//!
//! # Example
//!
//! ```
//! use matdb_core::source_analysis::{Lexer, TokenKind};
//!
//! let tokens: Vec<_> = Lexer::new("(density . 1.225)").collect();
//! assert_eq!(tokens.len(), 5); // ( density . 1.225 )
//! assert!(matches!(tokens[3].kind(), TokenKind::Number(_)));
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use ecow::EcoString;

use super::{LexError, Span, Token, TokenKind};

/// Returns `true` for characters that may appear inside a symbol.
///
/// Besides alphanumerics, SCM symbols admit the punctuation set
/// `- < > = + _ . * / : [ ] { } ,`, which covers phase-tagged names such
/// as `h2o<l>` and bracketed species like `[ch4]`.
fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '<' | '>' | '=' | '+' | '_' | '.' | '*' | '/' | ':' | '[' | ']' | '{' | '}' | ','
        )
}

/// Returns `true` if an atom's spelling commits it to being a number.
///
/// Atoms that start with a digit, or with a sign or dot followed by a
/// digit, must parse as numbers; anything else is a symbol. This is what
/// keeps `piecewise-linear` a symbol while `-1.966e-10` is a number and
/// `1.2.3` is a malformed-number error.
fn looks_numeric(atom: &str) -> bool {
    let rest = atom.strip_prefix(['+', '-']).unwrap_or(atom);
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// A lexer that tokenizes SCM source text.
///
/// Implements [`Iterator`]; iteration ends before the EOF token. Use
/// [`lex_with_eof`] when the parser needs the terminator, and collect
/// recorded errors with [`Lexer::take_errors`] or the [`lex`] helper.
pub struct Lexer<'src> {
    /// The source text being lexed.
    source: &'src str,
    /// Character iterator with byte positions.
    chars: Peekable<CharIndices<'src>>,
    /// Current byte position in source.
    position: usize,
    /// Structured errors recorded while recovering.
    errors: Vec<LexError>,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("position", &self.position)
            .field("remaining", &self.source.get(self.position..).unwrap_or(""))
            .finish()
    }
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: 0,
            errors: Vec::new(),
        }
    }

    /// Takes the structured errors recorded so far.
    #[must_use]
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks `n+1` characters ahead without consuming.
    fn peek_char_n(&self, n: usize) -> Option<char> {
        let mut iter = self.chars.clone();
        for _ in 0..n {
            iter.next();
        }
        iter.next().map(|(_, c)| c)
    }

    /// Consumes the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.position = pos + c.len_utf8();
        Some(c)
    }

    /// Consumes characters while the predicate is true.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Returns the current byte position.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "database files over 4GB are not supported"
    )]
    fn current_position(&self) -> u32 {
        self.position as u32
    }

    /// Creates a span from start to current position.
    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.current_position())
    }

    /// Extracts source text for a span.
    fn text_for(&self, span: Span) -> &'src str {
        &self.source[span.as_range()]
    }

    /// Skips whitespace and `;`-to-end-of-line comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.advance_while(|c| c.is_ascii_whitespace());
                }
                Some(';') => {
                    self.advance_while(|c| c != '\n');
                }
                _ => break,
            }
        }
    }

    /// Lexes the next token.
    fn lex_token(&mut self) -> Token {
        self.skip_trivia();
        let start = self.current_position();

        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some('(') => {
                self.advance();
                TokenKind::LParen
            }
            Some(')') => {
                self.advance();
                TokenKind::RParen
            }
            Some('"') => self.lex_string(start),
            Some('#') => self.lex_hash(),
            Some(c) if is_symbol_char(c) => self.lex_atom(start),
            // Anything else starts a symbol too; the lexer is total.
            Some(_) => {
                self.advance();
                self.advance_while(is_symbol_char);
                TokenKind::Symbol(EcoString::from(self.text_for(self.span_from(start))))
            }
        };

        Token::new(kind, self.span_from(start))
    }

    /// Lexes a run of symbol-constituent characters and classifies it.
    fn lex_atom(&mut self, start: u32) -> TokenKind {
        self.advance_while(is_symbol_char);
        let text = self.text_for(self.span_from(start));

        if text == "." {
            return TokenKind::Dot;
        }
        if looks_numeric(text) {
            return match text.parse::<f64>() {
                Ok(value) => TokenKind::Number(value),
                Err(_) => {
                    let span = self.span_from(start);
                    self.errors.push(LexError::malformed_number(text, span));
                    TokenKind::Error(EcoString::from(text))
                }
            };
        }
        TokenKind::Symbol(EcoString::from(text))
    }

    /// Lexes `#t`, `#f`, or a `#`-prefixed symbol.
    fn lex_hash(&mut self) -> TokenKind {
        let start = self.current_position();
        self.advance(); // #

        let flag = self.peek_char();
        let delimited = !self.peek_char_n(1).is_some_and(is_symbol_char);
        match flag {
            Some('t') if delimited => {
                self.advance();
                TokenKind::Bool(true)
            }
            Some('f') if delimited => {
                self.advance();
                TokenKind::Bool(false)
            }
            _ => {
                // Unrecognized hash form; keep it as a symbol.
                self.advance_while(is_symbol_char);
                TokenKind::Symbol(EcoString::from(self.text_for(self.span_from(start))))
            }
        }
    }

    /// Lexes a double-quoted string with backslash escapes.
    ///
    /// Recognized escapes: `\"`, `\\`, `\n`, `\t`, `\r`. An unknown escape
    /// records an error and keeps the character verbatim; an unterminated
    /// string records an error and yields an error token.
    fn lex_string(&mut self, start: u32) -> TokenKind {
        self.advance(); // opening quote
        let mut content = String::new();
        let mut bad_escape = false;

        loop {
            match self.advance() {
                None => {
                    let span = self.span_from(start);
                    self.errors.push(LexError::unterminated_string(span));
                    return TokenKind::Error(EcoString::from(self.text_for(span)));
                }
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('"') => content.push('"'),
                    Some('\\') => content.push('\\'),
                    Some('n') => content.push('\n'),
                    Some('t') => content.push('\t'),
                    Some('r') => content.push('\r'),
                    Some(c) => {
                        let end = self.current_position();
                        #[expect(
                            clippy::cast_possible_truncation,
                            reason = "escape sequences are at most a few bytes"
                        )]
                        let escape_len = (c.len_utf8() + 1) as u32;
                        self.errors
                            .push(LexError::unknown_escape(c, Span::new(end - escape_len, end)));
                        bad_escape = true;
                        content.push(c);
                    }
                    None => {
                        let span = self.span_from(start);
                        self.errors.push(LexError::unterminated_string(span));
                        return TokenKind::Error(EcoString::from(self.text_for(span)));
                    }
                },
                Some(c) => content.push(c),
            }
        }

        if bad_escape {
            TokenKind::Error(EcoString::from(content))
        } else {
            TokenKind::Str(EcoString::from(content))
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.lex_token();
        if token.kind().is_eof() {
            None
        } else {
            Some(token)
        }
    }
}

/// Tokenizes source text, returning the tokens (without EOF) and any
/// lexical errors recorded along the way.
#[must_use]
pub fn lex(source: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = Lexer::new(source);
    let tokens: Vec<Token> = lexer.by_ref().collect();
    (tokens, lexer.take_errors())
}

/// Tokenizes source text with a trailing EOF token, as the parser expects.
#[must_use]
pub fn lex_with_eof(source: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = Lexer::new(source);
    let mut tokens: Vec<Token> = lexer.by_ref().collect();
    let end = Span::point(u32::try_from(source.len()).unwrap_or(u32::MAX));
    tokens.push(Token::new(TokenKind::Eof, end));
    (tokens, lexer.take_errors())
}
