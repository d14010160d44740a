// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parameter blocks, poly pieces, and generic s-expressions.
//!
//! A parameter block is `(coeff-sym tail)` where the tail is a dotted
//! atom, a flat number list, or a sequence of nested tuples. A tail that
//! matches none of these is rewound and captured as a verbatim source
//! slice so no data is lost; the record surfaces as an opaque coefficient
//! with a warning diagnostic.

use ecow::EcoString;

use crate::ast::{CoeffKeyword, ParamBlock, ParamTail, PolyPiece, Sexp};
use crate::source_analysis::{Span, TokenKind};

use super::Parser;

impl Parser<'_> {
    /// Parses a coefficient parameter block. The current token is `(` and
    /// the next token is a symbol in the coefficient keyword table.
    pub(super) fn parse_param_block(&mut self) -> Option<ParamBlock> {
        let start = self.current_token().span();
        self.advance(); // (

        let head_span = self.current_token().span();
        let head = match self.current_kind() {
            TokenKind::Symbol(s) => s.clone(),
            _ => {
                self.error("expected coefficient keyword");
                self.synchronize(1);
                return None;
            }
        };
        self.advance();

        let qualifier = self.current_kind().as_symbol().map(EcoString::from);
        let Some((coeff, qualifier_consumed)) = CoeffKeyword::lookup(&head, qualifier.as_deref())
        else {
            self.error_at("unknown coefficient keyword", head_span);
            self.synchronize(1);
            return None;
        };
        if qualifier_consumed {
            self.advance();
        }

        let tail = self.parse_param_tail();
        let span = start.merge(self.prev_span());
        Some(ParamBlock { coeff, tail, span })
    }

    /// Parses a parameter tail, falling back to verbatim capture when no
    /// grammar alternative fits.
    fn parse_param_tail(&mut self) -> ParamTail {
        let checkpoint = self.checkpoint();
        match self.current_kind() {
            // Dotted atom: (constant . 1.225), (constant . #t)
            TokenKind::Dot => {
                self.advance();
                if let Some(atom) = self.try_atom() {
                    if self.match_token(&TokenKind::RParen) {
                        return ParamTail::DottedAtom(atom);
                    }
                }
                self.capture_raw_tail(checkpoint)
            }
            // Flat coefficient list: (sutherland 1.716e-5 273.15 110.4)
            TokenKind::Number(_) => {
                let mut numbers = Vec::new();
                while let TokenKind::Number(n) = self.current_kind() {
                    numbers.push(*n);
                    self.advance();
                }
                if self.match_token(&TokenKind::RParen) {
                    ParamTail::Numbers(numbers)
                } else {
                    self.capture_raw_tail(checkpoint)
                }
            }
            // Nested tuples: ((300 . 1005) …) or ((200 1000 a0 … a8) …)
            TokenKind::LParen => {
                let mut pieces = Vec::new();
                loop {
                    match self.current_kind() {
                        TokenKind::LParen => match self.parse_poly_piece() {
                            Some(piece) => pieces.push(piece),
                            None => return self.capture_raw_tail(checkpoint),
                        },
                        TokenKind::RParen => {
                            self.advance();
                            return ParamTail::Pieces(pieces);
                        }
                        _ => return self.capture_raw_tail(checkpoint),
                    }
                }
            }
            _ => self.capture_raw_tail(checkpoint),
        }
    }

    /// Parses one poly piece: `(number+)` or `(number . number)`.
    ///
    /// Returns `None` on any shape violation; the caller rewinds and
    /// captures the whole tail verbatim.
    fn parse_poly_piece(&mut self) -> Option<PolyPiece> {
        let start = self.current_token().span();
        self.advance(); // (

        let mut numbers = Vec::new();
        let mut dotted = false;
        loop {
            match self.current_kind() {
                TokenKind::Number(n) => {
                    if dotted && numbers.len() >= 2 {
                        return None;
                    }
                    numbers.push(*n);
                    self.advance();
                }
                TokenKind::Dot if numbers.len() == 1 && !dotted => {
                    dotted = true;
                    self.advance();
                }
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                _ => return None,
            }
        }

        let span = start.merge(self.prev_span());
        if dotted {
            if numbers.len() == 2 {
                Some(PolyPiece::Pair(numbers[0], numbers[1], span))
            } else {
                None
            }
        } else if numbers.is_empty() {
            None
        } else {
            Some(PolyPiece::List(numbers, span))
        }
    }

    /// Returns a rewind point for [`Parser::capture_raw_tail`].
    fn checkpoint(&self) -> usize {
        self.token_index()
    }

    /// Rewinds to `checkpoint` and consumes the rest of the enclosing
    /// block, returning its source text verbatim.
    ///
    /// Emits a warning diagnostic: the record is kept, but downstream it
    /// becomes an opaque coefficient rather than a typed one.
    fn capture_raw_tail(&mut self, checkpoint: usize) -> ParamTail {
        self.rewind(checkpoint);
        let start_byte = self.current_token().span().start();
        let mut end_byte = start_byte;
        let mut depth = 1u32;

        while !self.is_at_end() {
            match self.current_kind() {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        end_byte = self.current_token().span().start();
                        self.advance();
                        let span = Span::new(start_byte, end_byte);
                        let text = EcoString::from(span.slice(self.source()).trim());
                        self.warning_at(
                            "parameter tail matched no coefficient form; kept verbatim",
                            span,
                        );
                        return ParamTail::Raw(text);
                    }
                }
                _ => {}
            }
            end_byte = self.current_token().span().end();
            self.advance();
        }

        let span = Span::new(start_byte, end_byte);
        self.error_at("unclosed parameter block", span);
        ParamTail::Raw(EcoString::from(span.slice(self.source()).trim()))
    }

    /// Consumes an atom token into a leaf s-expression, or returns `None`
    /// without a diagnostic when the current token is not an atom.
    pub(super) fn try_atom(&mut self) -> Option<Sexp> {
        let span = self.current_token().span();
        let sexp = match self.current_kind() {
            TokenKind::Number(n) => Sexp::Number(*n, span),
            TokenKind::Symbol(s) => Sexp::Symbol(s.clone(), span),
            TokenKind::Str(s) => Sexp::Str(s.clone(), span),
            TokenKind::Bool(b) => Sexp::Bool(*b, span),
            _ => return None,
        };
        self.advance();
        Some(sexp)
    }

    /// Parses a single atom token, recording an error when missing.
    pub(super) fn parse_atom(&mut self) -> Option<Sexp> {
        let atom = self.try_atom();
        if atom.is_none() {
            self.error("expected an atom");
        }
        atom
    }

    /// Parses a generic s-expression: an atom, a list, or a dotted pair.
    ///
    /// Improper lists with an interior dot (`(a b . c)`) are parsed as
    /// plain lists with a warning.
    pub(super) fn parse_sexp(&mut self) -> Option<Sexp> {
        if !self.check(&TokenKind::LParen) {
            return self.parse_atom();
        }

        let start = self.current_token().span();
        self.advance(); // (
        let mut items = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::RParen => {
                    self.advance();
                    return Some(Sexp::List(items, start.merge(self.prev_span())));
                }
                TokenKind::Eof => {
                    self.error("unclosed list");
                    return Some(Sexp::List(items, start.merge(self.prev_span())));
                }
                TokenKind::Dot => {
                    let dot_span = self.current_token().span();
                    self.advance();
                    let tail = self.parse_sexp()?;
                    if !self.match_token(&TokenKind::RParen) {
                        self.error("expected ')' after dotted tail");
                        self.synchronize(1);
                    }
                    let span = start.merge(self.prev_span());
                    if items.len() == 1 {
                        let head = items.pop().expect("one element checked above");
                        return Some(Sexp::Pair(Box::new(head), Box::new(tail), span));
                    }
                    self.warning_at("improper dotted list parsed as a plain list", dot_span);
                    items.push(tail);
                    return Some(Sexp::List(items, span));
                }
                _ => match self.parse_sexp() {
                    Some(expr) => items.push(expr),
                    None => {
                        self.advance();
                    }
                },
            }
        }
    }

    /// Current token index, for rewinding.
    fn token_index(&self) -> usize {
        self.current
    }

    /// Rewinds the cursor to a previously saved index.
    fn rewind(&mut self, index: usize) {
        self.current = index;
    }
}
