// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for SCM material databases.
//!
//! The parser builds a raw [`ScmFile`] tree from a token stream. It is
//! designed for dirty real-world inputs with comprehensive error recovery:
//! a malformed material never takes the rest of the file down with it.
//!
//! # Design Philosophy
//!
//! - **Error recovery is mandatory** — a grammar failure records a
//!   diagnostic and skips to parenthesis depth zero, where the next
//!   top-level material begins.
//! - **Multiple errors** — report all problems, don't stop at the first.
//! - **Nothing is dropped silently** — a parameter tail that matches no
//!   grammar alternative is captured as a verbatim source slice
//!   ([`ParamTail::Raw`]) so the data survives a round trip.
//! - **Precise spans** — every diagnostic points at the offending bytes.
//!
//! # Usage
//!
//! ```
//! use matdb_core::source_analysis::{lex_with_eof, parse};
//!
//! let source = "(air fluid (density (constant . 1.225)))";
//! let (tokens, lex_errors) = lex_with_eof(source);
//! assert!(lex_errors.is_empty());
//!
//! let (file, diagnostics) = parse(tokens, source);
//! assert!(diagnostics.is_empty());
//! assert_eq!(file.materials.len(), 1);
//! assert_eq!(file.materials[0].name, "air");
//! ```

use ecow::EcoString;

use crate::ast::ScmFile;
use crate::source_analysis::{Span, Token, TokenKind};

mod materials;
mod parameters;

#[cfg(test)]
mod property_tests;

/// A diagnostic message attached to a material or property.
///
/// `span.start()` is the byte offset reported to external consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: Severity,
    /// The human-readable message.
    pub message: EcoString,
    /// The source location.
    pub span: Span,
    /// The material being parsed or resolved, when known.
    pub material: Option<EcoString>,
    /// The property being parsed or resolved, when known.
    pub property: Option<EcoString>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            material: None,
            property: None,
        }
    }

    /// Creates a new warning diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span,
            material: None,
            property: None,
        }
    }

    /// Attaches the material name this diagnostic belongs to.
    #[must_use]
    pub fn with_material(mut self, material: impl Into<EcoString>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Attaches the property name this diagnostic belongs to.
    #[must_use]
    pub fn with_property(mut self, property: impl Into<EcoString>) -> Self {
        self.property = Some(property.into());
        self
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The enclosing form was rejected.
    Error,
    /// The record was kept, demoted to an opaque payload where needed.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// Parses a token stream into a raw [`ScmFile`].
///
/// Always returns a file, even when the input has syntax errors; check the
/// returned diagnostics for anything at [`Severity::Error`]. The source
/// text must be the same string the tokens were lexed from — it is used to
/// capture verbatim slices for unresolvable parameter tails.
#[must_use]
pub fn parse(tokens: Vec<Token>, source: &str) -> (ScmFile, Vec<Diagnostic>) {
    let mut parser = Parser::new(tokens, source);
    let file = parser.parse_file();
    (file, parser.diagnostics)
}

/// The parser state.
pub(super) struct Parser<'src> {
    /// The tokens being parsed, ending with EOF.
    tokens: Vec<Token>,
    /// Current token index.
    current: usize,
    /// Accumulated diagnostics.
    diagnostics: Vec<Diagnostic>,
    /// The source text, for verbatim tail capture.
    source: &'src str,
    /// Material name attached to new diagnostics.
    context_material: Option<EcoString>,
    /// Property name attached to new diagnostics.
    context_property: Option<EcoString>,
}

impl<'src> Parser<'src> {
    fn new(mut tokens: Vec<Token>, source: &'src str) -> Self {
        if !tokens.last().is_some_and(|t| t.kind().is_eof()) {
            let end = Span::point(u32::try_from(source.len()).unwrap_or(u32::MAX));
            tokens.push(Token::new(TokenKind::Eof, end));
        }
        Self {
            tokens,
            current: 0,
            diagnostics: Vec::new(),
            source,
            context_material: None,
            context_property: None,
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Returns the current token.
    pub(super) fn current_token(&self) -> &Token {
        self.tokens
            .get(self.current)
            .or_else(|| self.tokens.last())
            .expect("token stream always ends with EOF")
    }

    /// Returns the current token kind.
    pub(super) fn current_kind(&self) -> &TokenKind {
        self.current_token().kind()
    }

    /// Peeks at the token kind `n` positions ahead.
    pub(super) fn peek_kind(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + n).map(Token::kind)
    }

    /// Checks if we're at the end of input.
    pub(super) fn is_at_end(&self) -> bool {
        self.current_kind().is_eof()
    }

    /// Advances to the next token and returns the consumed one.
    pub(super) fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.tokens[self.current - 1].clone()
    }

    /// Checks whether the current token matches the given kind.
    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consumes the current token if it matches, returning whether it did.
    pub(super) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Returns the span of the most recently consumed token.
    pub(super) fn prev_span(&self) -> Span {
        if self.current == 0 {
            self.current_token().span()
        } else {
            self.tokens[self.current - 1].span()
        }
    }

    /// Returns the source text.
    pub(super) fn source(&self) -> &'src str {
        self.source
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Records an error diagnostic at the current token.
    pub(super) fn error(&mut self, message: impl Into<EcoString>) {
        let span = self.current_token().span();
        self.error_at(message, span);
    }

    /// Records an error diagnostic at a specific span.
    pub(super) fn error_at(&mut self, message: impl Into<EcoString>, span: Span) {
        let diagnostic = self.contextualize(Diagnostic::error(message, span));
        self.diagnostics.push(diagnostic);
    }

    /// Records a warning diagnostic at a specific span.
    pub(super) fn warning_at(&mut self, message: impl Into<EcoString>, span: Span) {
        let diagnostic = self.contextualize(Diagnostic::warning(message, span));
        self.diagnostics.push(diagnostic);
    }

    fn contextualize(&self, mut diagnostic: Diagnostic) -> Diagnostic {
        diagnostic.material = self.context_material.clone();
        diagnostic.property = self.context_property.clone();
        diagnostic
    }

    /// Sets the material name attached to subsequent diagnostics.
    pub(super) fn set_material_context(&mut self, name: Option<EcoString>) {
        self.context_material = name;
        self.context_property = None;
    }

    /// Sets the property name attached to subsequent diagnostics.
    pub(super) fn set_property_context(&mut self, name: Option<EcoString>) {
        self.context_property = name;
    }

    // ========================================================================
    // Error Recovery
    // ========================================================================

    /// Skips tokens until the parenthesis depth returns to zero.
    ///
    /// `depth` is the number of unclosed `(` the parser is currently
    /// inside. After this returns, the parser sits just past the `)` that
    /// closed the outermost of those forms (or at EOF).
    pub(super) fn synchronize(&mut self, mut depth: u32) {
        while depth > 0 && !self.is_at_end() {
            match self.current_kind() {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            self.advance();
        }
    }

    // ========================================================================
    // Entry
    // ========================================================================

    /// Parses the whole file: a flat sequence of materials.
    fn parse_file(&mut self) -> ScmFile {
        let start = self.current_token().span();
        let mut materials = Vec::new();

        while !self.is_at_end() {
            if self.check(&TokenKind::LParen) {
                if let Some(material) = self.parse_material() {
                    materials.push(material);
                }
            } else {
                self.error("expected '(' to open a material");
                self.advance();
            }
        }
        self.set_material_context(None);

        let span = start.merge(self.prev_span());
        ScmFile { materials, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CoeffKeyword, ParamTail, PolyPiece, PropertyArg, Sexp};
    use crate::source_analysis::lex_with_eof;

    fn parse_ok(source: &str) -> ScmFile {
        let (tokens, lex_errors) = lex_with_eof(source);
        assert!(lex_errors.is_empty(), "lex errors: {lex_errors:?}");
        let (file, diagnostics) = parse(tokens, source);
        assert!(diagnostics.is_empty(), "diagnostics: {diagnostics:?}");
        file
    }

    fn parse_with_diagnostics(source: &str) -> (ScmFile, Vec<Diagnostic>) {
        let (tokens, _) = lex_with_eof(source);
        parse(tokens, source)
    }

    #[test]
    fn parses_minimal_material() {
        let file = parse_ok("(air fluid)");
        assert_eq!(file.materials.len(), 1);
        assert_eq!(file.materials[0].name, "air");
        assert_eq!(file.materials[0].type_form, vec!["fluid"]);
        assert!(file.materials[0].properties.is_empty());
    }

    #[test]
    fn parses_material_without_type_form() {
        let file = parse_ok("(cp-nasa (specific-heat (constant . 1000)))");
        let material = &file.materials[0];
        assert_eq!(material.name, "cp-nasa");
        assert!(material.type_form.is_empty());
        assert_eq!(material.properties.len(), 1);
    }

    #[test]
    fn parses_parenthesized_type_form() {
        let file = parse_ok("(coal (solid combusting-particle) (density (constant . 1300)))");
        let material = &file.materials[0];
        assert_eq!(material.type_form, vec!["solid", "combusting-particle"]);
        assert_eq!(material.properties.len(), 1);
    }

    #[test]
    fn parses_constant_parameter_block() {
        let file = parse_ok("(air fluid (density (constant . 1.225)))");
        let property = &file.materials[0].properties[0];
        assert_eq!(property.name, "density");
        let PropertyArg::Block(block) = &property.args[0] else {
            panic!("expected parameter block, got {:?}", property.args[0]);
        };
        assert_eq!(block.coeff, CoeffKeyword::Constant);
        assert!(
            matches!(&block.tail, ParamTail::DottedAtom(Sexp::Number(n, _)) if *n == 1.225)
        );
    }

    #[test]
    fn parses_flat_coefficient_list() {
        let file = parse_ok("(air fluid (viscosity (sutherland 1.716e-5 273.15 110.4)))");
        let PropertyArg::Block(block) = &file.materials[0].properties[0].args[0] else {
            panic!("expected parameter block");
        };
        assert_eq!(block.coeff, CoeffKeyword::Sutherland);
        assert_eq!(
            block.tail,
            ParamTail::Numbers(vec![1.716e-5, 273.15, 110.4])
        );
    }

    #[test]
    fn parses_piecewise_linear_pairs() {
        let file = parse_ok(
            "(air fluid (specific-heat (polynomial piecewise-linear (300 . 1005) (1000 . 1142))))",
        );
        let PropertyArg::Block(block) = &file.materials[0].properties[0].args[0] else {
            panic!("expected parameter block");
        };
        assert_eq!(block.coeff, CoeffKeyword::PiecewiseLinear);
        let ParamTail::Pieces(pieces) = &block.tail else {
            panic!("expected pieces, got {:?}", block.tail);
        };
        assert_eq!(pieces.len(), 2);
        assert!(matches!(pieces[0], PolyPiece::Pair(t, v, _) if t == 300.0 && v == 1005.0));
    }

    #[test]
    fn parses_nasa9_pieces_as_lists() {
        let file = parse_ok(
            "(n2 fluid (specific-heat (polynomial nasa-9-piecewise-polynomial \
             (200 1000 1 2 3 4 5 6 7 8 9) (1000 6000 9 8 7 6 5 4 3 2 1))))",
        );
        let PropertyArg::Block(block) = &file.materials[0].properties[0].args[0] else {
            panic!("expected parameter block");
        };
        assert_eq!(block.coeff, CoeffKeyword::Nasa9Piecewise);
        let ParamTail::Pieces(pieces) = &block.tail else {
            panic!("expected pieces");
        };
        assert_eq!(pieces.len(), 2);
        assert!(matches!(&pieces[0], PolyPiece::List(nums, _) if nums.len() == 11));
    }

    #[test]
    fn parses_dotted_simple_value() {
        let file = parse_ok("(ch4 fluid (chemical-formula . ch4))");
        let property = &file.materials[0].properties[0];
        assert_eq!(property.name, "chemical-formula");
        assert!(
            matches!(&property.args[0], PropertyArg::Expr(Sexp::Symbol(s, _)) if s == "ch4")
        );
    }

    #[test]
    fn parses_species_names_as_expr() {
        let file = parse_ok("(mix mixture (species (names ch4 o2 co2)))");
        let property = &file.materials[0].properties[0];
        assert_eq!(property.name, "species");
        let PropertyArg::Expr(expr) = &property.args[0] else {
            panic!("expected bare expression");
        };
        assert_eq!(expr.head_symbol(), Some("names"));
        assert_eq!(expr.as_list().map(<[Sexp]>::len), Some(4));
    }

    #[test]
    fn parses_multiple_materials_in_order() {
        let file = parse_ok(
            "(air fluid (density (constant . 1.225)))\n\
             (glass solid (density (constant . 2500)))",
        );
        assert_eq!(file.materials.len(), 2);
        assert_eq!(file.materials[0].name, "air");
        assert_eq!(file.materials[1].name, "glass");
    }

    #[test]
    fn unknown_coefficient_head_parses_as_expr() {
        let file = parse_ok("(x fluid (binary-diffusivity (film-averaged (averaging-coefficient 0.33))))");
        let property = &file.materials[0].properties[0];
        assert!(matches!(&property.args[0], PropertyArg::Expr(e) if e.head_symbol() == Some("film-averaged")));
    }

    #[test]
    fn raw_tail_captures_verbatim_source() {
        let source = "(x fluid (density (constant fancy (stuff))))";
        let (file, diagnostics) = parse_with_diagnostics(source);
        let PropertyArg::Block(block) = &file.materials[0].properties[0].args[0] else {
            panic!("expected parameter block");
        };
        let ParamTail::Raw(raw) = &block.tail else {
            panic!("expected raw tail, got {:?}", block.tail);
        };
        assert_eq!(raw, "fancy (stuff)");
        assert!(diagnostics.iter().all(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn recovers_from_broken_material() {
        let (file, diagnostics) = parse_with_diagnostics(
            "(broken fluid (density (constant . )))\n\
             (good fluid (density (constant . 1.0)))",
        );
        assert!(diagnostics.iter().any(|d| d.severity == Severity::Error
            || d.severity == Severity::Warning));
        assert!(file.materials.iter().any(|m| m.name == "good"));
    }

    #[test]
    fn diagnostics_carry_material_and_property_context() {
        let (_, diagnostics) =
            parse_with_diagnostics("(broken fluid (density (constant . bad extra .)))");
        let with_context = diagnostics
            .iter()
            .find(|d| d.material.is_some())
            .expect("expected a contextualized diagnostic");
        assert_eq!(with_context.material.as_deref(), Some("broken"));
    }

    #[test]
    fn stray_token_at_top_level_is_reported() {
        let (file, diagnostics) = parse_with_diagnostics("42 (air fluid)");
        assert_eq!(file.materials.len(), 1);
        assert!(diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error && d.span.start() == 0));
    }

    #[test]
    fn missing_close_paren_is_reported() {
        let (_, diagnostics) = parse_with_diagnostics("(air fluid (density (constant . 1.0))");
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn property_order_is_preserved() {
        let file = parse_ok(
            "(glass solid (density (constant . 2500)) (specific-heat (constant . 840)))",
        );
        let names: Vec<_> = file.materials[0]
            .properties
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["density", "specific-heat"]);
    }
}
