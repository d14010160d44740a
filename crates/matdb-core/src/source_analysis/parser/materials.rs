// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Material and property productions.
//!
//! A material is `(name type-decl? property*)`. The type declaration is
//! either a bare symbol (`fluid`) or a parenthesized state-plus-flags list
//! (`(solid combusting-particle)`); the latter is distinguished from the
//! first property by its head symbol, which must be a material state.

use crate::ast::{CoeffKeyword, PropertyArg, RawMaterial, RawProperty};
use crate::source_analysis::TokenKind;

use super::Parser;

/// State symbols that may head a parenthesized type declaration.
const STATE_HEADS: &[&str] = &["fluid", "solid", "mixture"];

impl Parser<'_> {
    /// Parses one top-level material form. The current token is `(`.
    ///
    /// Returns `None` after recording a diagnostic and synchronizing past
    /// the form when the material is unsalvageable.
    pub(super) fn parse_material(&mut self) -> Option<RawMaterial> {
        let start = self.current_token().span();
        self.advance(); // (

        let name = match self.current_kind() {
            TokenKind::Symbol(s) => {
                let name = s.clone();
                self.advance();
                name
            }
            _ => {
                self.set_material_context(None);
                self.error("expected material name");
                self.synchronize(1);
                return None;
            }
        };
        self.set_material_context(Some(name.clone()));

        let type_form = self.parse_type_form()?;

        let mut properties = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::LParen => {
                    let Some(property) = self.parse_property() else {
                        // A property that fails its grammar rejects the
                        // whole material; skip to depth zero.
                        self.synchronize(1);
                        return None;
                    };
                    properties.push(property);
                }
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    self.error("expected ')' to close material");
                    return None;
                }
                _ => {
                    self.error("expected a property form");
                    self.synchronize(1);
                    return None;
                }
            }
        }

        let span = start.merge(self.prev_span());
        Some(RawMaterial {
            name,
            type_form,
            properties,
            span,
        })
    }

    /// Parses the optional type declaration after the material name.
    fn parse_type_form(&mut self) -> Option<Vec<ecow::EcoString>> {
        let mut type_form = Vec::new();
        match self.current_kind() {
            TokenKind::Symbol(s) => {
                type_form.push(s.clone());
                self.advance();
            }
            TokenKind::LParen if self.at_type_form_list() => {
                self.advance(); // (
                while let TokenKind::Symbol(s) = self.current_kind() {
                    type_form.push(s.clone());
                    self.advance();
                }
                if !self.match_token(&TokenKind::RParen) {
                    self.error("expected ')' after material type");
                    self.synchronize(2);
                    return None;
                }
            }
            _ => {}
        }
        Some(type_form)
    }

    /// Whether the `(` at the current position opens a type declaration
    /// rather than a property: its head must be a state symbol.
    fn at_type_form_list(&self) -> bool {
        matches!(
            self.peek_kind(1),
            Some(TokenKind::Symbol(s)) if STATE_HEADS.contains(&s.as_str())
        )
    }

    /// Parses one property form. The current token is `(`.
    fn parse_property(&mut self) -> Option<RawProperty> {
        let start = self.current_token().span();
        self.advance(); // (

        let name = match self.current_kind() {
            TokenKind::Symbol(s) => {
                let name = s.clone();
                self.advance();
                name
            }
            _ => {
                self.error("expected property name");
                self.synchronize(1);
                return None;
            }
        };
        self.set_property_context(Some(name.clone()));

        // Dotted simple value: (chemical-formula . h2o), (latent-heat . #f)
        if self.check(&TokenKind::Dot) {
            self.advance();
            let Some(atom) = self.try_atom() else {
                self.error("expected an atom after '.'");
                self.synchronize(1);
                self.set_property_context(None);
                return None;
            };
            if !self.match_token(&TokenKind::RParen) {
                self.error("expected ')' after dotted property value");
                self.synchronize(1);
                self.set_property_context(None);
                return None;
            }
            let span = start.merge(self.prev_span());
            self.set_property_context(None);
            return Some(RawProperty {
                name,
                args: vec![PropertyArg::Expr(atom)],
                span,
            });
        }

        let mut args = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    self.error("expected ')' to close property");
                    self.set_property_context(None);
                    return None;
                }
                TokenKind::LParen if self.at_param_block() => {
                    match self.parse_param_block() {
                        Some(block) => args.push(PropertyArg::Block(block)),
                        None => {
                            self.set_property_context(None);
                            return None;
                        }
                    }
                }
                TokenKind::Dot => {
                    self.error("unexpected '.' in property arguments");
                    self.advance();
                }
                _ => match self.parse_sexp() {
                    Some(expr) => args.push(PropertyArg::Expr(expr)),
                    None => {
                        self.advance();
                    }
                },
            }
        }

        let span = start.merge(self.prev_span());
        self.set_property_context(None);
        Some(RawProperty { name, args, span })
    }

    /// Whether the `(` at the current position opens a coefficient-typed
    /// parameter block, decided by the constant keyword table.
    fn at_param_block(&self) -> bool {
        matches!(
            self.peek_kind(1),
            Some(TokenKind::Symbol(s)) if CoeffKeyword::lookup(s, None).is_some()
        )
    }
}
