// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property semantics resolution.
//!
//! This pass consumes the raw parse tree and produces typed
//! [`Material`]s. For each property it routes the parameter payload
//! through the keyword→variant table ([`coefficients`]), attaches units
//! from the static table ([`units`]), and handles the properties with
//! structural meaning: `chemical-formula`, `species`, state-as-property
//! forms, `reactions`, and `binary-diffusivity` with its `film-averaged`
//! composite.
//!
//! # Error Handling
//!
//! The resolver never rejects a material. An invariant violation (arity
//! mismatch, non-monotonic ranges, payload shape mismatch) demotes the
//! offending record to [`Coefficient::Opaque`], preserving the source
//! bytes, and attaches a warning diagnostic naming the material and
//! property.

pub mod coefficients;
pub mod units;

use ecow::EcoString;
use tracing::debug;

use crate::ast::{ParamBlock, ParamTail, PolyPiece, PropertyArg, RawMaterial, RawProperty, ScmFile, Sexp};
use crate::ast::CoeffKeyword;
use crate::material::{
    Coefficient, Material, MaterialState, ParticleFlag, PropertyRecord, Reaction, ReactionField,
};
use crate::source_analysis::{Diagnostic, Span};

pub use coefficients::CoefficientError;
pub use units::unit_for;

/// Resolves a parsed file into typed materials.
///
/// The source text must be the string the file was parsed from; it is
/// used to preserve verbatim payloads for records demoted to
/// [`Coefficient::Opaque`]. Property records keep the textual order of
/// the source file.
#[must_use]
pub fn resolve(file: &ScmFile, source: &str) -> (Vec<Material>, Vec<Diagnostic>) {
    let mut resolver = Resolver {
        source,
        diagnostics: Vec::new(),
        material: None,
        property: None,
    };
    let materials = file
        .materials
        .iter()
        .map(|raw| resolver.resolve_material(raw))
        .collect();
    (materials, resolver.diagnostics)
}

struct Resolver<'src> {
    source: &'src str,
    diagnostics: Vec<Diagnostic>,
    material: Option<EcoString>,
    property: Option<EcoString>,
}

impl Resolver<'_> {
    fn warn(&mut self, message: impl Into<EcoString>, span: Span) {
        let mut diagnostic = Diagnostic::warning(message, span);
        diagnostic.material = self.material.clone();
        diagnostic.property = self.property.clone();
        self.diagnostics.push(diagnostic);
    }

    fn slice(&self, span: Span) -> EcoString {
        EcoString::from(span.slice(self.source).trim())
    }

    // ========================================================================
    // Materials
    // ========================================================================

    fn resolve_material(&mut self, raw: &RawMaterial) -> Material {
        self.material = Some(raw.name.clone());
        self.property = None;

        let mut material = Material::new(raw.name.clone());
        for word in raw.type_form.clone() {
            self.apply_type_word(&mut material, &word, raw.span);
        }
        for property in &raw.properties {
            self.property = Some(property.name.clone());
            self.resolve_property(&mut material, property);
        }
        self.property = None;

        debug!(
            material = %material.name,
            state = ?material.state,
            properties = material.properties.len(),
            "resolved material"
        );
        material
    }

    /// Applies one word of a type form: a state or a particle class.
    fn apply_type_word(&mut self, material: &mut Material, word: &str, span: Span) {
        match word {
            "fluid" => material.state = MaterialState::Fluid,
            "solid" => material.state = MaterialState::Solid,
            "mixture" => material.state = MaterialState::Mixture,
            "inert-particle" => Self::apply_particle(material, ParticleFlag::Inert),
            "droplet-particle" => Self::apply_particle(material, ParticleFlag::Droplet),
            "combusting-particle" | "combustion" => {
                Self::apply_particle(material, ParticleFlag::Combusting);
            }
            _ => self.warn(format!("unknown material type '{word}'"), span),
        }
    }

    /// A particle class implies a solid unless a state was declared.
    fn apply_particle(material: &mut Material, flag: ParticleFlag) {
        if material.state == MaterialState::Invalid {
            material.state = MaterialState::Solid;
        }
        material.add_particle_flag(flag);
    }

    // ========================================================================
    // Property dispatch
    // ========================================================================

    fn resolve_property(&mut self, material: &mut Material, property: &RawProperty) {
        match property.name.as_str() {
            "chemical-formula" => self.resolve_chemical_formula(material, property),
            "species" => self.resolve_species(material, property),
            "fluid" | "solid" | "mixture" => self.resolve_state_property(material, property),
            "reactions" => self.resolve_reactions(material, property),
            "binary-diffusivity" => self.resolve_binary_diffusivity(material, property),
            _ => self.resolve_generic(material, property),
        }
    }

    /// `(chemical-formula . h2o)` populates the formula slot; `#f` means
    /// no formula.
    fn resolve_chemical_formula(&mut self, material: &mut Material, property: &RawProperty) {
        match property.args.as_slice() {
            [PropertyArg::Expr(Sexp::Bool(false, _))] => {}
            [PropertyArg::Expr(Sexp::Symbol(s, _) | Sexp::Str(s, _))] => {
                material.chemical_formula = Some(s.clone());
            }
            [PropertyArg::Block(ParamBlock {
                tail: ParamTail::DottedAtom(Sexp::Symbol(s, _) | Sexp::Str(s, _)),
                ..
            })] => {
                material.chemical_formula = Some(s.clone());
            }
            _ => self.warn("chemical-formula expects a symbol or #f", property.span),
        }
    }

    /// `(species (names ch4 o2 …))` fills the composition and implies a
    /// mixture when no state was declared.
    fn resolve_species(&mut self, material: &mut Material, property: &RawProperty) {
        for arg in &property.args {
            let PropertyArg::Expr(expr) = arg else {
                continue;
            };
            if expr.head_symbol() != Some("names") {
                continue;
            }
            let items = expr.as_list().unwrap_or_default();
            for item in &items[1..] {
                match item.as_symbol() {
                    Some(name) => material.species_names.push(EcoString::from(name)),
                    None => self.warn("species names must be symbols", item.span()),
                }
            }
            if material.state == MaterialState::Invalid {
                material.state = MaterialState::Mixture;
            }
            return;
        }
        self.warn("species expects a (names …) list", property.span);
    }

    /// A state symbol used as a property header sets the state; trailing
    /// symbols are particle classes.
    fn resolve_state_property(&mut self, material: &mut Material, property: &RawProperty) {
        let name = property.name.clone();
        self.apply_type_word(material, &name, property.span);
        for arg in &property.args {
            match arg {
                PropertyArg::Expr(Sexp::Symbol(word, span)) => {
                    let word = word.clone();
                    self.apply_type_word(material, &word, *span);
                }
                other => self.warn("expected a particle-class symbol", other.span()),
            }
        }
    }

    /// Attaches the reactions table as a structured sub-record without
    /// interpreting stoichiometry semantics.
    fn resolve_reactions(&mut self, material: &mut Material, property: &RawProperty) {
        let Some(PropertyArg::Expr(expr)) = property.args.first() else {
            self.warn("reactions expects a mechanism list", property.span);
            return;
        };
        let Some(items) = expr.as_list() else {
            self.warn("reactions expects a mechanism list", expr.span());
            return;
        };
        let Some(mechanism) = items.first().and_then(Sexp::as_symbol) else {
            self.warn("reactions mechanism must be a symbol", expr.span());
            return;
        };

        let mut reactions = Vec::new();
        for item in &items[1..] {
            if let Some(name) = item.head_symbol() {
                let entries = item.as_list().unwrap_or_default();
                let fields = entries[1..]
                    .iter()
                    .filter_map(Self::reaction_field)
                    .collect();
                reactions.push(Reaction {
                    name: EcoString::from(name),
                    fields,
                });
            } else {
                self.warn("reaction entry must be a named list", item.span());
            }
        }

        material.properties.push(PropertyRecord::new(
            property.name.clone(),
            Coefficient::Reactions {
                mechanism: EcoString::from(mechanism),
                reactions,
            },
        ));
    }

    /// One named sub-field of a reaction, with its numbers and symbols
    /// collected from arbitrary nesting in document order.
    fn reaction_field(sexp: &Sexp) -> Option<ReactionField> {
        let (name, rest): (&str, &[Sexp]) = match sexp {
            Sexp::List(items, _) => (items.first()?.as_symbol()?, &items[1..]),
            Sexp::Pair(head, tail, _) => {
                let name = head.as_symbol()?;
                (name, std::slice::from_ref(&**tail))
            }
            _ => return None,
        };
        let mut values = Vec::new();
        let mut symbols = Vec::new();
        for item in rest {
            Self::collect_leaves(item, &mut values, &mut symbols);
        }
        Some(ReactionField {
            name: EcoString::from(name),
            values,
            symbols,
        })
    }

    fn collect_leaves(sexp: &Sexp, values: &mut Vec<f64>, symbols: &mut Vec<EcoString>) {
        match sexp {
            Sexp::Number(n, _) => values.push(*n),
            Sexp::Symbol(s, _) => symbols.push(s.clone()),
            Sexp::List(items, _) => {
                for item in items {
                    Self::collect_leaves(item, values, symbols);
                }
            }
            Sexp::Pair(head, tail, _) => {
                Self::collect_leaves(head, values, symbols);
                Self::collect_leaves(tail, values, symbols);
            }
            Sexp::Str(..) | Sexp::Bool(..) => {}
        }
    }

    /// `binary-diffusivity` may repeat: each parameter block is one
    /// record, and a `film-averaged` form becomes a composite record.
    fn resolve_binary_diffusivity(&mut self, material: &mut Material, property: &RawProperty) {
        if property.args.is_empty() {
            self.warn("binary-diffusivity has no value", property.span);
            return;
        }
        for arg in &property.args {
            match arg {
                PropertyArg::Block(block) => {
                    let record = self.record_from_block(&property.name, block);
                    material.properties.push(record);
                }
                PropertyArg::Expr(expr) if expr.head_symbol() == Some("film-averaged") => {
                    let record = self.resolve_film_averaged(&property.name, expr);
                    material.properties.push(record);
                }
                PropertyArg::Expr(expr) => {
                    self.warn("unrecognized binary-diffusivity form kept verbatim", expr.span());
                    material.properties.push(self.opaque_record(&property.name, expr.span()));
                }
            }
        }
    }

    /// Resolves a `(film-averaged …)` form into a composite record. The
    /// inner film diffusivity goes through the same coefficient dispatch
    /// and must not itself be film-averaged.
    fn resolve_film_averaged(&mut self, name: &EcoString, expr: &Sexp) -> PropertyRecord {
        let Some(items) = expr.as_list() else {
            self.warn("malformed film-averaged form", expr.span());
            return self.opaque_record(name, expr.span());
        };

        // Members may appear directly or wrapped in one extra list.
        let mut members: &[Sexp] = &items[1..];
        if let [Sexp::List(inner, _)] = members {
            if inner.first().is_some_and(|f| f.as_symbol().is_none()) {
                members = inner;
            }
        }

        let mut averaging = None;
        let mut inner_record = None;
        for member in members {
            match member.head_symbol() {
                Some("averaging-coefficient") => {
                    let value = member
                        .as_list()
                        .and_then(|m| m.get(1))
                        .and_then(Sexp::as_number);
                    if let Some(value) = value {
                        averaging = Some(value);
                    } else {
                        self.warn("averaging-coefficient expects a number", member.span());
                    }
                }
                Some("film-diffusivity") => {
                    inner_record = self.resolve_film_diffusivity(name, member);
                }
                _ => self.warn("unknown film-averaged member", member.span()),
            }
        }

        match (averaging, inner_record) {
            (Some(averaging_coefficient), Some(inner)) => PropertyRecord::with_unit(
                name.clone(),
                unit_for(name),
                Coefficient::FilmAveraged {
                    averaging_coefficient,
                    film_diffusivity: Box::new(inner),
                },
            ),
            _ => {
                self.warn(
                    "film-averaged requires averaging-coefficient and film-diffusivity",
                    expr.span(),
                );
                self.opaque_record(name, expr.span())
            }
        }
    }

    /// Resolves the `(film-diffusivity <parameter>)` member.
    fn resolve_film_diffusivity(
        &mut self,
        name: &EcoString,
        member: &Sexp,
    ) -> Option<PropertyRecord> {
        let inner = member.as_list().and_then(|m| m.get(1));
        let Some(inner) = inner else {
            self.warn("film-diffusivity expects a parameter block", member.span());
            return None;
        };
        if inner.head_symbol() == Some("film-averaged") {
            self.warn("film-diffusivity must not nest film-averaged", inner.span());
            return Some(self.opaque_record(name, inner.span()));
        }
        let coefficient = match Self::param_from_sexp(inner) {
            Some((keyword, tail)) => match coefficients::build(keyword, &tail) {
                Ok(coefficient) => coefficient,
                Err(err) => {
                    self.warn(err.to_string(), inner.span());
                    Coefficient::Opaque(self.slice(inner.span()))
                }
            },
            None => {
                self.warn("unrecognized film-diffusivity parameter kept verbatim", inner.span());
                Coefficient::Opaque(self.slice(inner.span()))
            }
        };
        Some(PropertyRecord::with_unit(
            name.clone(),
            unit_for(name),
            coefficient,
        ))
    }

    /// Reinterprets a generic s-expression as a coefficient parameter,
    /// for parameters nested where the grammar could not reach them.
    fn param_from_sexp(sexp: &Sexp) -> Option<(CoeffKeyword, ParamTail)> {
        match sexp {
            Sexp::Pair(head, tail, _) => {
                let (keyword, _) = CoeffKeyword::lookup(head.as_symbol()?, None)?;
                Some((keyword, ParamTail::DottedAtom((**tail).clone())))
            }
            Sexp::List(items, _) => {
                let head = items.first()?.as_symbol()?;
                let qualifier = items.get(1).and_then(Sexp::as_symbol);
                let (keyword, qualifier_consumed) = CoeffKeyword::lookup(head, qualifier)?;
                let rest = &items[if qualifier_consumed { 2 } else { 1 }..];

                if rest.iter().all(|item| item.as_number().is_some()) {
                    let numbers = rest.iter().filter_map(Sexp::as_number).collect();
                    return Some((keyword, ParamTail::Numbers(numbers)));
                }

                let mut pieces = Vec::with_capacity(rest.len());
                for item in rest {
                    match item {
                        Sexp::Pair(a, b, span) => {
                            pieces.push(PolyPiece::Pair(a.as_number()?, b.as_number()?, *span));
                        }
                        Sexp::List(entries, span) => {
                            let numbers: Option<Vec<f64>> =
                                entries.iter().map(Sexp::as_number).collect();
                            pieces.push(PolyPiece::List(numbers?, *span));
                        }
                        _ => return None,
                    }
                }
                Some((keyword, ParamTail::Pieces(pieces)))
            }
            _ => None,
        }
    }

    /// Default resolution: one record per parameter block, plus the
    /// dotted-pair simple-value forms.
    fn resolve_generic(&mut self, material: &mut Material, property: &RawProperty) {
        if property.args.is_empty() {
            self.warn("property has no value", property.span);
            return;
        }

        // Dotted pair without a coefficient keyword: (prop . atom).
        if let [PropertyArg::Expr(atom)] = property.args.as_slice() {
            let coefficient = match atom {
                Sexp::Number(n, _) => Some(Coefficient::Constant(*n)),
                Sexp::Symbol(s, _) | Sexp::Str(s, _) => Some(Coefficient::StringRef(s.clone())),
                Sexp::Bool(true, _) => Some(Coefficient::Boolean(true)),
                // #f in a value slot: explicitly absent.
                Sexp::Bool(false, _) => Some(Coefficient::None),
                Sexp::List(..) | Sexp::Pair(..) => None,
            };
            if let Some(coefficient) = coefficient {
                material.properties.push(PropertyRecord::with_unit(
                    property.name.clone(),
                    unit_for(&property.name),
                    coefficient,
                ));
                return;
            }
        }

        for arg in &property.args {
            match arg {
                PropertyArg::Block(block) => {
                    let record = self.record_from_block(&property.name, block);
                    material.properties.push(record);
                }
                PropertyArg::Expr(expr) => {
                    self.warn("unexpected property argument kept verbatim", expr.span());
                    material
                        .properties
                        .push(self.opaque_record(&property.name, expr.span()));
                }
            }
        }
    }

    /// Builds one record from a parameter block, demoting failures to an
    /// opaque payload.
    fn record_from_block(&mut self, name: &EcoString, block: &ParamBlock) -> PropertyRecord {
        let coefficient = match &block.tail {
            // The parser already diagnosed the verbatim capture.
            ParamTail::Raw(text) => Coefficient::Opaque(text.clone()),
            tail => match coefficients::build(block.coeff, tail) {
                Ok(coefficient) => coefficient,
                Err(err) => {
                    self.warn(err.to_string(), block.span);
                    Coefficient::Opaque(self.slice(block.span))
                }
            },
        };
        PropertyRecord::with_unit(name.clone(), unit_for(name), coefficient)
    }

    fn opaque_record(&self, name: &EcoString, span: Span) -> PropertyRecord {
        PropertyRecord::with_unit(name.clone(), unit_for(name), Coefficient::Opaque(self.slice(span)))
    }
}
