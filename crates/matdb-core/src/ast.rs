// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Raw parse tree for SCM material databases.
//!
//! The parser produces this tree without interpreting property semantics:
//! a [`RawMaterial`] is a name, an optional type form, and a sequence of
//! [`RawProperty`] entries whose arguments are either coefficient-typed
//! [`ParamBlock`]s or bare s-expressions. The semantic resolver
//! (`semantic_analysis`) turns this into the typed
//! [`Material`](crate::material::Material) model.
//!
//! Every node carries a [`Span`] so diagnostics can point at the exact
//! parameter block they describe, and so unresolvable parameter tails can
//! be preserved verbatim from the source.

use ecow::EcoString;

use crate::source_analysis::Span;

/// A parsed database file: a flat sequence of materials.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScmFile {
    /// The materials in textual order.
    pub materials: Vec<RawMaterial>,
    /// Source location spanning the entire file.
    pub span: Span,
}

/// One top-level material s-expression, before semantic resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMaterial {
    /// The material name, e.g. `air` or `water-liquid`.
    pub name: EcoString,
    /// The type form: empty, a single state symbol (`fluid`), or a state
    /// plus particle-class symbols (`solid combusting-particle`).
    pub type_form: Vec<EcoString>,
    /// The property entries in textual order.
    pub properties: Vec<RawProperty>,
    /// Source location of the whole material form.
    pub span: Span,
}

/// One property entry inside a material.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProperty {
    /// The property key, e.g. `density` or `binary-diffusivity`.
    pub name: EcoString,
    /// The property's arguments in textual order.
    pub args: Vec<PropertyArg>,
    /// Source location of the property form.
    pub span: Span,
}

/// A property argument: a coefficient-typed parameter block, or a bare
/// sub-expression (`(names ch4 o2)`, a reactions table, a dotted atom).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyArg {
    /// A parameter block opened by a coefficient keyword.
    Block(ParamBlock),
    /// Anything else, preserved structurally for the resolver.
    Expr(Sexp),
}

impl PropertyArg {
    /// Returns the source span of this argument.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Block(block) => block.span,
            Self::Expr(expr) => expr.span(),
        }
    }
}

/// A coefficient-typed parameter block, e.g. `(constant . 1.225)` or
/// `(polynomial piecewise-linear (300 . 1005) (1000 . 1142))`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamBlock {
    /// The coefficient keyword that opened the block.
    pub coeff: CoeffKeyword,
    /// The block's payload.
    pub tail: ParamTail,
    /// Source location of the whole block.
    pub span: Span,
}

/// The payload of a parameter block.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamTail {
    /// A dotted atom: `(constant . 1.225)`, `(constant . #t)`.
    DottedAtom(Sexp),
    /// A flat coefficient list: `(sutherland 1.716e-5 273.15 110.4)`.
    Numbers(Vec<f64>),
    /// Nested tuples: temperature-value pairs or per-range coefficient
    /// lists.
    Pieces(Vec<PolyPiece>),
    /// A verbatim source slice for a tail that matched no alternative.
    Raw(EcoString),
}

/// One piece of a piecewise coefficient payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PolyPiece {
    /// A temperature-value pair: `(300 . 1005)`.
    Pair(f64, f64, Span),
    /// A flat number list: `(200 1000 a0 … a8)`.
    List(Vec<f64>, Span),
}

impl PolyPiece {
    /// Returns the source span of this piece.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Pair(_, _, span) | Self::List(_, span) => *span,
        }
    }
}

/// The coefficient keywords the grammar recognizes at the head of a
/// parameter block.
///
/// This is the process-wide constant symbol table: a pure lookup over the
/// keyword spellings, with the `polynomial` forms qualified by a second
/// symbol (`piecewise-linear`, `piecewise-polynomial`,
/// `nasa-9-piecewise-polynomial`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoeffKeyword {
    /// `constant` — a scalar, or (dotted) a symbol or boolean.
    Constant,
    /// `polynomial` — ascending-order coefficients.
    Polynomial,
    /// `polynomial piecewise-linear` — temperature-value breakpoints.
    PiecewiseLinear,
    /// `polynomial piecewise-polynomial` — per-range coefficient vectors.
    PiecewisePolynomial,
    /// `polynomial nasa-9-piecewise-polynomial` — NASA-9 fits.
    Nasa9Piecewise,
    /// `compressible-liquid`.
    CompressibleLiquid,
    /// `sutherland` — three-coefficient viscosity model.
    Sutherland,
    /// `power-law`.
    PowerLaw,
    /// `blottner-curve-fit` — three-coefficient viscosity model.
    Blottner,
}

impl CoeffKeyword {
    /// Looks up a coefficient keyword from the block's head symbol and, for
    /// the `polynomial` family, the symbol after it.
    ///
    /// Returns the keyword and whether the qualifier symbol was consumed.
    #[must_use]
    pub fn lookup(head: &str, qualifier: Option<&str>) -> Option<(Self, bool)> {
        match head {
            "constant" => Some((Self::Constant, false)),
            "polynomial" => match qualifier {
                Some("piecewise-linear") => Some((Self::PiecewiseLinear, true)),
                Some("piecewise-polynomial") => Some((Self::PiecewisePolynomial, true)),
                Some("nasa-9-piecewise-polynomial") => Some((Self::Nasa9Piecewise, true)),
                _ => Some((Self::Polynomial, false)),
            },
            "compressible-liquid" => Some((Self::CompressibleLiquid, false)),
            "sutherland" => Some((Self::Sutherland, false)),
            "power-law" => Some((Self::PowerLaw, false)),
            "blottner-curve-fit" => Some((Self::Blottner, false)),
            _ => None,
        }
    }

    /// The keyword's source spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Polynomial => "polynomial",
            Self::PiecewiseLinear => "polynomial piecewise-linear",
            Self::PiecewisePolynomial => "polynomial piecewise-polynomial",
            Self::Nasa9Piecewise => "polynomial nasa-9-piecewise-polynomial",
            Self::CompressibleLiquid => "compressible-liquid",
            Self::Sutherland => "sutherland",
            Self::PowerLaw => "power-law",
            Self::Blottner => "blottner-curve-fit",
        }
    }
}

impl std::fmt::Display for CoeffKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generic s-expression, used for property arguments that are not
/// coefficient parameter blocks: species name lists, reactions tables,
/// film-averaged diffusivity forms, and dotted simple values.
#[derive(Debug, Clone, PartialEq)]
pub enum Sexp {
    /// A numeric atom.
    Number(f64, Span),
    /// A symbol atom.
    Symbol(EcoString, Span),
    /// A string atom.
    Str(EcoString, Span),
    /// A boolean atom.
    Bool(bool, Span),
    /// A proper list.
    List(Vec<Sexp>, Span),
    /// A two-element dotted pair `(head . tail)`.
    Pair(Box<Sexp>, Box<Sexp>, Span),
}

impl Sexp {
    /// Returns the source span of this expression.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Number(_, span)
            | Self::Symbol(_, span)
            | Self::Str(_, span)
            | Self::Bool(_, span)
            | Self::List(_, span)
            | Self::Pair(_, _, span) => *span,
        }
    }

    /// Returns the symbol text if this is a symbol atom.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(s, _) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value if this is a number atom.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n, _) => Some(*n),
            _ => None,
        }
    }

    /// Returns the elements if this is a proper list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Sexp]> {
        match self {
            Self::List(items, _) => Some(items),
            _ => None,
        }
    }

    /// Returns the head symbol if this is a non-empty list starting with a
    /// symbol, e.g. `names` for `(names ch4 o2)`.
    #[must_use]
    pub fn head_symbol(&self) -> Option<&str> {
        self.as_list()?.first()?.as_symbol()
    }
}
