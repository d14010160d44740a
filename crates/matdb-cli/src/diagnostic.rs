// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic rendering using miette.
//!
//! Converts matdb-core diagnostics into miette-formatted reports with
//! source context, arrows at the offending bytes, and the material and
//! property each diagnostic belongs to.

#![allow(unused)]

use matdb_core::source_analysis::{Diagnostic as CoreDiagnostic, LexError, Severity};
use miette::{Diagnostic, SourceSpan};

/// A catalog diagnostic with rich formatting.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(matdb::parse))]
pub struct CatalogDiagnostic {
    /// Error or warning.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Source code for context.
    #[source_code]
    pub src: miette::NamedSource<String>,
    /// Location of the problem.
    #[label("{label}")]
    pub span: SourceSpan,
    /// Label naming the material and property.
    pub label: String,
}

impl CatalogDiagnostic {
    /// Creates a renderable diagnostic from a matdb-core diagnostic.
    pub fn from_core(diagnostic: &CoreDiagnostic, source_path: &str, source: &str) -> Self {
        let label = match (&diagnostic.material, &diagnostic.property) {
            (Some(material), Some(property)) => format!("in {material}, property {property}"),
            (Some(material), None) => format!("in {material}"),
            _ => match diagnostic.severity {
                Severity::Error => "error here".to_string(),
                Severity::Warning => "warning here".to_string(),
            },
        };

        Self {
            severity: diagnostic.severity,
            message: diagnostic.message.to_string(),
            src: miette::NamedSource::new(source_path, source.to_string()),
            span: diagnostic.span.into(),
            label,
        }
    }
}

/// Prints every diagnostic to stderr as a miette report.
pub fn render_all(diagnostics: &[CoreDiagnostic], source_path: &str, source: &str) {
    for diagnostic in diagnostics {
        let report =
            miette::Report::new(CatalogDiagnostic::from_core(diagnostic, source_path, source));
        eprintln!("{report:?}");
    }
}

/// Prints a fatal lexical error to stderr with source context.
pub fn render_lex_error(error: &LexError, source_path: &str, source: &str) {
    let report = miette::Report::new(error.clone())
        .with_source_code(miette::NamedSource::new(source_path, source.to_string()));
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use matdb_core::source_analysis::Span;

    #[test]
    fn from_core_keeps_location_and_message() {
        let core = CoreDiagnostic::error("expected material name", Span::new(10, 15));
        let source = "(air fluid (density (constant . 1.225)))";
        let diagnostic = CatalogDiagnostic::from_core(&core, "test.scm", source);

        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.message, "expected material name");
        assert_eq!(diagnostic.span.offset(), 10);
        assert_eq!(diagnostic.span.len(), 5);
        assert_eq!(diagnostic.label, "error here");
    }

    #[test]
    fn from_core_labels_material_and_property() {
        let core = CoreDiagnostic::warning("arity mismatch", Span::new(0, 4))
            .with_material("air")
            .with_property("viscosity");
        let diagnostic = CatalogDiagnostic::from_core(&core, "test.scm", "(air)");
        assert_eq!(diagnostic.label, "in air, property viscosity");
    }
}
