// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the SCM parser and the full pipeline.
//!
//! Invariants:
//!
//! 1. **Pipeline never panics** — arbitrary input may produce diagnostics,
//!    never a crash
//! 2. **Generated materials parse cleanly** — well-formed sources produce
//!    zero diagnostics and the expected material names
//! 3. **Resolved materials always validate** — the model invariants hold
//!    for whatever the pipeline produces, clean input or not
//! 4. **Canonical serialization is idempotent** — serialize ∘ deserialize
//!    is the identity on parsed catalogs

use proptest::prelude::*;

use crate::semantic_analysis::resolve;
use crate::source_analysis::{lex_with_eof, parse};

// ============================================================================
// Generators
// ============================================================================

fn material_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}(-[a-z0-9]{1,5})?"
}

fn state() -> impl Strategy<Value = &'static str> {
    prop::sample::select(&["fluid", "solid", "mixture"] as &[&str])
}

fn scalar_property() -> impl Strategy<Value = String> {
    (
        prop::sample::select(
            &[
                "density",
                "viscosity",
                "thermal-conductivity",
                "molecular-weight",
                "latent-heat",
                "emissivity",
            ] as &[&str],
        ),
        -1.0e6..1.0e6f64,
    )
        .prop_map(|(name, value)| format!("({name} (constant . {value}))"))
}

fn sutherland_property() -> impl Strategy<Value = String> {
    (0.0..1.0f64, 100.0..500.0f64, 0.0..200.0f64)
        .prop_map(|(a, b, c)| format!("(viscosity (sutherland {a} {b} {c}))"))
}

fn piecewise_linear_property() -> impl Strategy<Value = String> {
    // Strictly increasing temperatures by construction.
    (100.0..500.0f64, 1.0..500.0f64, 1.0..500.0f64, 0.0..2000.0f64)
        .prop_map(|(t0, dt1, dt2, v)| {
            let t1 = t0 + dt1;
            let t2 = t1 + dt2;
            format!(
                "(specific-heat (polynomial piecewise-linear ({t0} . {v}) ({t1} . {v}) ({t2} . {v})))"
            )
        })
}

fn property() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => scalar_property(),
        1 => sutherland_property(),
        1 => piecewise_linear_property(),
    ]
}

fn material() -> impl Strategy<Value = (String, String)> {
    (material_name(), state(), prop::collection::vec(property(), 0..5)).prop_map(
        |(name, state, properties)| {
            let body = properties.join(" ");
            (name.clone(), format!("({name} {state} {body})"))
        },
    )
}

fn database() -> impl Strategy<Value = (Vec<String>, String)> {
    prop::collection::vec(material(), 0..4).prop_map(|materials| {
        let names = materials.iter().map(|(name, _)| name.clone()).collect();
        let source = materials
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        (names, source)
    })
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Property 1: The full pipeline never panics on arbitrary input.
    #[test]
    fn pipeline_never_panics(input in "\\PC{0,400}") {
        let (tokens, _) = lex_with_eof(&input);
        let (file, _) = parse(tokens, &input);
        let _ = resolve(&file, &input);
    }

    /// Property 1b: Nor on paren-heavy input, where recovery does the work.
    #[test]
    fn pipeline_never_panics_on_paren_soup(input in "[()#tf. 0-9a-z-]{0,300}") {
        let (tokens, _) = lex_with_eof(&input);
        let (file, _) = parse(tokens, &input);
        let _ = resolve(&file, &input);
    }

    /// Property 2: Generated well-formed databases parse without
    /// diagnostics, and every declared material comes back by name.
    #[test]
    fn generated_databases_parse_cleanly((names, source) in database()) {
        let (tokens, lex_errors) = lex_with_eof(&source);
        prop_assert!(lex_errors.is_empty(), "lex errors: {lex_errors:?}");
        let (file, diagnostics) = parse(tokens, &source);
        prop_assert!(diagnostics.is_empty(), "diagnostics for {source:?}: {diagnostics:?}");
        let parsed: Vec<_> = file.materials.iter().map(|m| m.name.to_string()).collect();
        prop_assert_eq!(parsed, names);
    }

    /// Property 3: Whatever the pipeline produces satisfies the model
    /// invariants, even for garbage input.
    #[test]
    fn resolved_materials_always_validate(input in "[()#tf. 0-9a-z-]{0,300}") {
        let (tokens, _) = lex_with_eof(&input);
        let (file, _) = parse(tokens, &input);
        let (materials, _) = resolve(&file, &input);
        for material in &materials {
            prop_assert!(
                material.validate().is_ok(),
                "invariant violation for input {:?}: {:?}",
                input,
                material.validate(),
            );
        }
    }

    /// Property 4: Canonical serialization is idempotent.
    #[test]
    fn serialization_round_trips((_, source) in database()) {
        let (tokens, _) = lex_with_eof(&source);
        let (file, _) = parse(tokens, &source);
        let (materials, _) = resolve(&file, &source);

        let first = serde_json::to_string(&materials).unwrap();
        let reparsed: Vec<crate::material::Material> = serde_json::from_str(&first).unwrap();
        prop_assert_eq!(&materials, &reparsed);
        let second = serde_json::to_string(&reparsed).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property 5: Property records keep textual order.
    #[test]
    fn property_order_preserved(values in prop::collection::vec(0.0..1.0e6f64, 1..6)) {
        let properties: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("(prop-{i} (constant . {v}))"))
            .collect();
        let source = format!("(sample fluid {})", properties.join(" "));

        let (tokens, _) = lex_with_eof(&source);
        let (file, diagnostics) = parse(tokens, &source);
        prop_assert!(diagnostics.is_empty());
        let (materials, _) = resolve(&file, &source);

        let keys: Vec<String> = materials[0]
            .properties
            .keys()
            .map(std::string::ToString::to_string)
            .collect();
        let expected: Vec<String> = (0..values.len()).map(|i| format!("prop-{i}")).collect();
        prop_assert_eq!(keys, expected);
    }
}
