// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for pipeline crash safety testing.
//!
//! This target feeds arbitrary byte sequences through the full
//! lex → parse → resolve pipeline and asserts that it never panics. Bad
//! input must surface as diagnostics or opaque records, never a crash.
//!
//! Invalid UTF-8 bytes are converted via lossy conversion (U+FFFD
//! replacement) so the lexer still gets exercised with unusual character
//! sequences.
//!
//! # Success Criteria
//!
//! - No panic on any input
//! - Every resolved material satisfies the model invariants

#![no_main]

use libfuzzer_sys::fuzz_target;
use matdb_core::semantic_analysis::resolve;
use matdb_core::source_analysis::{lex_with_eof, parse};

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);

    let (tokens, _lex_errors) = lex_with_eof(&source);
    let (file, _diagnostics) = parse(tokens, &source);
    let (materials, _more) = resolve(&file, &source);

    for material in &materials {
        assert!(material.validate().is_ok());
    }
});
