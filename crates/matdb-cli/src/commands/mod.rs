// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Command implementations and the shared exit-code contract.
//!
//! Exit codes: `0` success, `2` input open/read failure, `3` parse
//! failure with no materials recovered, `4` internal invariant violation,
//! `1` anything else.

use camino::Utf8Path;
use matdb_core::catalog::{parse_catalog, Catalog, StoreError};
use thiserror::Error;

use crate::diagnostic;

pub mod check;
pub mod export;
pub mod import;

/// A command failure carrying its exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input file could not be opened or read.
    #[error("cannot read '{path}': {source}")]
    Input {
        /// The offending path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Parsing recovered no materials at all.
    #[error("no materials recovered from '{path}'")]
    NothingParsed {
        /// The offending path.
        path: String,
    },

    /// A resolved material violated a model invariant.
    #[error("internal invariant violation: {0}")]
    Internal(String),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// The process exit code for this failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Input { .. } => 2,
            Self::NothingParsed { .. } => 3,
            Self::Internal(_) => 4,
            Self::Other(_) => 1,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(error: StoreError) -> Self {
        Self::Other(error.to_string())
    }
}

/// Reads the input file into memory.
pub(crate) fn read_source(path: &str) -> Result<String, CliError> {
    std::fs::read_to_string(Utf8Path::new(path)).map_err(|source| CliError::Input {
        path: path.to_string(),
        source,
    })
}

/// Parses a file, rendering diagnostics to stderr.
///
/// A lexical error or a catalog with errors and zero materials maps to
/// the parse-failure exit code.
pub(crate) fn parse_input(path: &str, source: &str) -> Result<Catalog, CliError> {
    let catalog = match parse_catalog(source) {
        Ok(catalog) => catalog,
        Err(lex_error) => {
            diagnostic::render_lex_error(&lex_error, path, source);
            return Err(CliError::NothingParsed {
                path: path.to_string(),
            });
        }
    };
    diagnostic::render_all(&catalog.diagnostics, path, source);
    if catalog.materials.is_empty() && catalog.error_count() > 0 {
        return Err(CliError::NothingParsed {
            path: path.to_string(),
        });
    }
    verify_invariants(&catalog)?;
    Ok(catalog)
}

/// The resolver upholds the model invariants by construction; a
/// violation here is a bug, not bad input.
fn verify_invariants(catalog: &Catalog) -> Result<(), CliError> {
    for material in &catalog.materials {
        material
            .validate()
            .map_err(|error| CliError::Internal(error.to_string()))?;
    }
    Ok(())
}
