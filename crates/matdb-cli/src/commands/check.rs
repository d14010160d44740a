// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Check a database file for problems without producing output.

use tracing::{info, instrument};

use super::{parse_input, read_source, CliError};

/// Parses the file, prints diagnostics, and summarizes what was found.
#[instrument(skip_all, fields(path = %path))]
pub fn run(path: &str) -> Result<(), CliError> {
    let source = read_source(path)?;
    let catalog = parse_input(path, &source)?;

    info!(
        materials = catalog.materials.len(),
        warnings = catalog.warning_count(),
        errors = catalog.error_count(),
        "check finished"
    );
    println!(
        "{path}: {} materials, {} warnings, {} errors",
        catalog.materials.len(),
        catalog.warning_count(),
        catalog.error_count()
    );
    Ok(())
}
