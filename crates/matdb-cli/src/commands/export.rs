// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Export a database file as the canonical JSON catalog.

use tracing::{info, instrument};

use super::{parse_input, read_source, CliError};

/// Parses the file and writes the material catalog as JSON to stdout or
/// to `--out`.
#[instrument(skip_all, fields(path = %path))]
pub fn run(path: &str, out: Option<&str>, pretty: bool) -> Result<(), CliError> {
    let source = read_source(path)?;
    let catalog = parse_input(path, &source)?;

    let json = if pretty {
        serde_json::to_string_pretty(&catalog.materials)
    } else {
        serde_json::to_string(&catalog.materials)
    }
    .map_err(|error| CliError::Other(error.to_string()))?;

    match out {
        Some(out_path) => {
            std::fs::write(out_path, json)
                .map_err(|error| CliError::Other(format!("cannot write '{out_path}': {error}")))?;
            info!(out = %out_path, materials = catalog.materials.len(), "catalog written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
