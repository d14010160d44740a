// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Import a database file into a JSON material store.
//!
//! The pipeline mirrors the check/export commands, then runs the
//! display-name pass over the finished catalog before writing each
//! material through the store interface.

use matdb_core::catalog::{apply_display_names, store_catalog, JsonFileStore, DISPLAY_NAMES};
use tracing::{info, instrument};

use super::{parse_input, read_source, CliError};

/// Parses the file and stores its materials under `--db`.
#[instrument(skip_all, fields(path = %path, db = %db_path))]
pub fn run(path: &str, db_path: &str) -> Result<(), CliError> {
    let source = read_source(path)?;
    let mut catalog = parse_input(path, &source)?;

    apply_display_names(&mut catalog.materials, &DISPLAY_NAMES);

    let mut store = JsonFileStore::load(db_path)?;
    let written = store_catalog(&catalog.materials, &mut store)?;
    store.save()?;

    info!(written, db = %db_path, "import finished");
    println!("{path}: stored {written} materials in {db_path}");
    Ok(())
}
