// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Catalog assembly and the collaborator interfaces around it.
//!
//! [`parse_catalog`] is the one-call pipeline: lex, parse, resolve. The
//! result is the material list plus every diagnostic either layer
//! produced; only lexical errors are fatal.
//!
//! The persistence and localization collaborators stay behind narrow
//! interfaces. [`MaterialStore`] is a name-keyed blob table with
//! uniqueness enforcement; blobs are the canonical JSON form of
//! [`Material`]. [`DisplayNameLookup`] is a pure name→label function
//! applied by [`apply_display_names`] as a separate pass over the
//! finished catalog — never from inside the parser.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ecow::EcoString;
use thiserror::Error;
use tracing::debug;

use crate::material::Material;
use crate::semantic_analysis::resolve;
use crate::source_analysis::{lex_with_eof, parse, Diagnostic, LexError, Severity};

/// A parsed catalog: the materials and the diagnostics they came with.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    /// The materials in textual order.
    pub materials: Vec<Material>,
    /// Parser and resolver diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl Catalog {
    /// Returns a material by name.
    #[must_use]
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Number of diagnostics at error severity.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Number of diagnostics at warning severity.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

/// Parses a whole database file into a catalog.
///
/// Lexical errors are fatal and returned as `Err`; syntactic errors
/// reject individual materials, and semantic violations demote records to
/// opaque payloads — both surface as diagnostics on the returned catalog.
pub fn parse_catalog(source: &str) -> Result<Catalog, LexError> {
    let (tokens, lex_errors) = lex_with_eof(source);
    if let Some(error) = lex_errors.into_iter().next() {
        return Err(error);
    }

    let (file, mut diagnostics) = parse(tokens, source);
    let (materials, resolve_diagnostics) = resolve(&file, source);
    diagnostics.extend(resolve_diagnostics);

    debug!(
        materials = materials.len(),
        diagnostics = diagnostics.len(),
        "parsed catalog"
    );
    Ok(Catalog {
        materials,
        diagnostics,
    })
}

/// A persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store already holds a material with this name.
    #[error("material '{0}' already exists in the store")]
    DuplicateName(String),

    /// The backing file could not be read or written.
    #[error("failed to read or write the store")]
    Io(#[from] std::io::Error),

    /// A blob was not valid material JSON.
    #[error("stored blob is not valid material JSON")]
    Format(#[from] serde_json::Error),
}

/// A name-keyed blob table holding serialized materials.
///
/// Implementations enforce uniqueness of `name` on [`put`](Self::put).
pub trait MaterialStore {
    /// Stores a serialized material under its name.
    fn put(&mut self, name: &str, blob: &str) -> Result<(), StoreError>;

    /// Returns the blob stored under `name`, if any.
    fn get(&self, name: &str) -> Option<&str>;

    /// Returns the stored names in sorted order.
    fn names(&self) -> Vec<String>;
}

/// An in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MaterialStore for MemoryStore {
    fn put(&mut self, name: &str, blob: &str) -> Result<(), StoreError> {
        if self.entries.contains_key(name) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        self.entries.insert(name.to_string(), blob.to_string());
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// A store backed by a single JSON object file mapping name to blob.
///
/// The file is read on [`load`](Self::load) and written back on
/// [`save`](Self::save); puts stay in memory in between.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens a store, reading the file if it exists.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            serde_json::from_str(&text)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    /// Writes the store back to its file.
    pub fn save(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MaterialStore for JsonFileStore {
    fn put(&mut self, name: &str, blob: &str) -> Result<(), StoreError> {
        if self.entries.contains_key(name) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        self.entries.insert(name.to_string(), blob.to_string());
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Serializes every material in the catalog into the store.
///
/// Returns the number of materials written. The first duplicate name or
/// I/O failure aborts the write.
pub fn store_catalog(
    materials: &[Material],
    store: &mut impl MaterialStore,
) -> Result<usize, StoreError> {
    for material in materials {
        let blob = serde_json::to_string(material)?;
        store.put(&material.name, &blob)?;
    }
    Ok(materials.len())
}

/// Reads one material back out of a store.
pub fn load_material(
    store: &impl MaterialStore,
    name: &str,
) -> Result<Option<Material>, StoreError> {
    match store.get(name) {
        Some(blob) => Ok(Some(serde_json::from_str(blob)?)),
        None => Ok(None),
    }
}

/// A pure function mapping a material name to a display label.
pub trait DisplayNameLookup {
    /// Returns the display label for a material name, if known.
    fn lookup(&self, name: &str) -> Option<&str>;
}

/// A lookup over a static name→label table.
#[derive(Debug, Clone, Copy)]
pub struct StaticDisplayNames(pub &'static [(&'static str, &'static str)]);

impl DisplayNameLookup for StaticDisplayNames {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, label)| *label)
    }
}

/// Built-in display labels for the materials common CFD databases ship.
pub const DISPLAY_NAMES: StaticDisplayNames = StaticDisplayNames(&[
    ("air", "Air"),
    ("water-liquid", "Water (Liquid)"),
    ("water-vapor", "Water (Vapor)"),
    ("ch4", "Methane"),
    ("c2h6", "Ethane"),
    ("c3h8", "Propane"),
    ("co", "Carbon Monoxide"),
    ("co2", "Carbon Dioxide"),
    ("h2", "Hydrogen"),
    ("h2o", "Water Vapor"),
    ("n2", "Nitrogen"),
    ("o2", "Oxygen"),
    ("ar", "Argon"),
    ("he", "Helium"),
    ("nh3", "Ammonia"),
    ("no", "Nitric Oxide"),
    ("so2", "Sulfur Dioxide"),
    ("aluminum", "Aluminum"),
    ("copper", "Copper"),
    ("steel", "Steel"),
    ("glass", "Glass"),
    ("coal-hv", "Coal (High Volatile)"),
    ("wood", "Wood"),
    ("kerosene-liquid", "Kerosene (Liquid)"),
    ("diesel-liquid", "Diesel (Liquid)"),
    ("methane-air", "Methane-Air Mixture"),
]);

/// Fills unset `display_name` slots from a lookup.
///
/// A separate pass over the finished catalog; lookup misses are non-fatal
/// and leave the slot unset.
pub fn apply_display_names(materials: &mut [Material], lookup: &impl DisplayNameLookup) {
    for material in materials {
        if material.display_name.is_none() {
            if let Some(label) = lookup.lookup(&material.name) {
                material.display_name = Some(EcoString::from(label));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialState;

    const AIR: &str = "(air fluid \
        (chemical-formula . #f) \
        (density (constant . 1.225)) \
        (viscosity (sutherland 1.716e-5 273.15 110.4)) \
        (specific-heat (polynomial piecewise-linear (300 . 1005) (1000 . 1142) (2500 . 1290))))";

    #[test]
    fn parse_catalog_end_to_end() {
        let catalog = parse_catalog(AIR).unwrap();
        assert_eq!(catalog.error_count(), 0);
        let air = catalog.material("air").unwrap();
        assert_eq!(air.state, MaterialState::Fluid);
        assert_eq!(air.chemical_formula, None);
        assert_eq!(air.properties.len(), 3);
    }

    #[test]
    fn parse_catalog_reports_lexical_errors_as_fatal() {
        let err = parse_catalog("(air fluid (density (constant . 1.2.3)))").unwrap_err();
        assert_eq!(err.to_string(), "malformed number '1.2.3'");
    }

    #[test]
    fn serialization_is_idempotent() {
        let catalog = parse_catalog(AIR).unwrap();
        let first = serde_json::to_string(&catalog.materials).unwrap();
        let reparsed: Vec<Material> = serde_json::from_str(&first).unwrap();
        let second = serde_json::to_string(&reparsed).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn memory_store_round_trip() {
        let catalog = parse_catalog(AIR).unwrap();
        let mut store = MemoryStore::new();
        let written = store_catalog(&catalog.materials, &mut store).unwrap();
        assert_eq!(written, 1);
        assert_eq!(store.names(), vec!["air".to_string()]);

        let material = load_material(&store, "air").unwrap().unwrap();
        assert_eq!(material, catalog.materials[0]);
        assert!(load_material(&store, "vacuum").unwrap().is_none());
    }

    #[test]
    fn memory_store_enforces_unique_names() {
        let mut store = MemoryStore::new();
        store.put("air", "{}").unwrap();
        let err = store.put("air", "{}").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(name) if name == "air"));
    }

    #[test]
    fn json_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("materials.json");

        let catalog = parse_catalog(AIR).unwrap();
        let mut store = JsonFileStore::load(&path).unwrap();
        store_catalog(&catalog.materials, &mut store).unwrap();
        store.save().unwrap();

        let reopened = JsonFileStore::load(&path).unwrap();
        assert_eq!(reopened.names(), vec!["air".to_string()]);
        let material = load_material(&reopened, "air").unwrap().unwrap();
        assert_eq!(material.name, "air");
    }

    #[test]
    fn display_name_pass_fills_known_names_only() {
        let mut catalog =
            parse_catalog("(air fluid) (unobtainium solid (density (constant . 1)))").unwrap();
        apply_display_names(&mut catalog.materials, &DISPLAY_NAMES);
        assert_eq!(
            catalog.material("air").unwrap().display_name.as_deref(),
            Some("Air")
        );
        assert_eq!(catalog.material("unobtainium").unwrap().display_name, None);
    }

    #[test]
    fn display_name_pass_keeps_existing_labels() {
        let mut catalog = parse_catalog("(air fluid)").unwrap();
        catalog.materials[0].display_name = Some("Atmosphere".into());
        apply_display_names(&mut catalog.materials, &DISPLAY_NAMES);
        assert_eq!(
            catalog.materials[0].display_name.as_deref(),
            Some("Atmosphere")
        );
    }

    #[test]
    fn catalog_order_matches_source_order() {
        let catalog = parse_catalog(
            "(zeta fluid) (alpha solid (density (constant . 1))) (mid mixture (species (names zeta alpha)))",
        )
        .unwrap();
        let names: Vec<_> = catalog.materials.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }
}
