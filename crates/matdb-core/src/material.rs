// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The typed material model.
//!
//! This is the output of semantic resolution: a [`Material`] with a state,
//! optional particle flags, species composition, and an ordered map of
//! property records whose coefficient payloads are tagged variants.
//!
//! # Canonical serialization
//!
//! The model serializes to a self-describing JSON object whose keys mirror
//! the field names. Coefficients carry a `kind` discriminator:
//!
//! ```json
//! { "kind": "sutherland", "data": [1.716e-5, 273.15, 110.4] }
//! ```
//!
//! Deserializing the canonical form reproduces the model exactly,
//! including property order, which follows first occurrence in the source
//! file.
//!
//! # Lifecycle
//!
//! Materials are built by the resolver, which appends property records in
//! textual order; afterwards they are read-only. Nothing here evaluates
//! polynomials or converts units.

use ecow::EcoString;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The aggregate state of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialState {
    /// A fluid (gas or liquid) species.
    Fluid,
    /// A solid, possibly refined by particle flags.
    Solid,
    /// A mixture of named species.
    Mixture,
    /// No state declared anywhere in the material form.
    #[default]
    Invalid,
}

/// A particle class refining a solid material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleFlag {
    /// An inert particle.
    Inert,
    /// An evaporating droplet.
    Droplet,
    /// A combusting particle.
    Combusting,
}

/// One reaction in a `reactions` table: a name plus its named sub-fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// The reaction name, e.g. `r1`.
    pub name: EcoString,
    /// The reaction's named sub-fields in textual order.
    pub fields: Vec<ReactionField>,
}

/// A named sub-field of a reaction (`stoichiometry`, `arrhenius`, …).
///
/// The field's numbers and symbols are collected in document order from
/// arbitrarily nested structure; tighter schematization is deliberately
/// not attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionField {
    /// The field name.
    pub name: EcoString,
    /// Numbers found anywhere under the field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
    /// Symbols found anywhere under the field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<EcoString>,
}

/// The coefficient payload of a property record.
///
/// The `kind` discriminator follows the source keywords; `nasa-9` names
/// the NASA-9 thermodynamic fit form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum Coefficient {
    /// A single scalar.
    Constant(f64),
    /// Coefficients in ascending order: `a0 + a1·T + a2·T² + …`.
    Polynomial(Vec<f64>),
    /// Temperature-value breakpoints, strictly increasing in T.
    PiecewiseLinear(Vec<(f64, f64)>),
    /// One coefficient vector per temperature range.
    PiecewisePolynomial {
        /// `(Tlow, Thigh)` per range, ascending and non-overlapping.
        ranges: Vec<(f64, f64)>,
        /// One ascending-order coefficient vector per range.
        coeffs: Vec<Vec<f64>>,
    },
    /// The NASA-9 thermodynamic fit form.
    #[serde(rename = "nasa-9")]
    Nasa9Piecewise {
        /// `(Tlow, Thigh)` per range, ascending and non-overlapping.
        ranges: Vec<(f64, f64)>,
        /// Nine coefficients per range.
        coeffs: Vec<[f64; 9]>,
    },
    /// The compressible-liquid transport model.
    CompressibleLiquid(Vec<f64>),
    /// The three-coefficient Sutherland viscosity model.
    Sutherland([f64; 3]),
    /// The power-law transport model.
    PowerLaw(Vec<f64>),
    /// The three-coefficient Blottner curve fit.
    Blottner([f64; 3]),
    /// A composite binary diffusivity: an averaging coefficient plus an
    /// inner film diffusivity record (never itself film-averaged).
    FilmAveraged {
        /// The averaging coefficient.
        averaging_coefficient: f64,
        /// The inner film diffusivity record.
        film_diffusivity: Box<PropertyRecord>,
    },
    /// A symbolic reference, e.g. to another species.
    StringRef(EcoString),
    /// A boolean literal.
    Boolean(bool),
    /// A structured-but-loose reactions table.
    Reactions {
        /// The mechanism symbol, e.g. `finite-rate`.
        mechanism: EcoString,
        /// The reactions in textual order.
        reactions: Vec<Reaction>,
    },
    /// A verbatim source slice for a payload the grammar or resolver could
    /// not type. Kept so nothing is dropped on a round trip.
    Opaque(EcoString),
    /// An explicitly absent value (`#f` in a value slot).
    None,
}

impl Coefficient {
    /// Returns `true` if this is the opaque fallback variant.
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }

    /// Returns `true` if this is a film-averaged composite.
    #[must_use]
    pub const fn is_film_averaged(&self) -> bool {
        matches!(self, Self::FilmAveraged { .. })
    }
}

/// One resolved property record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// The property key, e.g. `density`.
    pub name: EcoString,
    /// The unit from the property→unit table, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<EcoString>,
    /// The coefficient payload.
    pub coefficient: Coefficient,
}

impl PropertyRecord {
    /// Creates a record with the unit left unset.
    #[must_use]
    pub fn new(name: impl Into<EcoString>, coefficient: Coefficient) -> Self {
        Self {
            name: name.into(),
            unit: None,
            coefficient,
        }
    }

    /// Creates a record with a unit.
    #[must_use]
    pub fn with_unit(
        name: impl Into<EcoString>,
        unit: Option<&'static str>,
        coefficient: Coefficient,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.map(EcoString::from),
            coefficient,
        }
    }
}

/// An ordered map from property name to its records.
///
/// Enumeration order is first occurrence in the source file, and a
/// present key always maps to at least one record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyMap {
    entries: Vec<(EcoString, Vec<PropertyRecord>)>,
}

impl PropertyMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records for a property, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[PropertyRecord]> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, records)| records.as_slice())
    }

    /// Returns `true` if the property has at least one record.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Appends a record under its own name, keeping first-seen key order.
    pub fn push(&mut self, record: PropertyRecord) {
        if let Some((_, records)) = self.entries.iter_mut().find(|(key, _)| *key == record.name) {
            records.push(record);
        } else {
            self.entries.push((record.name.clone(), vec![record]));
        }
    }

    /// Iterates entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&EcoString, &[PropertyRecord])> {
        self.entries
            .iter()
            .map(|(key, records)| (key, records.as_slice()))
    }

    /// Iterates property names in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &EcoString> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Number of distinct properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no properties are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PropertyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, records) in &self.entries {
            map.serialize_entry(key, records)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropertyMapVisitor;

        impl<'de> Visitor<'de> for PropertyMapVisitor {
            type Value = PropertyMap;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map from property name to record arrays")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, records)) =
                    access.next_entry::<EcoString, Vec<PropertyRecord>>()?
                {
                    entries.push((key, records));
                }
                Ok(PropertyMap { entries })
            }
        }

        deserializer.deserialize_map(PropertyMapVisitor)
    }
}

/// A model invariant violation, reported by [`Material::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The material name is empty.
    #[error("material has an empty name")]
    EmptyName,
    /// A property key maps to zero records.
    #[error("property '{0}' has no records")]
    EmptyPropertySequence(String),
    /// Piecewise temperature ranges are not strictly ascending.
    #[error("property '{0}' has non-ascending temperature ranges")]
    NonAscendingRanges(String),
    /// A film-averaged record nests another film-averaged record.
    #[error("property '{0}' nests film-averaged inside film-averaged")]
    NestedFilmAveraged(String),
}

/// A material with its resolved properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// The unique material name.
    pub name: EcoString,
    /// An optional display label, filled by the display-name pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<EcoString>,
    /// The aggregate state.
    pub state: MaterialState,
    /// Particle classes refining a solid.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub particle_flags: Vec<ParticleFlag>,
    /// The chemical formula, when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemical_formula: Option<EcoString>,
    /// Species composing a mixture, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub species_names: Vec<EcoString>,
    /// The resolved properties, in first-seen order.
    pub properties: PropertyMap,
}

impl Material {
    /// Creates an empty material with the given name.
    #[must_use]
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            state: MaterialState::Invalid,
            particle_flags: Vec::new(),
            chemical_formula: None,
            species_names: Vec::new(),
            properties: PropertyMap::new(),
        }
    }

    /// Appends a particle flag, ignoring duplicates.
    pub fn add_particle_flag(&mut self, flag: ParticleFlag) {
        if !self.particle_flags.contains(&flag) {
            self.particle_flags.push(flag);
        }
    }

    /// Returns the records for a property, if present.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&[PropertyRecord]> {
        self.properties.get(name)
    }

    /// Returns `true` if the material has the named property.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains(name)
    }

    /// Checks the model invariants.
    ///
    /// The resolver upholds these by construction; this is the safety net
    /// the driver uses to distinguish bad input from internal bugs.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.is_empty() {
            return Err(ModelError::EmptyName);
        }
        for (key, records) in self.properties.iter() {
            if records.is_empty() {
                return Err(ModelError::EmptyPropertySequence(key.to_string()));
            }
            for record in records {
                match &record.coefficient {
                    Coefficient::PiecewiseLinear(points) => {
                        if !points.windows(2).all(|w| w[0].0 < w[1].0) {
                            return Err(ModelError::NonAscendingRanges(key.to_string()));
                        }
                    }
                    Coefficient::PiecewisePolynomial { ranges, .. }
                    | Coefficient::Nasa9Piecewise { ranges, .. } => {
                        if !ranges.windows(2).all(|w| w[0].0 < w[1].0) {
                            return Err(ModelError::NonAscendingRanges(key.to_string()));
                        }
                    }
                    Coefficient::FilmAveraged {
                        film_diffusivity, ..
                    } => {
                        if film_diffusivity.coefficient.is_film_averaged() {
                            return Err(ModelError::NestedFilmAveraged(key.to_string()));
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}
