// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The property→unit table.
//!
//! Units live here, keyed by property name, rather than inside coefficient
//! payloads. Properties absent from the table (including `specific-heat`,
//! whose unit the source databases are inconsistent about) get no unit.

/// Returns the unit for a property name, when known.
#[must_use]
pub fn unit_for(property: &str) -> Option<&'static str> {
    match property {
        "molecular-weight" => Some("g/mol"),
        "thermal-conductivity" => Some("W/(m·K)"),
        "viscosity" => Some("Pa·s"),
        "formation-enthalpy" => Some("J/mol"),
        "formation-entropy" => Some("J/(mol·K)"),
        "latent-heat" => Some("J/kg"),
        "binary-diffusivity" => Some("m²/s"),
        "characteristic-vibrational-temperature"
        | "vaporization-temperature"
        | "boiling-point" => Some("K"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_units() {
        assert_eq!(unit_for("viscosity"), Some("Pa·s"));
        assert_eq!(unit_for("molecular-weight"), Some("g/mol"));
        assert_eq!(unit_for("boiling-point"), Some("K"));
        assert_eq!(unit_for("binary-diffusivity"), Some("m²/s"));
    }

    #[test]
    fn unknown_properties_have_no_unit() {
        assert_eq!(unit_for("specific-heat"), None);
        assert_eq!(unit_for("density"), None);
        assert_eq!(unit_for("no-such-property"), None);
    }
}
