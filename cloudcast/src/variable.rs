//! Forecast variable (satellite channel) identifiers.
//!
//! The cloudcasting dataset exposes a fixed set of ten channels: six infrared,
//! two visible-light, and two water-vapor bands. The set is part of the API
//! contract and does not change at runtime, so it is modeled as a fieldless
//! enum rather than free-form strings.

use std::fmt;
use std::str::FromStr;

/// A forecast channel served by the cloudcasting layer API.
///
/// The `as_str` form is the identifier used in layer URLs and host layer ids
/// (e.g. `IR_016`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableId {
    /// IR 0.16 μm - infrared channel for cloud detection
    Ir016,
    /// IR 0.39 μm - infrared channel for cloud properties
    Ir039,
    /// IR 0.87 μm - near-infrared for cloud phase
    Ir087,
    /// IR 10.8 μm - thermal infrared for cloud temperature
    Ir108,
    /// IR 12.0 μm - thermal infrared for atmospheric water vapor
    Ir120,
    /// IR 13.4 μm - thermal infrared for CO2 absorption
    Ir134,
    /// VIS 0.06 μm - visible light for cloud reflectance
    Vis006,
    /// VIS 0.08 μm - visible light for surface features
    Vis008,
    /// WV 6.2 μm - water vapor channel, upper troposphere
    Wv062,
    /// WV 7.3 μm - water vapor channel, mid troposphere
    Wv073,
}

impl VariableId {
    /// All known variables, in the order the API lists them.
    pub const ALL: [VariableId; 10] = [
        VariableId::Ir016,
        VariableId::Ir039,
        VariableId::Ir087,
        VariableId::Ir108,
        VariableId::Ir120,
        VariableId::Ir134,
        VariableId::Vis006,
        VariableId::Vis008,
        VariableId::Wv062,
        VariableId::Wv073,
    ];

    /// The wire identifier used in layer URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableId::Ir016 => "IR_016",
            VariableId::Ir039 => "IR_039",
            VariableId::Ir087 => "IR_087",
            VariableId::Ir108 => "IR_108",
            VariableId::Ir120 => "IR_120",
            VariableId::Ir134 => "IR_134",
            VariableId::Vis006 => "VIS006",
            VariableId::Vis008 => "VIS008",
            VariableId::Wv062 => "WV_062",
            VariableId::Wv073 => "WV_073",
        }
    }

    /// Human-readable label for selection UIs.
    pub fn label(&self) -> &'static str {
        match self {
            VariableId::Ir016 => "IR 0.16 μm",
            VariableId::Ir039 => "IR 0.39 μm",
            VariableId::Ir087 => "IR 0.87 μm",
            VariableId::Ir108 => "IR 10.8 μm",
            VariableId::Ir120 => "IR 12.0 μm",
            VariableId::Ir134 => "IR 13.4 μm",
            VariableId::Vis006 => "VIS 0.06 μm",
            VariableId::Vis008 => "VIS 0.08 μm",
            VariableId::Wv062 => "WV 6.2 μm",
            VariableId::Wv073 => "WV 7.3 μm",
        }
    }

    /// Longer description of what the channel observes.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            VariableId::Ir016 => Some("Infrared channel for cloud detection"),
            VariableId::Ir039 => Some("Infrared channel for cloud properties"),
            VariableId::Ir087 => Some("Near-infrared for cloud phase"),
            VariableId::Ir108 => Some("Thermal infrared for cloud temperature"),
            VariableId::Ir120 => Some("Thermal infrared for atmospheric water vapor"),
            VariableId::Ir134 => Some("Thermal infrared for CO2 absorption"),
            VariableId::Vis006 => Some("Visible light for cloud reflectance"),
            VariableId::Vis008 => Some("Visible light for surface features"),
            VariableId::Wv062 => Some("Water vapor channel - upper troposphere"),
            VariableId::Wv073 => Some("Water vapor channel - mid troposphere"),
        }
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown variable identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariable(pub String);

impl fmt::Display for UnknownVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown forecast variable '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariable {}

impl FromStr for VariableId {
    type Err = UnknownVariable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariableId::ALL
            .iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| UnknownVariable(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_has_ten_variables() {
        assert_eq!(VariableId::ALL.len(), 10);
    }

    #[test]
    fn test_wire_identifiers_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for v in VariableId::ALL {
            assert!(seen.insert(v.as_str()), "duplicate identifier {}", v);
        }
    }

    #[test]
    fn test_parse_round_trip() {
        for v in VariableId::ALL {
            assert_eq!(v.as_str().parse::<VariableId>(), Ok(v));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("ir_016".parse::<VariableId>(), Ok(VariableId::Ir016));
        assert_eq!("vis006".parse::<VariableId>(), Ok(VariableId::Vis006));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("IR_999".parse::<VariableId>().is_err());
    }

    #[test]
    fn test_every_variable_has_label_and_description() {
        for v in VariableId::ALL {
            assert!(!v.label().is_empty());
            assert!(v.description().is_some());
        }
    }
}
