//! Construction toggles.
//!
//! Enumerated choices are closed enums. An unknown string is a fatal
//! [`ConfigError::InvalidChoice`] rather than a fallback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

macro_rules! string_choice {
    (
        $(#[$meta:meta])*
        $name:ident, $subsystem:literal, $parameter:literal, $allowed:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Accepted spellings.
            pub const $allowed: &'static [&'static str] = &[$($text),+];

            /// Canonical spelling.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ConfigError::InvalidChoice {
                        subsystem: $subsystem,
                        parameter: $parameter,
                        value: other.to_owned(),
                        allowed: Self::$allowed,
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConfigError;

            fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_owned()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_choice! {
    /// Muon-veto panel arrangement inside the water tank.
    VetoShape, "muon veto", "veto shape", ALLOWED {
        Cylinder => "Cylinder",
        Box => "Box",
        Octagon => "Octagon",
        None => "None",
    }
}

string_choice! {
    /// Layout of the top photosensor array.
    PmtPattern, "top PMT array", "pattern", ALLOWED {
        Hexagonal => "hexagonal",
        Radial => "radial",
    }
}

string_choice! {
    /// Cryostat vessel material.
    CryostatMaterial, "cryostat", "material", ALLOWED {
        Ss316Ti => "SS316Ti",
        Titanium => "Titanium",
    }
}

string_choice! {
    /// Where the calibration source capsule is placed.
    CalibrationSource, "calibration", "source position", ALLOWED {
        None => "None",
        Top => "Top",
        Side => "Side",
    }
}

impl CryostatMaterial {
    /// Name of the material in the material table.
    #[must_use]
    pub fn material_name(self) -> &'static str {
        match self {
            Self::Ss316Ti => "SS316Ti",
            Self::Titanium => "Titanium",
        }
    }
}

/// Toggles fixed before construction starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    /// Material of both cryostat vessels.
    pub cryostat_material: CryostatMaterial,
    /// Veto panel arrangement.
    pub veto: VetoShape,
    /// Top PMT array layout.
    pub top_pmt_pattern: PmtPattern,
    /// Place the electrode meshes as thin discs.
    pub electrode_meshes: bool,
    /// Calibration source placement.
    pub calibration_source: CalibrationSource,
    /// Close the vessels at the bottom.
    pub bottom_head: bool,
    /// 0 = quiet, 1 = sub-assembly summaries, 2 = per-member positions.
    pub verbosity: u8,
    /// Run the overlap check after construction.
    pub check_overlaps: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cryostat_material: CryostatMaterial::Ss316Ti,
            veto: VetoShape::Cylinder,
            top_pmt_pattern: PmtPattern::Hexagonal,
            electrode_meshes: true,
            calibration_source: CalibrationSource::None,
            bottom_head: true,
            verbosity: 0,
            check_overlaps: false,
        }
    }
}

impl DetectorConfig {
    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidChoice`] for an invalid enumerated
    /// choice, as parsing the string directly would, and a JSON error for
    /// malformed JSON or unknown fields.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::check_choices(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Validates the string-valued choices of a JSON document.
    fn check_choices(value: &serde_json::Value) -> std::result::Result<(), ConfigError> {
        type Check = fn(&str) -> std::result::Result<(), ConfigError>;
        let checks: [(&str, Check); 4] = [
            ("cryostat_material", |s: &str| s.parse::<CryostatMaterial>().map(drop)),
            ("veto", |s: &str| s.parse::<VetoShape>().map(drop)),
            ("top_pmt_pattern", |s: &str| s.parse::<PmtPattern>().map(drop)),
            ("calibration_source", |s: &str| s.parse::<CalibrationSource>().map(drop)),
        ];
        for (field, check) in checks {
            if let Some(text) = value.get(field).and_then(serde_json::Value::as_str) {
                check(text)?;
            }
        }
        Ok(())
    }

    /// Serializes the configuration to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::GeoError;

    #[test]
    fn veto_shape_parses_known_values() {
        assert_eq!("Box".parse::<VetoShape>().unwrap(), VetoShape::Box);
        assert_eq!("None".parse::<VetoShape>().unwrap(), VetoShape::None);
    }

    #[test]
    fn unknown_veto_shape_names_allowed_set() {
        let err = "Triangle".parse::<VetoShape>().unwrap_err();
        let msg = err.to_string();
        for allowed in ["Cylinder", "Box", "Octagon", "None"] {
            assert!(msg.contains(allowed), "{msg}");
        }
        assert!(msg.contains("Triangle"));
        assert!(msg.contains("muon veto"));
    }

    #[test]
    fn json_with_invalid_choice_fails() {
        let err = DetectorConfig::from_json_str(r#"{"veto": "Triangle"}"#).unwrap_err();
        assert!(err.to_string().contains("Octagon"));
        assert!(matches!(
            err,
            GeoError::Config(ConfigError::InvalidChoice { parameter: "veto shape", .. })
        ));

        let err = DetectorConfig::from_json_str(r#"{"cryostat_material": "Aluminium"}"#).unwrap_err();
        assert!(matches!(
            err,
            GeoError::Config(ConfigError::InvalidChoice { subsystem: "cryostat", .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = DetectorConfig::from_json_str(r#"{"veto": "#).unwrap_err();
        assert!(matches!(err, GeoError::Json(_)));
    }

    #[test]
    fn json_defaults_missing_fields() {
        let cfg = DetectorConfig::from_json_str(r#"{"top_pmt_pattern": "radial"}"#).unwrap();
        assert_eq!(cfg.top_pmt_pattern, PmtPattern::Radial);
        assert_eq!(cfg.veto, VetoShape::Cylinder);
    }

    #[test]
    fn json_round_trip() {
        let cfg = DetectorConfig {
            veto: VetoShape::Octagon,
            calibration_source: CalibrationSource::Side,
            ..DetectorConfig::default()
        };
        let back = DetectorConfig::from_json_str(&cfg.to_json_string().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn unknown_material_rejected() {
        assert!("Aluminium".parse::<CryostatMaterial>().is_err());
    }
}
