//! Material names and densities referenced by the geometry.
//!
//! Only what the mass report needs; optical and scintillation properties
//! belong to the simulation engine.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ConfigError, Result};

/// A named bulk material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    /// Material name as referenced by volumes.
    pub name: String,
    /// Density in g/cm^3.
    pub density: f64,
}

/// Lookup table of known materials.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    materials: BTreeMap<String, Material>,
}

impl MaterialTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Materials used by the detector assembly.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::new();
        for (name, density) in [
            ("G4_AIR", 0.001_205),
            ("Vacuum", 1e-25),
            ("Water", 1.0),
            ("SS316Ti", 8.0),
            ("SS304LSteel", 8.0),
            ("Titanium", 4.54),
            ("LXe", 2.862),
            ("GXe", 0.0177),
            ("Teflon", 2.2),
            ("Copper", 8.96),
            ("Torlon", 1.42),
            ("Cirlex", 1.43),
            ("Quartz", 2.201),
            ("PMTBody", 1.2),
            ("Scintillator", 1.032),
            ("GridMesh", 0.52),
            ("Tungsten", 19.3),
            ("Tyvek", 0.38),
        ] {
            table.insert(name, density);
        }
        table
    }

    /// Adds or replaces a material.
    pub fn insert(&mut self, name: &str, density: f64) {
        self.materials.insert(
            name.to_owned(),
            Material {
                name: name.to_owned(),
                density,
            },
        );
    }

    /// Looks up a material; an unknown name is fatal.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownMaterial`] naming `subsystem`.
    pub fn require(&self, subsystem: &'static str, name: &str) -> Result<&Material> {
        self.materials.get(name).ok_or_else(|| {
            ConfigError::UnknownMaterial {
                subsystem,
                name: name.to_owned(),
            }
            .into()
        })
    }

    /// Looks up a material without failing.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Iterates materials in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_has_detector_materials() {
        let table = MaterialTable::standard();
        for name in ["LXe", "GXe", "Teflon", "Copper", "SS316Ti", "Water"] {
            assert!(table.get(name).is_some(), "{name}");
        }
    }

    #[test]
    fn unknown_material_is_fatal_and_names_subsystem() {
        let table = MaterialTable::standard();
        let err = table.require("cryostat", "Unobtainium").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("cryostat"));
        assert!(msg.contains("Unobtainium"));
    }
}
