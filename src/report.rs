//! Volume and mass bookkeeping of a placement tree.
//!
//! The mass of a placement is its solid volume minus the solid volumes of
//! its direct daughters, times the density of its material. Boolean solids
//! are sampled (see [`Volume`]), so the figures carry the sampling error of
//! the chosen resolution.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::material::MaterialTable;
use crate::operations::query::Volume;
use crate::placement::{PlacementTree, VolumeId};

const MM3_PER_CM3: f64 = 1000.0;
const G_PER_KG: f64 = 1000.0;

/// Mass of all placements of one volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeMass {
    pub volume: String,
    pub material: String,
    pub copies: usize,
    /// Net volume of one copy in cm³, daughters removed.
    pub unit_volume_cm3: f64,
    pub unit_mass_kg: f64,
    pub total_mass_kg: f64,
}

/// Mass summed over every volume made of one material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialMass {
    pub material: String,
    pub mass_kg: f64,
    /// Share of the total mass.
    pub fraction: f64,
}

/// Mass table of a placement tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MassReport {
    /// One entry per placed volume, in first-placement order.
    pub volumes: Vec<VolumeMass>,
    /// One entry per material, heaviest first.
    pub materials: Vec<MaterialMass>,
    pub total_mass_kg: f64,
}

impl MassReport {
    /// Computes the table, sampling boolean solids with `resolution` cells
    /// per axis.
    ///
    /// # Errors
    ///
    /// Returns an error if a volume's material is not in `materials` or the
    /// tree references a missing entity.
    pub fn compute(tree: &PlacementTree, materials: &MaterialTable, resolution: usize) -> Result<Self> {
        let mut gross: HashMap<VolumeId, f64> = HashMap::new();
        let mut gross_of = |tree: &PlacementTree, id: VolumeId| -> Result<f64> {
            if let Some(&v) = gross.get(&id) {
                return Ok(v);
            }
            let v = Volume::new(&tree.volume(id)?.solid).with_resolution(resolution).execute();
            gross.insert(id, v);
            Ok(v)
        };

        // net volume summed over the copies of each volume
        let mut order: Vec<VolumeId> = Vec::new();
        let mut net: HashMap<VolumeId, (usize, f64)> = HashMap::new();
        for id in tree.depth_first() {
            let node = tree.placement(id)?;
            let mut v = gross_of(tree, node.volume)?;
            for &child in tree.children(id)? {
                v -= gross_of(tree, tree.placement(child)?.volume)?;
            }
            let entry = net.entry(node.volume).or_insert_with(|| {
                order.push(node.volume);
                (0, 0.0)
            });
            entry.0 += 1;
            entry.1 += v.max(0.0);
        }

        let mut volumes = Vec::with_capacity(order.len());
        let mut by_material: HashMap<String, f64> = HashMap::new();
        for id in order {
            let descriptor = tree.volume(id)?;
            let material = materials.require("mass report", &descriptor.material)?;
            let (copies, total_mm3) = net.get(&id).copied().unwrap_or((0, 0.0));
            let total_mass_kg = total_mm3 / MM3_PER_CM3 * material.density / G_PER_KG;
            #[allow(clippy::cast_precision_loss)]
            let per_copy = |x: f64| if copies == 0 { 0.0 } else { x / copies as f64 };
            *by_material.entry(material.name.clone()).or_default() += total_mass_kg;
            volumes.push(VolumeMass {
                volume: descriptor.name.clone(),
                material: material.name.clone(),
                copies,
                unit_volume_cm3: per_copy(total_mm3 / MM3_PER_CM3),
                unit_mass_kg: per_copy(total_mass_kg),
                total_mass_kg,
            });
        }

        let total_mass_kg: f64 = by_material.values().sum();
        let mut materials: Vec<MaterialMass> = by_material
            .into_iter()
            .map(|(material, mass_kg)| MaterialMass {
                material,
                fraction: if total_mass_kg > 0.0 { mass_kg / total_mass_kg } else { 0.0 },
                mass_kg,
            })
            .collect();
        materials.sort_by(|a, b| {
            b.mass_kg
                .total_cmp(&a.mass_kg)
                .then_with(|| a.material.cmp(&b.material))
        });
        debug!(volumes = volumes.len(), total_mass_kg, "mass report computed");
        Ok(Self {
            volumes,
            materials,
            total_mass_kg,
        })
    }

    /// Entry of the volume named `name`.
    #[must_use]
    pub fn volume(&self, name: &str) -> Option<&VolumeMass> {
        self.volumes.iter().find(|v| v.volume == name)
    }

    /// Writes the per-volume table as CSV with a header line. Names holding
    /// a comma, quote or line break are quoted.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_csv<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "volume,material,copies,unit_volume_cm3,unit_mass_kg,total_mass_kg")?;
        for v in &self.volumes {
            writeln!(
                out,
                "{},{},{},{:.3},{:.6},{:.6}",
                csv_field(&v.volume),
                csv_field(&v.material),
                v.copies,
                v.unit_volume_cm3,
                v.unit_mass_kg,
                v.total_mass_kg
            )?;
        }
        Ok(())
    }
}

/// Quotes a CSV field when it would otherwise break the row.
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
