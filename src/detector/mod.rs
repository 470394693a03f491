//! Assembly of the complete detector.
//!
//! [`DetectorBuilder`] defines the parameter table, freezes it and hands it
//! to one builder per sub-assembly, outermost first:
//!
//! 1. world, water tank, muon-veto panels, support lattice, calibration source
//! 2. outer cryostat, vacuum gap, inner cryostat, liquid and gaseous xenon
//! 3. TPC top: bell, copper ring, electrode rings and frame, top PMT array
//! 4. field cage: TPC wall, field shaper rings, guards, pillars, cathode
//! 5. TPC bottom: bottom-mesh ring, bottom PMT array and its plates
//! 6. electrode meshes (optional)
//!
//! All TPC components share the liquid-xenon frame; their axial offsets come
//! from [`TpcStack`].

mod bottom;
mod cryostat;
mod field_cage;
mod grids;
mod layout;
mod pmt;
mod shield;
mod top;

pub use layout::TpcStack;

use std::io::Write;

use tracing::info;

use crate::config::DetectorConfig;
use crate::error::{PlacementError, Result};
use crate::material::MaterialTable;
use crate::math::Transform;
use crate::params::{define_detector_parameters, ParameterStore, Parameters};
use crate::placement::{
    write_hierarchy, CheckOverlaps, OpticalSurface, OverlapKind, OverlapReport, PlacementId,
    PlacementTree, VolumeDescriptor, VolumeId,
};
use crate::report::MassReport;

/// Sensitive-detector tag of the xenon volumes.
pub const LXE_SD: &str = "detgeo/LXeSD";

/// Sensitive-detector tag of the PMT windows.
pub const PMT_SD: &str = "detgeo/PmtSD";

/// Builds a [`Detector`] from a configuration.
pub struct DetectorBuilder {
    config: DetectorConfig,
    materials: MaterialTable,
    overrides: Vec<(String, f64)>,
}

impl DetectorBuilder {
    /// Creates a builder using the standard material table.
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            materials: MaterialTable::standard(),
            overrides: Vec::new(),
        }
    }

    /// Replaces the material table.
    #[must_use]
    pub fn with_materials(mut self, materials: MaterialTable) -> Self {
        self.materials = materials;
        self
    }

    /// Overrides one parameter after the standard table is defined.
    ///
    /// Values derived from the overridden name are not recomputed.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.overrides.push((name.into(), value));
        self
    }

    /// Defines and freezes the parameter table.
    ///
    /// # Errors
    ///
    /// Returns an error if a definition or override is invalid.
    pub fn parameters(&self) -> Result<Parameters> {
        let mut store = ParameterStore::new();
        define_detector_parameters(&mut store, &self.config)?;
        for (name, value) in &self.overrides {
            store.define(name, *value)?;
        }
        Ok(store.freeze())
    }

    /// Builds the detector.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is missing, a solid is degenerate, a
    /// material is unknown, or the finished tree is malformed.
    pub fn build(self) -> Result<Detector> {
        let params = self.parameters()?;
        let stack = TpcStack::from_params(&params)?;
        let world = shield::world_volume(&params, &self.materials)?;

        let mut asm = Assembly {
            params: &params,
            materials: &self.materials,
            config: &self.config,
            stack: &stack,
            tree: PlacementTree::new(world),
        };
        let world = asm
            .tree
            .root()
            .ok_or_else(|| PlacementError::EntityNotFound("world placement".into()))?;

        let water = shield::build(&mut asm, world)?;
        let xenon = cryostat::build(&mut asm, water)?;
        let pmts = pmt::PmtVolumes::register(&mut asm)?;
        top::build(&mut asm, &xenon, &pmts)?;
        field_cage::build(&mut asm, xenon.lxe)?;
        bottom::build(&mut asm, xenon.lxe, &pmts)?;
        if self.config.electrode_meshes {
            grids::build(&mut asm, &xenon)?;
        }

        let tree = asm.tree;
        tree.validate()?;
        info!(
            placements = tree.len(),
            volumes = tree.volumes().count(),
            boundaries = tree.boundaries().len(),
            "detector constructed"
        );

        let overlaps = if self.config.check_overlaps {
            Some(
                CheckOverlaps::new(&tree)
                    .with_verbose(self.config.verbosity >= 1)
                    .execute()?,
            )
        } else {
            None
        };

        Ok(Detector {
            config: self.config,
            params,
            materials: self.materials,
            stack,
            tree,
            overlaps,
        })
    }
}

/// A constructed detector.
#[derive(Debug)]
pub struct Detector {
    pub config: DetectorConfig,
    pub params: Parameters,
    pub materials: MaterialTable,
    pub stack: TpcStack,
    pub tree: PlacementTree,
    /// Present when the configuration asked for an overlap check.
    pub overlaps: Option<OverlapReport>,
}

impl Detector {
    /// Looks up a placement by name.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::EntityNotFound`] if no placement has that name.
    pub fn placement(&self, name: &str) -> Result<PlacementId> {
        self.tree
            .find(name)
            .ok_or_else(|| PlacementError::EntityNotFound(name.to_owned()).into())
    }

    /// Writes the diagnostic side output the configuration's `verbosity`
    /// asks for: nothing at 0, the placement hierarchy from 1, followed by
    /// one line per detected overlap when the overlap check ran.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_diagnostics<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.config.verbosity == 0 {
            return Ok(());
        }
        write_hierarchy(&self.tree, out)?;
        if let Some(report) = &self.overlaps {
            writeln!(out, "# overlaps: {} in {} placements", report.overlaps.len(), report.checked)?;
            for o in &report.overlaps {
                let with = match o.kind {
                    OverlapKind::Protrusion => "mother".to_owned(),
                    OverlapKind::Sibling(other) => self.tree.placement(other)?.name.clone(),
                };
                writeln!(out, "{} {} {:.4}", o.name, with, o.depth)?;
            }
        }
        Ok(())
    }

    /// Computes the mass table of the detector.
    ///
    /// # Errors
    ///
    /// Returns an error if a volume references an unknown material.
    pub fn mass_report(&self, resolution: usize) -> Result<MassReport> {
        MassReport::compute(&self.tree, &self.materials, resolution)
    }
}

/// Shared state of the sub-assembly builders.
struct Assembly<'a> {
    params: &'a Parameters,
    materials: &'a MaterialTable,
    config: &'a DetectorConfig,
    stack: &'a TpcStack,
    tree: PlacementTree,
}

impl Assembly<'_> {
    fn get(&self, name: &str) -> Result<f64> {
        self.params.get(name)
    }

    fn count(&self, name: &str) -> Result<usize> {
        self.params.count(name)
    }

    /// Registers a volume after checking its material.
    fn volume(&mut self, subsystem: &'static str, volume: VolumeDescriptor) -> Result<VolumeId> {
        self.materials.require(subsystem, &volume.material)?;
        Ok(self.tree.add_volume(volume))
    }

    fn place(
        &mut self,
        volume: VolumeId,
        parent: PlacementId,
        name: impl Into<String>,
        transform: Transform,
    ) -> Result<PlacementId> {
        self.tree.place(volume, parent, name, transform, 0)
    }

    /// Places on the axis at height `z`.
    fn place_at(
        &mut self,
        volume: VolumeId,
        parent: PlacementId,
        name: impl Into<String>,
        z: f64,
    ) -> Result<PlacementId> {
        self.place(volume, parent, name, Transform::translation(0.0, 0.0, z))
    }

    /// Declares the optical interface from `mother` into `placement`.
    fn border(&mut self, mother: PlacementId, placement: PlacementId, surface: OpticalSurface) -> Result<()> {
        let name = format!("{}_BorderSurface", self.tree.placement(placement)?.name);
        self.tree.add_border_surface(name, mother, placement, surface)
    }
}

/// Placements of the nested cryostat volumes.
#[derive(Debug, Clone, Copy)]
struct XenonVolumes {
    lxe: PlacementId,
    gxe: PlacementId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{CalibrationSource, PmtPattern, VetoShape};
    use crate::math::Point3;
    use crate::operations::boolean::{classify_point_in_solid, PointClassification};

    fn build(config: DetectorConfig) -> Detector {
        DetectorBuilder::new(config).build().unwrap()
    }

    #[test]
    fn default_detector_is_well_formed() {
        let det = build(DetectorConfig::default());
        det.tree.validate().unwrap();
        assert!(det.overlaps.is_none());
        for name in [
            "WaterTank",
            "Water",
            "SS_OuterCryostat",
            "Vacuum_Gap",
            "SS_InnerCryostat",
            "LXe",
            "GXe",
            "SS_BellPlate",
            "Teflon_TPC",
            "SS_CathodeRing",
            "GridMeshAluminium_GroundMesh",
        ] {
            det.placement(name).unwrap();
        }
    }

    #[test]
    fn pmt_counts_and_copy_numbers() {
        let det = build(DetectorConfig::default());
        let top = det.placement("PmtTpcTop_0").unwrap();
        assert_eq!(det.tree.placement(top).unwrap().copy_number, 0);
        assert!(det.placement("PmtTpcTop_252").is_ok());
        assert!(det.placement("PmtTpcTop_253").is_err());
        let bottom = det.placement("PmtTpcBot_253").unwrap();
        assert_eq!(det.tree.placement(bottom).unwrap().copy_number, 253);
        assert!(det.placement("PmtTpcBot_493").is_ok());
        assert!(det.placement("PmtTpcBot_494").is_err());
    }

    #[test]
    fn radial_top_array_shifts_bottom_numbering() {
        let det = build(DetectorConfig {
            top_pmt_pattern: PmtPattern::Radial,
            ..DetectorConfig::default()
        });
        assert!(det.placement("PmtTpcTop_224").is_ok());
        assert!(det.placement("PmtTpcBot_225").is_ok());
        assert!(det.placement("PmtTpcBot_465").is_ok());
    }

    #[test]
    fn veto_follows_configuration() {
        let none = build(DetectorConfig {
            veto: VetoShape::None,
            ..DetectorConfig::default()
        });
        assert!(none.placement("VetoPanel_0").is_err());
        let octagon = build(DetectorConfig {
            veto: VetoShape::Octagon,
            ..DetectorConfig::default()
        });
        assert!(octagon.placement("VetoPanel_95").is_ok());
        assert!(octagon.placement("VetoPanel_96").is_err());
    }

    #[test]
    fn meshes_are_optional() {
        let det = build(DetectorConfig {
            electrode_meshes: false,
            ..DetectorConfig::default()
        });
        assert!(det.placement("GridMeshAluminium_GroundMesh").is_err());
    }

    #[test]
    fn calibration_source_position() {
        let det = build(DetectorConfig {
            calibration_source: CalibrationSource::Side,
            ..DetectorConfig::default()
        });
        let id = det.placement("CalibrationSource").unwrap();
        let t = det.tree.world_transform(id).unwrap();
        assert!(t.translation.x > 980.0);
        assert!(build(DetectorConfig::default()).placement("CalibrationSource").is_err());
    }

    #[test]
    fn liquid_and_gas_split_at_surface() {
        let det = build(DetectorConfig::default());
        let gxe = det.tree.placement(det.placement("GXe").unwrap()).unwrap();
        let solid = &det.tree.volume(gxe.volume).unwrap().solid;
        let level = det.stack.liquid_level_z;
        let above = Point3::new(300.0, 0.0, level + 2.0);
        let below = Point3::new(300.0, 0.0, level - 2.0);
        assert_eq!(classify_point_in_solid(&above, solid), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&below, solid), PointClassification::Outside);
    }

    #[test]
    fn unknown_material_is_fatal() {
        let mut materials = MaterialTable::new();
        for m in MaterialTable::standard().iter().filter(|m| m.name != "Teflon") {
            materials.insert(&m.name, m.density);
        }
        let err = DetectorBuilder::new(DetectorConfig::default())
            .with_materials(materials)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Teflon"));
    }

    #[test]
    fn sensitive_volumes_are_tagged() {
        let det = build(DetectorConfig::default());
        let tagged: Vec<_> = det
            .tree
            .volumes()
            .filter_map(|(_, v)| v.sensitive.as_deref().map(|tag| (v.name.as_str(), tag)))
            .collect();
        assert!(tagged.contains(&("LXeLogicalVolume", LXE_SD)));
        assert!(tagged.contains(&("GXeLogicalVolume", LXE_SD)));
        assert!(tagged.contains(&("PmtWindowLogicalVolume", PMT_SD)));
    }

    #[test]
    fn diagnostics_follow_verbosity() {
        let quiet = build(DetectorConfig::default());
        let mut out = Vec::new();
        quiet.write_diagnostics(&mut out).unwrap();
        assert!(out.is_empty());

        let verbose = build(DetectorConfig {
            verbosity: 1,
            ..DetectorConfig::default()
        });
        let mut out = Vec::new();
        verbose.write_diagnostics(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), verbose.tree.len());
        assert!(text.starts_with("World World -"));
    }

    #[test]
    fn parameter_override_moves_the_bell() {
        let builder = DetectorBuilder::new(DetectorConfig::default()).with_parameter("BellPlateOffsetZ", 900.0);
        let params = builder.parameters().unwrap();
        assert!((params.get("BellPlateOffsetZ").unwrap() - 900.0).abs() < 1e-12);
    }
}
