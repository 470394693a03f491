use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::array::{
    ArrayLayout, ArrayShape, BoxPanels, CylinderPanels, OctagonPanels, PanelGrid,
};
use crate::config::{CalibrationSource, VetoShape};
use crate::error::{Result, SolidError};
use crate::material::MaterialTable;
use crate::math::Transform;
use crate::operations::creation::{MakeBox, MakeTube};
use crate::operations::shaping::SupportLattice;
use crate::params::Parameters;
use crate::placement::{OpticalSurface, PlacementId, Rgba, VisAttributes, VolumeDescriptor, VolumeId};

use super::{cryostat, Assembly};

/// The air-filled world box.
pub(super) fn world_volume(params: &Parameters, materials: &MaterialTable) -> Result<VolumeDescriptor> {
    let half = params.get("WorldHalfLength")?;
    materials.require("world", "G4_AIR")?;
    Ok(
        VolumeDescriptor::new("World", MakeBox::new(half, half, half).execute()?, "G4_AIR")
            .with_vis(VisAttributes::hidden(Rgba::WHITE)),
    )
}

/// Builds the water shield and everything in it outside the cryostat.
/// Returns the water placement.
pub(super) fn build(asm: &mut Assembly<'_>, world: PlacementId) -> Result<PlacementId> {
    let radius = asm.get("WaterTankOuterRadius")?;
    let half_height = 0.5 * asm.get("WaterTankHeight")?;
    let tank = asm.volume(
        "water tank",
        VolumeDescriptor::new(
            "WaterTankLogicalVolume",
            MakeTube::new(0.0, radius, half_height).execute()?,
            "SS304LSteel",
        )
        .with_vis(VisAttributes::visible(Rgba::STEEL)),
    )?;
    let tank = asm.place(tank, world, "WaterTank", Transform::identity())?;

    let water = asm.volume(
        "water tank",
        VolumeDescriptor::new(
            "WaterLogicalVolume",
            MakeTube::new(0.0, asm.get("WaterTankInnerRadius")?, asm.get("WaterHalfHeight")?).execute()?,
            "Water",
        )
        .with_vis(VisAttributes::visible(Rgba::WATER)),
    )?;
    let water = asm.place(water, tank, "Water", Transform::identity())?;
    asm.tree
        .add_border_surface("Water_TankSurface", water, tank, OpticalSurface::WaterSteel)?;
    info!(radius, height = 2.0 * half_height, "water tank constructed");

    veto(asm, water)?;
    support(asm, water)?;
    calibration_source(asm, water)?;
    Ok(water)
}

/// The veto panel layout selected by the configuration.
fn veto_layout(asm: &Assembly<'_>) -> Result<Option<ArrayShape>> {
    let rows = asm.count("VetoRows")?;
    let row_pitch = asm.get("VetoRowPitch")?;
    let bottom_z = asm.get("VetoBottomZ")?;
    let column_pitch = asm.get("VetoColumnPitch")?;
    let shape = match asm.config.veto {
        VetoShape::Cylinder => CylinderPanels::new(
            asm.count("VetoCylinderPanelsPerRow")?,
            rows,
            asm.get("VetoCylinderRadius")?,
            row_pitch,
            bottom_z,
        )
        .into(),
        VetoShape::Box => BoxPanels::new(
            asm.get("VetoBoxHalfX")?,
            asm.get("VetoBoxHalfY")?,
            PanelGrid::new(asm.count("VetoBoxColumns")?, rows, column_pitch, row_pitch, bottom_z),
        )
        .into(),
        VetoShape::Octagon => OctagonPanels::new(
            asm.get("VetoOctagonApothem")?,
            PanelGrid::new(asm.count("VetoOctagonColumns")?, rows, column_pitch, row_pitch, bottom_z),
        )
        .into(),
        VetoShape::None => return Ok(None),
    };
    Ok(Some(shape))
}

fn veto(asm: &mut Assembly<'_>, water: PlacementId) -> Result<()> {
    let Some(layout) = veto_layout(asm)? else {
        info!("muon veto panels disabled");
        return Ok(());
    };
    let panel = MakeBox::new(
        0.5 * asm.get("VetoPanelThickness")?,
        0.5 * asm.get("VetoPanelWidth")?,
        0.5 * asm.get("VetoPanelHeight")?,
    )
    .execute()?;
    let v = asm.volume(
        "muon veto",
        VolumeDescriptor::new("VetoPanelLogicalVolume", panel, "Tyvek").with_vis(VisAttributes::visible(Rgba::WHITE)),
    )?;
    let panels = asm
        .tree
        .place_array(v, water, "VetoPanel", &layout, Transform::identity(), 0)?;
    for &id in &panels {
        asm.border(water, id, OpticalSurface::WaterTyvek)?;
    }
    info!(shape = layout.name(), panels = layout.count(), "muon veto constructed");
    Ok(())
}

fn support(asm: &mut Assembly<'_>, water: PlacementId) -> Result<()> {
    let legs = asm.count("SupportLegs")?;
    let legs = u32::try_from(legs)
        .map_err(|_| SolidError::Degenerate(format!("support lattice with {legs} legs")))?;
    let lattice = SupportLattice::new(
        legs,
        asm.get("SupportLegRadius")?,
        asm.get("SupportFloorLegLength")?,
        asm.get("SupportTiltedLegLength")?,
    )
    .with_section(asm.get("SupportBeamHalfWidth")?, asm.get("SupportBeamWall")?)
    .with_tilt(asm.get("SupportTilt")?)
    .with_azimuth_offset(asm.get("SupportAzimuthOffset")?)
    .with_brace_height(asm.get("SupportBraceHeight")?)
    .with_ring_radius(asm.get("SupportRingRadius")?)
    .with_rod_radius(asm.get("SupportRodRadius")?);
    let floor = Transform::translation(0.0, 0.0, -asm.get("WaterHalfHeight")?);

    let members = lattice.execute()?;
    // members of one kind share a solid, so they share a volume
    let mut volumes: HashMap<&str, VolumeId> = HashMap::new();
    for member in &members {
        let kind = member.name.split('_').next().unwrap_or(&member.name);
        let v = match volumes.get(kind).copied() {
            Some(v) => v,
            None => {
                let v = asm.volume(
                    "support structure",
                    VolumeDescriptor::new(
                        format!("Support{kind}LogicalVolume"),
                        Arc::clone(&member.solid),
                        "SS304LSteel",
                    )
                    .with_vis(VisAttributes::visible(Rgba::STEEL)),
                )?;
                volumes.insert(kind, v);
                v
            }
        };
        asm.place(v, water, format!("Support_{}", member.name), member.transform.then(&floor))?;
    }
    info!(
        members = members.len(),
        top_height = lattice.top_height(),
        top_radius = lattice.top_radius(),
        "support structure constructed"
    );
    Ok(())
}

fn calibration_source(asm: &mut Assembly<'_>, water: PlacementId) -> Result<()> {
    if asm.config.calibration_source == CalibrationSource::None {
        return Ok(());
    }
    let radius = asm.get("CalSourceRadius")?;
    let half_height = asm.get("CalSourceHalfHeight")?;
    let (cryostat_top, cryostat_radius) = cryostat::outer_extent(asm)?;
    let position = match asm.config.calibration_source {
        CalibrationSource::Top => {
            Transform::translation(0.0, 0.0, cryostat_top + asm.get("CalSourceClearance")? + half_height)
        }
        CalibrationSource::Side => Transform::translation(
            cryostat_radius + asm.get("CalSourceSideDistance")? + radius,
            0.0,
            asm.get("OuterCryostatOffsetZ")?,
        ),
        CalibrationSource::None => return Ok(()),
    };
    let v = asm.volume(
        "calibration",
        VolumeDescriptor::new(
            "CalibrationSourceLogicalVolume",
            MakeTube::new(0.0, radius, half_height).execute()?,
            "Tungsten",
        ),
    )?;
    asm.place(v, water, "CalibrationSource", position)?;
    info!(
        position = asm.config.calibration_source.as_str(),
        x = position.translation.x,
        z = position.translation.z,
        "calibration source placed"
    );
    Ok(())
}
