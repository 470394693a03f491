use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::math::Transform;
use crate::operations::boolean::Subtract;
use crate::operations::creation::MakeTube;
use crate::operations::shaping::{Flange, HeadSpec, MakeVessel, StiffeningRing};
use crate::placement::{OpticalSurface, PlacementId, Rgba, VisAttributes, VolumeDescriptor};
use crate::solid::Solid;

use super::{top, Assembly, XenonVolumes, LXE_SD};

/// Shell dimensions of one cryostat vessel, read from `{prefix}*` parameters.
struct VesselShell {
    diameter: f64,
    length: f64,
    top: HeadSpec,
    bottom: HeadSpec,
    thickness: f64,
    thickness_top: f64,
    thickness_bot: f64,
}

impl VesselShell {
    fn read(asm: &Assembly<'_>, prefix: &str) -> Result<Self> {
        let get = |name: &str| asm.get(&format!("{prefix}{name}"));
        Ok(Self {
            diameter: get("OuterDiameter")?,
            length: get("CylinderHeight")?,
            top: HeadSpec::new(get("R0top")?, get("R1top")?),
            bottom: HeadSpec::new(get("R0bot")?, get("R1bot")?),
            thickness: get("Thickness")?,
            thickness_top: get("ThicknessTop")?,
            thickness_bot: get("ThicknessBot")?,
        })
    }

    /// The outer surface of the vessel.
    fn hull(&self, bottom_head: bool) -> MakeVessel {
        let vessel = MakeVessel::new(self.diameter, self.length, self.top);
        if bottom_head {
            vessel.with_bottom_head(self.bottom)
        } else {
            vessel
        }
    }

    /// The volume enclosed by the shell.
    fn cavity(&self, bottom_head: bool) -> MakeVessel {
        let inset = |head: HeadSpec, t: f64| HeadSpec::new(head.r0 - t, head.r1 - t);
        let vessel = MakeVessel::new(
            self.diameter - 2.0 * self.thickness,
            self.length,
            inset(self.top, self.thickness_top),
        );
        if bottom_head {
            vessel.with_bottom_head(inset(self.bottom, self.thickness_bot))
        } else {
            vessel
        }
    }
}

/// Highest point and largest radius of the outer cryostat in the water frame.
pub(super) fn outer_extent(asm: &Assembly<'_>) -> Result<(f64, f64)> {
    let shell = VesselShell::read(asm, "OuterCryostat")?;
    let top = shell.hull(false).top_geometry()?;
    let z = asm.get("OuterCryostatOffsetZ")? + 0.5 * shell.length + top.cap_height();
    let radius = 0.5 * shell.diameter + asm.get("OuterCryostatFlangeThickness")?;
    Ok((z, radius))
}

/// Builds the nested vessels down to the two xenon phases.
pub(super) fn build(asm: &mut Assembly<'_>, water: PlacementId) -> Result<XenonVolumes> {
    let bottom_head = asm.config.bottom_head;
    let material = asm.config.cryostat_material.material_name();
    let steel = VisAttributes::visible(Rgba::STEEL);

    // outer vessel and its vacuum
    let outer = VesselShell::read(asm, "OuterCryostat")?;
    let outer_solid = outer
        .hull(bottom_head)
        .with_flange(Flange {
            z_center: asm.get("OuterCryostatFlangeZ")?,
            height: asm.get("OuterCryostatFlangeHeight")?,
            protrusion: asm.get("OuterCryostatFlangeThickness")?,
        })
        .with_stiffening_ring(StiffeningRing {
            z_center: asm.get("OuterCryostatRingsZ1")?,
            height: asm.get("OuterCryostatRingsHeight")?,
            protrusion: asm.get("OuterCryostatRingsThickness")?,
        })
        .with_stiffening_ring(StiffeningRing {
            z_center: asm.get("OuterCryostatRingsZ2")?,
            height: asm.get("OuterCryostatRingsHeight")?,
            protrusion: asm.get("OuterCryostatRingsThickness")?,
        })
        .execute()?;
    let v = asm.volume(
        "cryostat",
        VolumeDescriptor::new("OuterCryostatLogicalVolume", outer_solid, material).with_vis(steel),
    )?;
    let outer_cryostat = asm.place_at(v, water, "SS_OuterCryostat", asm.get("OuterCryostatOffsetZ")?)?;
    asm.tree
        .add_border_surface("Water_OuterCryostatSurface", water, outer_cryostat, OpticalSurface::WaterSteel)?;

    let v = asm.volume(
        "cryostat",
        VolumeDescriptor::new("OuterCryostatVacuumLogicalVolume", outer.cavity(bottom_head).execute()?, "Vacuum")
            .with_vis(VisAttributes::hidden(Rgba::WHITE)),
    )?;
    let vacuum = asm.place(v, outer_cryostat, "Vacuum_Gap", Transform::identity())?;

    // inner vessel
    let inner = VesselShell::read(asm, "InnerCryostat")?;
    let inner_solid = inner
        .hull(bottom_head)
        .with_flange(Flange {
            z_center: asm.get("InnerCryostatFlangeZ")?,
            height: asm.get("InnerCryostatFlangeHeight")?,
            protrusion: asm.get("InnerCryostatFlangeThickness")?,
        })
        .with_stiffening_ring(StiffeningRing {
            z_center: asm.get("InnerCryostatRingsZ")?,
            height: asm.get("InnerCryostatRingsHeight")?,
            protrusion: asm.get("InnerCryostatRingsThickness")?,
        })
        .execute()?;
    let v = asm.volume(
        "cryostat",
        VolumeDescriptor::new("InnerCryostatLogicalVolume", inner_solid, material).with_vis(steel),
    )?;
    let inner_cryostat = asm.place_at(v, vacuum, "SS_InnerCryostat", asm.get("InnerCryostatOffsetZ")?)?;

    // liquid xenon fills the inner vessel
    let lxe_solid = Arc::new(inner.cavity(bottom_head).execute()?);
    let v = asm.volume(
        "xenon",
        VolumeDescriptor::new("LXeLogicalVolume", Arc::clone(&lxe_solid), "LXe")
            .with_sensitive(LXE_SD)
            .with_vis(VisAttributes::visible(Rgba::LXE)),
    )?;
    let lxe = asm.place(v, inner_cryostat, "LXe", Transform::identity())?;

    // gas above the liquid surface, inside the vessel but outside the bell
    let gxe_solid = gas_phase(asm, lxe_solid, inner.diameter - 2.0 * inner.thickness, inner.length)?;
    let v = asm.volume(
        "xenon",
        VolumeDescriptor::new("GXeLogicalVolume", gxe_solid, "GXe")
            .with_sensitive(LXE_SD)
            .with_vis(VisAttributes::visible(Rgba::GXE)),
    )?;
    let gxe = asm.place(v, lxe, "GXe", Transform::identity())?;

    info!(
        material,
        outer_diameter = outer.diameter,
        inner_diameter = inner.diameter,
        liquid_level = asm.stack.liquid_level_z,
        bottom_head,
        "cryostat constructed"
    );
    Ok(XenonVolumes { lxe, gxe })
}

/// The liquid volume minus the bell, the liquid itself and the part of the
/// electrode frame that reaches into the gas.
fn gas_phase(asm: &Assembly<'_>, lxe: Arc<Solid>, diameter: f64, length: f64) -> Result<Solid> {
    let s = asm.stack;
    let plate = MakeTube::new(0.0, 0.5 * asm.get("BellPlateDiameter")?, 0.5 * asm.get("BellPlateHeight")?)
        .execute()?;
    let wall_outer = 0.5 * asm.get("BellWallOuterDiameter")?;
    let wall = MakeTube::new(
        wall_outer - asm.get("BellWallThickness")?,
        wall_outer,
        0.5 * asm.get("BellWallHeight")?,
    )
    .execute()?;
    // oversized block whose top is the liquid surface
    let liquid = MakeTube::new(0.0, diameter, length).execute()?;
    let frame = top::electrode_frame(asm)?;

    let gas = Subtract::new(lxe, plate)
        .with_transform(Transform::translation(0.0, 0.0, s.bell_plate_z))
        .execute();
    let gas = Subtract::new(gas, wall)
        .with_transform(Transform::translation(0.0, 0.0, s.bell_wall_z))
        .execute();
    let gas = Subtract::new(gas, liquid)
        .with_transform(Transform::translation(0.0, 0.0, s.liquid_level_z - length))
        .execute();
    Ok(Subtract::new(gas, frame)
        .with_transform(Transform::translation(0.0, 0.0, s.frame_z))
        .execute())
}
