use std::sync::Arc;

use tracing::info;

use crate::array::ArrayLayout;
use crate::error::Result;
use crate::math::Transform;
use crate::operations::boolean::Subtract;
use crate::operations::creation::MakeTube;
use crate::placement::{OpticalSurface, Rgba, VisAttributes, VolumeDescriptor};
use crate::solid::Solid;

use super::pmt::{self, PmtVolumes};
use super::{Assembly, XenonVolumes};

fn at(z: f64) -> Transform {
    Transform::translation(0.0, 0.0, z)
}

/// The PTFE frame holding the gate, anode and top-mesh rings, centred on
/// its own mid-height, with the ring seats cut out.
pub(super) fn electrode_frame(asm: &Assembly<'_>) -> Result<Solid> {
    let s = asm.stack;
    let inner = 0.5 * asm.get("TpcWallDiameter")?;
    let outer = inner + asm.get("ElectrodesFrameWidth")?;
    let thin_inner = inner + asm.get("ThinElectrodesFrameWidth")?;
    let thin_h = s.shrink_z * asm.get("ThinElectrodesFrameHeight")?;
    let ring_outer = 0.5 * asm.get("GateRingInnerDiameterMin")? + asm.get("GateRingTotalWidth")?;
    let ring_inner = 0.5 * asm.get("AnodeRingInnerDiameter")?;
    let gate_h = s.shrink_z * asm.get("GateRingTotalHeight")?;
    let anode_h = asm.get("AnodeRingHeight")?;
    let top_mesh_h = asm.get("TopMeshRingHeight")?;

    let frame = MakeTube::new(inner, outer, 0.5 * s.frame_height).execute()?;
    // only a thin lip rises above the top-mesh ring
    let frame = Subtract::new(frame, MakeTube::new(thin_inner, outer, 0.5 * thin_h).execute()?)
        .with_transform(at(0.5 * (s.frame_height - thin_h)))
        .execute();

    let gate_z = -0.5 * s.frame_height + 0.5 * gate_h;
    let frame = Subtract::new(frame, MakeTube::new(0.0, ring_outer, 0.5 * gate_h).execute()?)
        .with_transform(at(gate_z))
        .execute();
    let anode_z = gate_z + 0.5 * gate_h + s.shrink_z * asm.get("GateRingTopToAnodeRingBot")? + 0.5 * anode_h;
    let frame = Subtract::new(frame, MakeTube::new(ring_inner, ring_outer, 0.5 * anode_h).execute()?)
        .with_transform(at(anode_z))
        .execute();
    let top_mesh_z = anode_z
        + 0.5 * anode_h
        + s.shrink_z * asm.get("AnodeRingTopToTopMeshRingBot")?
        + 0.5 * top_mesh_h;
    Ok(Subtract::new(frame, MakeTube::new(ring_inner, ring_outer, 0.5 * top_mesh_h).execute()?)
        .with_transform(at(top_mesh_z))
        .execute())
}

/// Builds the bell, the electrode rings and frame, and the top PMT array.
pub(super) fn build(asm: &mut Assembly<'_>, xenon: &XenonVolumes, pmts: &PmtVolumes) -> Result<()> {
    bell(asm, xenon)?;
    electrodes(asm, xenon)?;
    top_array(asm, xenon, pmts)
}

fn bell(asm: &mut Assembly<'_>, xenon: &XenonVolumes) -> Result<()> {
    let s = asm.stack;
    let steel = VisAttributes::visible(Rgba::STEEL);

    let plate = MakeTube::new(0.0, 0.5 * asm.get("BellPlateDiameter")?, 0.5 * asm.get("BellPlateHeight")?)
        .execute()?;
    let v = asm.volume(
        "bell",
        VolumeDescriptor::new("BellPlateLogicalVolume", plate, "SS316Ti").with_vis(steel),
    )?;
    asm.place_at(v, xenon.lxe, "SS_BellPlate", s.bell_plate_z)?;

    let wall_outer = 0.5 * asm.get("BellWallOuterDiameter")?;
    let wall_inner = wall_outer - asm.get("BellWallThickness")?;
    let wall = MakeTube::new(wall_inner, wall_outer, 0.5 * asm.get("BellWallHeight")?).execute()?;
    let v = asm.volume(
        "bell",
        VolumeDescriptor::new("BellWallLogicalVolume", wall, "SS316Ti").with_vis(steel),
    )?;
    asm.place_at(v, xenon.lxe, "SS_BellSideWall", s.bell_wall_z)?;

    // ring hung below the bell wall; 0.2 mm clearances keep it off the pillars
    let cu_inner = 0.5 * asm.get("CopperRingInnerDiameter")? + 0.2;
    let ring = MakeTube::new(cu_inner, wall_inner, 0.5 * asm.get("CopperRingHeight")? - 0.2).execute()?;
    let v = asm.volume(
        "bell",
        VolumeDescriptor::new("CopperRingLogicalVolume", ring, "Copper")
            .with_vis(VisAttributes::visible(Rgba::COPPER)),
    )?;
    asm.place_at(v, xenon.lxe, "Copper_TopRing", s.copper_ring_z)?;

    let inner = 0.5 * asm.get("RingBelowGateInnerDiameter")? + 0.2;
    let ring = MakeTube::new(
        inner,
        inner + asm.get("RingBelowGateWidth")?,
        0.5 * s.ring_below_gate_height,
    )
    .execute()?;
    let v = asm.volume(
        "bell",
        VolumeDescriptor::new("TeflonRingLogicalVolume", ring, "Teflon")
            .with_vis(VisAttributes::visible(Rgba::TEFLON)),
    )?;
    let ring = asm.place_at(v, xenon.lxe, "Teflon_RingBelowGate", s.ring_below_gate_z)?;
    asm.border(xenon.lxe, ring, OpticalSurface::LXeTeflon)?;
    Ok(())
}

fn electrodes(asm: &mut Assembly<'_>, xenon: &XenonVolumes) -> Result<()> {
    let s = asm.stack;
    let steel = VisAttributes::visible(Rgba::STEEL);

    // gate ring: the inner step is wider over the lower part
    let gate_inner = 0.5 * asm.get("GateRingInnerDiameterMin")?;
    let gate_outer = gate_inner + asm.get("GateRingTotalWidth")?;
    let gate_h = asm.get("GateRingTotalHeight")?;
    let step_h = gate_h - asm.get("GateRingHeightSmallDiamRegion")?;
    let gate = MakeTube::new(gate_inner, gate_outer, 0.5 * gate_h).execute()?;
    let gate = Subtract::new(
        gate,
        MakeTube::new(0.0, 0.5 * asm.get("GateRingInnerDiameterMax")?, 0.5 * step_h).execute()?,
    )
    .with_transform(at(-0.5 * gate_h + 0.5 * step_h))
    .execute();
    let v = asm.volume(
        "electrodes",
        VolumeDescriptor::new("GateRingLogicalVolume", gate, "SS316Ti").with_vis(steel),
    )?;
    asm.place_at(v, xenon.lxe, "SS_GateRing", s.gate_ring_z)?;

    let anode_inner = 0.5 * asm.get("AnodeRingInnerDiameter")?;
    let anode = MakeTube::new(
        anode_inner,
        anode_inner + asm.get("AnodeRingWidth")?,
        0.5 * asm.get("AnodeRingHeight")?,
    )
    .execute()?;
    let v = asm.volume(
        "electrodes",
        VolumeDescriptor::new("AnodeRingLogicalVolume", anode, "SS316Ti").with_vis(steel),
    )?;
    asm.place_at(v, xenon.gxe, "SS_AnodeRing", s.anode_ring_z)?;

    let top_mesh_inner = 0.5 * asm.get("TopMeshRingInnerDiameter")?;
    let top_mesh = MakeTube::new(
        top_mesh_inner,
        top_mesh_inner + asm.get("TopMeshRingWidth")?,
        0.5 * asm.get("TopMeshRingHeight")?,
    )
    .execute()?;
    let v = asm.volume(
        "electrodes",
        VolumeDescriptor::new("TopMeshRingLogicalVolume", top_mesh, "SS316Ti").with_vis(steel),
    )?;
    asm.place_at(v, xenon.gxe, "SS_TopMeshRing", s.top_mesh_ring_z)?;

    // the frame is split at the liquid surface so each part carries the
    // optical surface of the xenon phase it faces
    let frame = Arc::new(electrode_frame(asm)?);
    let (h, h_liquid) = (s.frame_height, s.frame_liquid_height);
    let block_r = 2.0 * (0.5 * asm.get("TpcWallDiameter")? + asm.get("ElectrodesFrameWidth")?);
    let liquid_part = Subtract::new(Arc::clone(&frame), MakeTube::new(0.0, block_r, 0.5 * (h - h_liquid)).execute()?)
        .with_transform(at(0.5 * h_liquid))
        .execute();
    let gas_part = Subtract::new(frame, MakeTube::new(0.0, block_r, 0.5 * h_liquid).execute()?)
        .with_transform(at(-0.5 * h + 0.5 * h_liquid))
        .execute();

    let v = asm.volume(
        "electrodes",
        VolumeDescriptor::new("ElectrodesFrameLXeLogicalVolume", liquid_part, "Teflon")
            .with_vis(VisAttributes::visible(Rgba::TEFLON)),
    )?;
    let liquid = asm.place_at(v, xenon.lxe, "Teflon_ElectrodesFrameLXe", s.frame_z)?;
    asm.border(xenon.lxe, liquid, OpticalSurface::LXeTeflon)?;
    let v = asm.volume(
        "electrodes",
        VolumeDescriptor::new("ElectrodesFrameGXeLogicalVolume", gas_part, "Teflon")
            .with_vis(VisAttributes::visible(Rgba::GXE_TEFLON)),
    )?;
    let gas = asm.place_at(v, xenon.lxe, "Teflon_ElectrodesFrameGXe", s.frame_z)?;
    asm.border(xenon.gxe, gas, OpticalSurface::GXeTeflon)?;

    info!(
        gate_z = s.gate_ring_z,
        anode_z = s.anode_ring_z,
        liquid_level = s.liquid_level_z,
        "electrode rings constructed"
    );
    Ok(())
}

fn top_array(asm: &mut Assembly<'_>, xenon: &XenonVolumes, pmts: &PmtVolumes) -> Result<()> {
    let s = asm.stack;
    let layout = pmt::top_layout(asm)?;
    let members = layout.members()?;

    pmts.place_pmts(asm, xenon.gxe, "PmtTpcTop", &layout, Transform::identity(), 0)?;
    asm.tree.place_array(
        pmts.base,
        xenon.gxe,
        "PmtBaseTpcTop",
        &layout,
        at(s.top_bases_z - s.top_pmt_z),
        0,
    )?;

    let holder_hole = Arc::new(MakeTube::new(
        0.0,
        0.5 * s.shrink_r * asm.get("TopPTFEholderHoleDiameter")?,
        asm.get("TopPTFEholderHeight")?,
    )
    .execute()?);
    let holder = MakeTube::new(
        0.0,
        0.5 * asm.get("TopPTFEholderDiameter")?,
        0.5 * asm.get("TopPTFEholderHeight")?,
    )
    .execute()?;
    let v = asm.volume(
        "top array",
        VolumeDescriptor::new("TopPmtHolderLogicalVolume", pmt::drilled(holder, &holder_hole, &members), "Teflon")
            .with_vis(VisAttributes::visible(Rgba::GXE_TEFLON)),
    )?;
    let holder = asm.place_at(v, xenon.gxe, "Teflon_TopPmtHolder", s.top_holder_z)?;
    asm.border(xenon.gxe, holder, OpticalSurface::GXeTeflon)?;

    let copper_h = asm.get("TopCopperPlateHeight")?;
    let copper_hole = Arc::new(MakeTube::new(0.0, 0.5 * asm.get("TopCopperPlateHoleDiameter")?, copper_h).execute()?);
    let copper = MakeTube::new(0.0, 0.5 * asm.get("TopCopperPlateDiameter")?, 0.5 * copper_h).execute()?;
    let v = asm.volume(
        "top array",
        VolumeDescriptor::new("TopCopperPlateLogicalVolume", pmt::drilled(copper, &copper_hole, &members), "Copper")
            .with_vis(VisAttributes::visible(Rgba::COPPER)),
    )?;
    asm.place_at(v, xenon.gxe, "Copper_TopPmtPlate", s.top_copper_z)?;

    let cut = Arc::new(pmt::reflector_cut(asm)?);
    let reflector = MakeTube::new(
        0.0,
        0.5 * asm.get("TopReflectorDiameter")?,
        0.5 * asm.get("TopReflectorHeight")?,
    )
    .execute()?;
    let v = asm.volume(
        "top array",
        VolumeDescriptor::new("TopReflectorLogicalVolume", pmt::drilled(reflector, &cut, &members), "Teflon")
            .with_vis(VisAttributes::visible(Rgba::GXE_TEFLON)),
    )?;
    let reflector = asm.place_at(v, xenon.gxe, "Teflon_TopReflector", s.top_reflector_z)?;
    asm.border(xenon.gxe, reflector, OpticalSurface::GXeTeflon)?;

    info!(
        pattern = layout.name(),
        pmts = members.len(),
        z = s.top_pmt_z,
        "top PMT array constructed"
    );
    Ok(())
}
