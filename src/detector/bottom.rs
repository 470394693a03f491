use std::sync::Arc;

use tracing::info;

use crate::array::ArrayLayout;
use crate::error::{ArrayError, Result};
use crate::math::Transform;
use crate::operations::creation::MakeTube;
use crate::placement::{OpticalSurface, PlacementId, Rgba, VisAttributes, VolumeDescriptor};

use super::field_cage::rounded_ring;
use super::pmt::{self, PmtVolumes};
use super::Assembly;

/// Builds the bottom-mesh ring, the PTFE ring below it, the bottom PMT
/// array with its reflector, copper plate and holder, and the copper ring
/// under the pillars. The bottom PMTs face up and continue the channel
/// numbering of the top array.
pub(super) fn build(asm: &mut Assembly<'_>, lxe: PlacementId, pmts: &PmtVolumes) -> Result<()> {
    let s = asm.stack;
    let teflon = VisAttributes::visible(Rgba::TEFLON);

    let bm = rounded_ring(
        0.5 * asm.get("BMringInnerDiameter")?,
        asm.get("BMringTubeWidth")?,
        asm.get("BMringTubeHeight")?,
        asm.get("BMringTorusRadius")?,
        1.0,
    )?;
    let v = asm.volume(
        "bottom array",
        VolumeDescriptor::new("BottomMeshRingLogicalVolume", bm, "SS316Ti")
            .with_vis(VisAttributes::visible(Rgba::STEEL)),
    )?;
    asm.place_at(v, lxe, "SS_BottomMeshRing", s.bm_ring_z)?;

    let inner = 0.5 * asm.get("TeflonBMringInnerD")?;
    let ring = MakeTube::new(inner, inner + asm.get("TeflonBMringWidth")?, 0.5 * s.ring_below_bm_height).execute()?;
    let v = asm.volume(
        "bottom array",
        VolumeDescriptor::new("TeflonBMRingLogicalVolume", ring, "Teflon").with_vis(teflon),
    )?;
    let ring = asm.place_at(v, lxe, "Teflon_RingBelowBottomMesh", s.ring_below_bm_z)?;
    asm.border(lxe, ring, OpticalSurface::LXeTeflon)?;

    // photosensors
    let layout = pmt::bottom_layout(asm)?;
    let members = layout.members()?;
    let first = u32::try_from(asm.count("NbOfTopPMTs")?)
        .map_err(|_| ArrayError::InvalidLayout("top PMT count exceeds u32".into()))?;
    let flip = Transform::rotation_x(std::f64::consts::PI);
    pmts.place_pmts(asm, lxe, "PmtTpcBot", &layout, flip, first)?;
    asm.tree.place_array(
        pmts.base,
        lxe,
        "PmtBaseTpcBot",
        &layout,
        Transform::translation(0.0, 0.0, s.bottom_bases_z - s.bottom_pmt_z),
        first,
    )?;

    // the reflector uses the top seat turned upside down
    let cut = Arc::new(pmt::reflector_cut(asm)?);
    let seats = pmt::in_frame_of(&flip, &members);
    let reflector = MakeTube::new(
        0.0,
        0.5 * asm.get("BotReflectorDiameter")?,
        0.5 * asm.get("TopReflectorHeight")?,
    )
    .execute()?;
    let v = asm.volume(
        "bottom array",
        VolumeDescriptor::new("BottomReflectorLogicalVolume", pmt::drilled(reflector, &cut, &seats), "Teflon")
            .with_vis(teflon),
    )?;
    let reflector = asm.place(
        v,
        lxe,
        "Teflon_BottomReflector",
        flip.with_translation(0.0, 0.0, s.bottom_reflector_z),
    )?;
    asm.border(lxe, reflector, OpticalSurface::LXeTeflon)?;

    let copper_h = asm.get("BotCopperPlateHeight")?;
    let copper_hole = Arc::new(MakeTube::new(0.0, 0.5 * asm.get("BotCopperPlateHoleDiameter")?, copper_h).execute()?);
    let copper = MakeTube::new(0.0, 0.5 * asm.get("BotCopperPlateDiameter")?, 0.5 * copper_h).execute()?;
    let v = asm.volume(
        "bottom array",
        VolumeDescriptor::new("BottomCopperPlateLogicalVolume", pmt::drilled(copper, &copper_hole, &members), "Copper")
            .with_vis(VisAttributes::visible(Rgba::COPPER)),
    )?;
    asm.place_at(v, lxe, "Copper_BottomPmtPlate", s.bottom_copper_z)?;

    let holder_h = asm.get("TopPTFEholderHeight")?;
    let holder_hole = Arc::new(MakeTube::new(
        0.0,
        0.5 * s.shrink_r * asm.get("TopPTFEholderHoleDiameter")?,
        holder_h,
    )
    .execute()?);
    let holder = MakeTube::new(0.0, 0.5 * asm.get("TopPTFEholderDiameter")?, 0.5 * holder_h).execute()?;
    let v = asm.volume(
        "bottom array",
        VolumeDescriptor::new("BottomPmtHolderLogicalVolume", pmt::drilled(holder, &holder_hole, &members), "Teflon")
            .with_vis(teflon),
    )?;
    let holder = asm.place_at(v, lxe, "Teflon_BottomPmtHolder", s.bottom_holder_z)?;
    asm.border(lxe, holder, OpticalSurface::LXeTeflon)?;

    let inner = 0.5 * asm.get("CuBelowPillarsInnerDiameter")?;
    let ring = MakeTube::new(
        inner,
        inner + asm.get("CuBelowPillarsWidth")?,
        0.5 * asm.get("CuBelowPillarsHeight")?,
    )
    .execute()?;
    let v = asm.volume(
        "bottom array",
        VolumeDescriptor::new("CopperBelowPillarsLogicalVolume", ring, "Copper")
            .with_vis(VisAttributes::visible(Rgba::COPPER)),
    )?;
    asm.place_at(v, lxe, "Copper_LowerRing", s.lower_ring_z)?;

    info!(
        pmts = members.len(),
        first_channel = first,
        z = s.bottom_pmt_z,
        "bottom PMT array constructed"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::config::DetectorConfig;
    use crate::detector::DetectorBuilder;
    use crate::math::Vector3;
    use approx::assert_relative_eq;

    #[test]
    fn bottom_pmts_face_up() {
        let det = DetectorBuilder::new(DetectorConfig::default()).build().unwrap();
        let id = det.placement("PmtTpcBot_253").unwrap();
        let t = det.tree.placement(id).unwrap().transform;
        // the window side (-z in the PMT frame) points up
        let window_dir = t.transform_vector(&Vector3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(window_dir.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(t.translation.z, det.stack.bottom_pmt_z, epsilon = 1e-9);

        let base = det.placement("PmtBaseTpcBot_253").unwrap();
        let base_z = det.tree.placement(base).unwrap().transform.translation.z;
        assert_relative_eq!(base_z, det.stack.bottom_bases_z, epsilon = 1e-9);
    }
}
