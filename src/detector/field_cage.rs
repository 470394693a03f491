use std::sync::Arc;

use tracing::info;

use crate::array::{AngularArray, ArrayLayout, RingStack};
use crate::error::Result;
use crate::math::Transform;
use crate::operations::boolean::{Subtract, Union};
use crate::operations::creation::{MakeBox, MakePolycone, MakeTorus, MakeTrd, MakeTube};
use crate::placement::{OpticalSurface, PlacementId, Rgba, VisAttributes, VolumeDescriptor};
use crate::solid::Solid;

use super::Assembly;

fn at(z: f64) -> Transform {
    Transform::translation(0.0, 0.0, z)
}

/// Radii of the drift-region wall and the rings wrapped around it.
struct CageRadii {
    wall_inner: f64,
    wall_outer: f64,
    wire: f64,
    fsr: f64,
    guard_width: f64,
    guard: f64,
}

impl CageRadii {
    fn read(asm: &Assembly<'_>) -> Result<Self> {
        let wall_inner = 0.5 * asm.get("TpcWallDiameter")?;
        let wall_outer = wall_inner + asm.get("TpcWallThickness")?;
        let wire = 0.5 * asm.get("FieldShaperWireDiameter")?;
        let fsr = wall_outer + wire;
        let guard_width = asm.get("FieldGuardsWidth")?;
        let guard = fsr + wire + asm.get("GuardToFRSradialDistance")? + 0.5 * guard_width;
        Ok(Self {
            wall_inner,
            wall_outer,
            wire,
            fsr,
            guard_width,
            guard,
        })
    }
}

/// Builds the TPC wall, field shaping rings and guards, the pillars and the
/// cathode with its PTFE supports. Everything sits in the liquid.
pub(super) fn build(asm: &mut Assembly<'_>, lxe: PlacementId) -> Result<()> {
    let s = asm.stack;
    let r = CageRadii::read(asm)?;
    let teflon = VisAttributes::visible(Rgba::TEFLON);
    let copper = VisAttributes::visible(Rgba::COPPER);

    let wall = MakeTube::new(r.wall_inner, r.wall_outer, 0.5 * s.tpc_height).execute()?;
    let v = asm.volume(
        "field cage",
        VolumeDescriptor::new("TpcLogicalVolume", wall, "Teflon").with_vis(teflon),
    )?;
    let wall = asm.place_at(v, lxe, "Teflon_TPC", s.tpc_z)?;
    asm.border(lxe, wall, OpticalSurface::LXeTeflon)?;

    // field shaper wires
    let rings = RingStack::field_shaper(asm.count("NumerOfFieldShaperWires")?, s.fsr_top_z, s.fsr_pitch);
    let fsr = Arc::new(MakeTorus::new(0.0, r.wire, r.fsr).execute()?);
    let v = asm.volume(
        "field cage",
        VolumeDescriptor::new("FieldShaperRingLogicalVolume", Arc::clone(&fsr), "Copper").with_vis(copper),
    )?;
    asm.tree
        .place_array(v, lxe, "Copper_FieldShaperRing", &rings, Transform::identity(), 0)?;

    // guards: a flat band with rounded edges
    let half_w = 0.5 * r.guard_width;
    let tube_h = asm.get("FieldGuardsTubeHeight")?;
    let edge = Arc::new(MakeTorus::new(0.0, half_w, r.guard).execute()?);
    let guard = Union::new(MakeTube::new(r.guard - half_w, r.guard + half_w, 0.5 * tube_h).execute()?, Arc::clone(&edge))
        .with_transform(at(0.5 * tube_h))
        .execute();
    let guard = Arc::new(
        Union::new(guard, edge)
            .with_transform(at(-0.5 * tube_h))
            .execute(),
    );
    let guards = RingStack::new(asm.count("NumerOfFieldGuards")?, s.guard_top_z, s.guard_pitch);
    let v = asm.volume(
        "field cage",
        VolumeDescriptor::new("FieldGuardLogicalVolume", Arc::clone(&guard), "Copper").with_vis(copper),
    )?;
    asm.tree
        .place_array(v, lxe, "Copper_FieldGuard", &guards, Transform::identity(), 0)?;

    // pillars, notched where the rings pass
    let pillar_count = asm.count("NumberOfPillars")?;
    let pillar_radius = r.wall_outer + 0.5 * asm.get("MiddleBoxBase_y")?;
    let notches = Notches {
        axis_y: -pillar_radius,
        fsr,
        fsr_z: rings.members()?.into_iter().skip(1).map(|t| t.translation.z).collect(),
        guard,
        guard_z: guards.members()?.into_iter().map(|t| t.translation.z).collect(),
    };
    let pillar = notches.apply(pillar_solid(asm)?, s.pillar_z);
    let pillars = AngularArray::new(pillar_count, pillar_radius, s.pillar_z)
        .with_step(asm.get("PillarsDeltaTheta")?);
    let v = asm.volume(
        "field cage",
        VolumeDescriptor::new("PTFEpillarLogicalVolume", pillar, "Teflon").with_vis(teflon),
    )?;
    let ids = asm
        .tree
        .place_array(v, lxe, "Teflon_Pillar", &pillars, Transform::identity(), 0)?;
    for id in ids {
        asm.border(lxe, id, OpticalSurface::LXeTeflon)?;
    }

    cathode(asm, lxe, &r)?;

    info!(
        field_shaper_rings = rings.count(),
        guards = guards.count(),
        pillars = pillar_count,
        drift_length = s.tpc_height,
        "field cage constructed"
    );
    Ok(())
}

/// The PTFE pillar in its own frame: `+y` points away from the axis and
/// `z = 0` is the centre of the main bar.
fn pillar_solid(asm: &Assembly<'_>) -> Result<Solid> {
    let shrink = asm.stack.shrink_z;
    let half_x = 0.5 * asm.get("BottomBoxBase_x")?;
    let mid_y = asm.get("MiddleBoxBase_y")?;
    let mid_h = shrink * asm.get("MiddleBox_height")?;
    let top_y = asm.get("TopBoxBase_y")?;
    let top_h = shrink * asm.get("TopBox_height")?;
    let trap_h = shrink * asm.get("Trapezoid_height")?;
    let trap_w = asm.get("Trapezoid_y2")? - asm.get("Trapezoid_y1")?;
    let bot_y = asm.get("BottomBoxBase_y")?;
    let bot_h = shrink * asm.get("BottomBox_height")?;

    let bar = MakeBox::new(half_x, 0.5 * mid_y, 0.5 * mid_h).execute()?;
    let head = MakeBox::new(half_x, 0.5 * top_y, 0.5 * top_h).execute()?;
    let pillar = Union::new(bar, head)
        .with_transform(Transform::translation(0.0, 0.5 * (top_y - mid_y), 0.5 * (mid_h + top_h)))
        .execute();

    // a wedge on the outer face carries the foot outwards
    let trap_y = 0.5 * mid_y;
    let trap_z = 0.5 * mid_h - shrink * asm.get("MiddleBox_height_UpToTrapezoid")? - 0.5 * trap_h;
    let wedge = MakeTrd::new(half_x, half_x, trap_w, 0.0, 0.5 * trap_h).execute()?;
    let pillar = Union::new(pillar, wedge)
        .with_transform(Transform::translation(0.0, trap_y, trap_z))
        .execute();

    let foot = MakeBox::new(half_x, 0.5 * bot_y, 0.5 * bot_h).execute()?;
    Ok(Union::new(pillar, foot)
        .with_transform(Transform::translation(
            0.0,
            trap_y + trap_w - 0.5 * bot_y,
            trap_z - 0.5 * (trap_h + bot_h),
        ))
        .execute())
}

/// Ring cross-sections removed from a pillar.
struct Notches {
    /// Position of the TPC axis along the pillar's `y`.
    axis_y: f64,
    fsr: Arc<Solid>,
    fsr_z: Vec<f64>,
    guard: Arc<Solid>,
    guard_z: Vec<f64>,
}

impl Notches {
    fn apply(&self, pillar: Solid, pillar_z: f64) -> Solid {
        let cuts = self
            .fsr_z
            .iter()
            .map(|z| (&self.fsr, z))
            .chain(self.guard_z.iter().map(|z| (&self.guard, z)));
        cuts.fold(pillar, |pillar, (ring, z)| {
            Subtract::new(pillar, Arc::clone(ring))
                .with_transform(Transform::translation(0.0, self.axis_y, z - pillar_z))
                .execute()
        })
    }
}

fn cathode(asm: &mut Assembly<'_>, lxe: PlacementId, r: &CageRadii) -> Result<()> {
    let s = asm.stack;
    let steel = VisAttributes::visible(Rgba::STEEL);
    let teflon = VisAttributes::visible(Rgba::TEFLON);

    let bottom_tpc = MakeTube::new(
        r.wall_inner,
        r.wall_inner + asm.get("BottomTpcWidth")?,
        0.5 * s.bottom_tpc_height,
    )
    .execute()?;
    let v = asm.volume(
        "cathode",
        VolumeDescriptor::new("BottomTpcLogicalVolume", bottom_tpc, "Teflon").with_vis(teflon),
    )?;
    let bottom_tpc = asm.place_at(v, lxe, "Teflon_BottomTPC", s.bottom_tpc_z)?;
    asm.border(lxe, bottom_tpc, OpticalSurface::LXeTeflon)?;

    let ring = rounded_ring(
        0.5 * asm.get("CathodeRingInnerDiameter")?,
        asm.get("CathodeRingTubeWidth")?,
        asm.get("CathodeRingTubeHeight")?,
        asm.get("CathodeRingTorusRadius")?,
        -1.0,
    )?;
    let v = asm.volume(
        "cathode",
        VolumeDescriptor::new("CathodeRingLogicalVolume", ring, "SS316Ti").with_vis(steel),
    )?;
    asm.place_at(v, lxe, "SS_CathodeRing", s.cathode_ring_z)?;

    // PTFE brackets resting on the cathode ring, one per pillar gap
    let height = asm.get("PTFEAboveCathodeHeight")?;
    let bot_h = asm.get("PTFEAboveCathodeBotHeight")?;
    let mid_h = asm.get("PTFEAboveCathodeMiddleHeight")?;
    let top_r = asm.get("PTFEAboveCathodeTopInnerR")?;
    let top_w = asm.get("PTFEAboveCathodeTopWidth")?;
    let bot_r = asm.get("PTFEAboveCathodeBotInnerR")?;
    let bot_w = asm.get("PTFEAboveCathodeBotWidth")?;
    let (z0, z1, z2) = (-0.5 * height, -0.5 * height + bot_h, -0.5 * height + bot_h + mid_h);
    let gap = asm.get("PTFECathodeAngularSeparation")?;
    let count = asm.count("NumberOfPillars")?;
    let step = asm.get("PillarsDeltaTheta")?;
    let bracket = MakePolycone::from_arrays(
        &[z0, z1, z1, z2, z2, 0.5 * height],
        &[bot_r, bot_r, top_r, top_r, top_r, top_r],
        &[bot_r + bot_w, bot_r + bot_w, bot_r + bot_w, bot_r + bot_w, top_r + top_w, top_r + top_w],
    )
    .with_phi(0.5 * gap, step - gap)
    .execute()?;
    let v = asm.volume(
        "cathode",
        VolumeDescriptor::new("CathodeRingFrameLogicalVolume", bracket, "Teflon").with_vis(teflon),
    )?;
    let brackets = AngularArray::new(count, 0.0, s.cathode_frame_z).with_step(step);
    let ids = asm
        .tree
        .place_array(v, lxe, "Teflon_CathodeRingFrame", &brackets, Transform::identity(), 0)?;
    for id in ids {
        asm.border(lxe, id, OpticalSurface::LXeTeflon)?;
    }
    Ok(())
}

/// A flat electrode ring whose edge on the `side` (`+1` up, `-1` down) is
/// rounded by two tori and filled between them.
pub(super) fn rounded_ring(inner: f64, width: f64, tube_h: f64, radius: f64, side: f64) -> Result<Solid> {
    let ring = MakeTube::new(inner, inner + width, 0.5 * tube_h).execute()?;
    let (r1, r2) = (inner + radius, inner + width - radius);
    let fill = MakeTube::new(r1, r2, 0.5 * tube_h).execute()?;
    let ring = Union::new(ring, fill)
        .with_transform(at(side * tube_h))
        .execute();
    let ring = Union::new(ring, MakeTorus::new(0.0, radius, r1).execute()?)
        .with_transform(at(side * 0.5 * tube_h))
        .execute();
    Ok(Union::new(ring, MakeTorus::new(0.0, radius, r2).execute()?)
        .with_transform(at(side * 0.5 * tube_h))
        .execute())
}
