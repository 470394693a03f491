use std::sync::Arc;

use crate::array::{ArrayLayout, ArrayShape, HexRows, RadialRings};
use crate::config::PmtPattern;
use crate::error::{ArrayError, Result};
use crate::math::Transform;
use crate::operations::boolean::{Subtract, Union};
use crate::operations::creation::{MakeCone, MakePolycone, MakeTube};
use crate::placement::{PlacementId, Rgba, VisAttributes, VolumeDescriptor, VolumeId};
use crate::solid::{Solid, ZPlane};

use super::{Assembly, PMT_SD};

/// Volumes shared by every photomultiplier of both arrays.
#[derive(Debug, Clone, Copy)]
pub(super) struct PmtVolumes {
    body: VolumeId,
    window: VolumeId,
    window_z: f64,
    pub(super) base: VolumeId,
}

impl PmtVolumes {
    /// Registers the PMT body, its photocathode window and the base board.
    pub(super) fn register(asm: &mut Assembly<'_>) -> Result<Self> {
        let height = asm.get("PMTheight")?;
        let body_r = 0.5 * asm.get("PMTBodyDiameter")?;
        let window_r = 0.5 * asm.get("PMTWindowDiameter")?;
        let window_h = asm.get("PMTWindowHeight")?;
        let bottom = -0.5 * height;

        // the narrow window section faces -z
        let body = MakePolycone::new(vec![
            ZPlane::new(bottom, 0.0, window_r),
            ZPlane::new(bottom + window_h, 0.0, window_r),
            ZPlane::new(bottom + window_h, 0.0, body_r),
            ZPlane::new(-bottom, 0.0, body_r),
        ])
        .execute()?;
        let body = asm.volume(
            "photosensors",
            VolumeDescriptor::new("PmtLogicalVolume", body, "PMTBody")
                .with_vis(VisAttributes::visible(Rgba::STEEL)),
        )?;
        let window = asm.volume(
            "photosensors",
            VolumeDescriptor::new(
                "PmtWindowLogicalVolume",
                MakeTube::new(0.0, window_r, 0.5 * window_h).execute()?,
                "Quartz",
            )
            .with_sensitive(PMT_SD),
        )?;
        let base = asm.volume(
            "photosensors",
            VolumeDescriptor::new(
                "PmtBasesLogicalVolume",
                MakeTube::new(0.0, 0.5 * asm.get("PmtBasesDiameter")?, 0.5 * asm.get("PmtBasesHeight")?)
                    .execute()?,
                "Cirlex",
            )
            .with_vis(VisAttributes::visible(Rgba::CIRLEX)),
        )?;
        Ok(Self {
            body,
            window,
            window_z: bottom + 0.5 * window_h,
            base,
        })
    }

    /// Places one PMT per member of `layout` and a window inside each.
    ///
    /// PMT `i` is named `{prefix}_{first_copy + i}`; its window shares the
    /// copy number.
    pub(super) fn place_pmts(
        &self,
        asm: &mut Assembly<'_>,
        parent: PlacementId,
        prefix: &str,
        layout: &ArrayShape,
        local: Transform,
        first_copy: u32,
    ) -> Result<Vec<PlacementId>> {
        let pmts = asm
            .tree
            .place_array(self.body, parent, prefix, layout, local, first_copy)?;
        for (copy, &pmt) in (first_copy..).zip(&pmts) {
            asm.tree.place(
                self.window,
                pmt,
                format!("PmtWindow_{copy}"),
                Transform::translation(0.0, 0.0, self.window_z),
                copy,
            )?;
        }
        Ok(pmts)
    }
}

/// Checks a PMT layout against the channel count in the parameter table.
fn checked(layout: ArrayShape, expected: usize) -> Result<ArrayShape> {
    if layout.count() == expected {
        Ok(layout)
    } else {
        Err(ArrayError::InvalidLayout(format!(
            "{} layout has {} members, {expected} channels expected",
            layout.name(),
            layout.count()
        ))
        .into())
    }
}

/// The top array in the configured pattern, at the PMT centre height.
pub(super) fn top_layout(asm: &Assembly<'_>) -> Result<ArrayShape> {
    let (scale, z) = (asm.stack.shrink_r, asm.stack.top_pmt_z);
    let layout = match asm.config.top_pmt_pattern {
        PmtPattern::Hexagonal => HexRows::top().with_scale(scale).with_z(z).into(),
        PmtPattern::Radial => RadialRings::standard().with_scale(scale).with_z(z).into(),
    };
    checked(layout, asm.count("NbOfTopPMTs")?)
}

/// The bottom array, always hexagonal.
pub(super) fn bottom_layout(asm: &Assembly<'_>) -> Result<ArrayShape> {
    let layout = HexRows::bottom()
        .with_scale(asm.stack.shrink_r)
        .with_z(asm.stack.bottom_pmt_z)
        .into();
    checked(layout, asm.count("NbOfBottomPMTs")?)
}

/// Members expressed in the frame of a part placed with `rotation` (no
/// translation), for drilling parts that are turned over.
pub(super) fn in_frame_of(rotation: &Transform, members: &[Transform]) -> Vec<Transform> {
    let inverse = rotation.inverse();
    members.iter().map(|m| inverse.compose(m)).collect()
}

/// Bores `hole` through `plate` at the `(x, y)` of every member.
pub(super) fn drilled(plate: Solid, hole: &Arc<Solid>, members: &[Transform]) -> Solid {
    members.iter().fold(plate, |plate, member| {
        let t = member.translation;
        Subtract::new(plate, Arc::clone(hole))
            .with_transform(Transform::translation(t.x, t.y, 0.0))
            .execute()
    })
}

/// The stepped hole that seats a PMT window in a reflector plate.
///
/// The hole is built for the top reflector, window side at `-z`; the bottom
/// reflector uses it flipped.
pub(super) fn reflector_cut(asm: &Assembly<'_>) -> Result<Solid> {
    let shrink_r = asm.stack.shrink_r;
    let plate_h = asm.get("TopReflectorHeight")?;
    let hole_r = 0.5 * shrink_r * asm.get("TopReflectorConeHoleDmin")?;
    let cone_r = 0.5 * shrink_r * asm.get("TopReflectorConeHoleDmax")?;
    let cone_h = asm.get("TopReflectorConeHoleHeight")?;
    let step_r = 0.5 * shrink_r * asm.get("TopReflectorTube2Diameter")?;
    let step_h = asm.get("TopReflectorTube2Height")?;
    let gap_h = asm.get("TopReflectorTube1Height")?;
    let collar_r = 0.5 * shrink_r * asm.get("TopReflectorTube3Diameter")?;
    let collar_h = asm.get("TopReflectorTube3Height")?;

    let through = MakeTube::new(0.0, hole_r, 0.5 * plate_h).execute()?;
    let cone = MakeCone::new(0.0, cone_r, 0.0, hole_r, 0.5 * cone_h).execute()?;
    let cone_z = 0.5 * (cone_h - plate_h);
    let step_z = cone_z + 0.5 * (cone_h + step_h) + gap_h;
    let collar_z = 0.5 * (plate_h - collar_h);

    let cut = Union::new(through, cone)
        .with_transform(Transform::translation(0.0, 0.0, cone_z))
        .execute();
    let cut = Union::new(cut, MakeTube::new(0.0, step_r, 0.5 * step_h).execute()?)
        .with_transform(Transform::translation(0.0, 0.0, step_z))
        .execute();
    Ok(Union::new(cut, MakeTube::new(0.0, collar_r, 0.5 * collar_h).execute()?)
        .with_transform(Transform::translation(0.0, 0.0, collar_z))
        .execute())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::boolean::{classify_point_in_solid, PointClassification};

    fn plate() -> Solid {
        MakeTube::new(0.0, 100.0, 5.0).execute().unwrap()
    }

    #[test]
    fn drilled_plate_has_holes_at_members() {
        let hole = Arc::new(MakeTube::new(0.0, 10.0, 5.0).execute().unwrap());
        let members = [
            Transform::translation(-50.0, 0.0, 300.0),
            Transform::translation(50.0, 0.0, 300.0),
        ];
        let plate = drilled(plate(), &hole, &members);
        for x in [-50.0, 50.0] {
            assert_eq!(
                classify_point_in_solid(&Point3::new(x, 0.0, 0.0), &plate),
                PointClassification::Outside
            );
        }
        assert_eq!(
            classify_point_in_solid(&Point3::new(0.0, 0.0, 0.0), &plate),
            PointClassification::Inside
        );
    }

    #[test]
    fn flipped_plate_is_drilled_under_each_member() {
        let hole = Arc::new(MakeTube::new(0.0, 10.0, 5.0).execute().unwrap());
        let flip = Transform::rotation_x(std::f64::consts::PI);
        let members = [Transform::translation(40.0, 30.0, -200.0)];
        let plate = drilled(plate(), &hole, &in_frame_of(&flip, &members));
        // the hole must end up under the member once the plate is turned over
        let under = flip.inverse_transform_point(&Point3::new(40.0, 30.0, 0.0));
        let mirrored = flip.inverse_transform_point(&Point3::new(40.0, -30.0, 0.0));
        assert_eq!(classify_point_in_solid(&under, &plate), PointClassification::Outside);
        assert_eq!(classify_point_in_solid(&mirrored, &plate), PointClassification::Inside);
    }

    #[test]
    fn drilling_nothing_keeps_the_plate() {
        let hole = Arc::new(MakeTube::new(0.0, 10.0, 5.0).execute().unwrap());
        let plate = drilled(plate(), &hole, &[]);
        assert_eq!(
            classify_point_in_solid(&Point3::new(0.0, 0.0, 0.0), &plate),
            PointClassification::Inside
        );
    }
}
