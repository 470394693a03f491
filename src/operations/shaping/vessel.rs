use std::f64::consts::PI;

use tracing::debug;

use crate::error::{Result, SolidError};
use crate::math::{Transform, TOLERANCE};
use crate::operations::boolean::Union;
use crate::operations::creation::{MakePolycone, MakeSphere, MakeTorus};
use crate::solid::{Solid, ZPlane};

/// Axial padding of each radius step in the body profile.
pub const PROFILE_EPSILON: f64 = 1e-3;

/// Radii of one torospherical head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadSpec {
    /// Spherical (crown) radius.
    pub r0: f64,
    /// Toroidal (knuckle) radius.
    pub r1: f64,
    /// Radial thickness correction subtracted from the knuckle centre radius.
    pub correction: f64,
}

impl HeadSpec {
    /// Creates a head without correction.
    #[must_use]
    pub fn new(r0: f64, r1: f64) -> Self {
        Self {
            r0,
            r1,
            correction: 0.0,
        }
    }

    /// Sets the thickness correction.
    #[must_use]
    pub fn with_correction(mut self, correction: f64) -> Self {
        self.correction = correction;
        self
    }
}

/// Outward flange ring on the cylindrical body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flange {
    /// Axial centre in the vessel frame.
    pub z_center: f64,
    /// Axial height.
    pub height: f64,
    /// Radial protrusion beyond the body.
    pub protrusion: f64,
}

/// Stiffening ring on the cylindrical body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StiffeningRing {
    /// Axial centre in the vessel frame.
    pub z_center: f64,
    /// Axial height.
    pub height: f64,
    /// Radial protrusion beyond the body.
    pub protrusion: f64,
}

/// Solved knuckle and cap geometry of one head.
///
/// All axial values are relative to the plane where the head meets the
/// cylinder, positive pointing away from the body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadGeometry {
    /// Cylinder radius.
    pub radius: f64,
    /// Spherical radius.
    pub r0: f64,
    /// Toroidal radius.
    pub r1: f64,
    /// Radius of the knuckle centre circle, `R − R1 − correction`.
    pub rc0: f64,
    /// Distance between the sphere centre and the knuckle centre, `R0 − R1`.
    pub dr0: f64,
    /// Knuckle half-angle, `asin(rc0 / dR0)`.
    pub theta: f64,
    /// Depth of the sphere centre below the junction plane.
    pub dz: f64,
}

impl HeadGeometry {
    /// Solves the head for a cylinder of radius `radius`.
    ///
    /// A head with `R0 = R1 = R` is the hemispherical limit: `θ = 90°`,
    /// `dZ = 0` and no knuckle.
    ///
    /// # Errors
    ///
    /// Returns [`SolidError::Degenerate`] for non-positive radii, or if the
    /// knuckle centre radius is not positive or exceeds `R0 − R1` outside the
    /// hemispherical limit.
    pub fn solve(radius: f64, head: HeadSpec) -> Result<Self> {
        let rc0 = radius - head.r1 - head.correction;
        let dr0 = head.r0 - head.r1;
        let degenerate = || {
            SolidError::Degenerate(format!(
                "torospherical head R = {radius}, R0 = {}, R1 = {}: rc0 = {rc0}, dR0 = {dr0}",
                head.r0, head.r1
            ))
        };
        if !(radius > 0.0 && head.r0 > 0.0 && head.r1 >= 0.0) {
            return Err(degenerate().into());
        }
        if rc0.abs() <= TOLERANCE && dr0.abs() <= TOLERANCE {
            return Ok(Self {
                radius,
                r0: head.r0,
                r1: head.r1,
                rc0: 0.0,
                dr0: 0.0,
                theta: 0.5 * PI,
                dz: 0.0,
            });
        }
        if !(rc0 > 0.0 && dr0 > 0.0 && rc0 <= dr0 + TOLERANCE) {
            return Err(degenerate().into());
        }
        let ratio = (rc0 / dr0).min(1.0);
        Ok(Self {
            radius,
            r0: head.r0,
            r1: head.r1,
            rc0,
            dr0,
            theta: ratio.asin(),
            dz: (dr0 * dr0 - rc0 * rc0).max(0.0).sqrt(),
        })
    }

    /// `true` for the hemispherical limit, which has no knuckle.
    #[must_use]
    pub fn is_hemispherical(&self) -> bool {
        self.dr0 <= TOLERANCE
    }

    /// Height of the crown above the junction plane.
    #[must_use]
    pub fn cap_height(&self) -> f64 {
        self.r0 - self.dz
    }

    /// Radius where the knuckle hands over to the spherical cap.
    #[must_use]
    pub fn junction_radius(&self) -> f64 {
        if self.is_hemispherical() {
            return self.r0;
        }
        self.r0 * self.rc0 / self.dr0
    }

    /// Outer knuckle surface height at radius `r`, if the knuckle spans it.
    #[must_use]
    pub fn knuckle_z(&self, r: f64) -> Option<f64> {
        let d = r - self.rc0;
        (d >= -TOLERANCE && d <= self.r1 + TOLERANCE)
            .then(|| (self.r1 * self.r1 - d * d).max(0.0).sqrt())
    }

    /// Outer cap surface height at radius `r`, if the cap spans it.
    #[must_use]
    pub fn cap_z(&self, r: f64) -> Option<f64> {
        (r >= 0.0 && r <= self.junction_radius() + TOLERANCE)
            .then(|| (self.r0 * self.r0 - r * r).max(0.0).sqrt() - self.dz)
    }
}

#[derive(Debug, Clone, Copy)]
struct Band {
    lo: f64,
    hi: f64,
    protrusion: f64,
}

/// Builds a cylindrical vessel closed by torospherical heads.
///
/// The vessel axis is `z`; the cylinder spans `[-length/2, length/2]` and the
/// top head sits on `+z`. The result is a solid volume: shells are obtained
/// by nesting an inner vessel of a different material.
pub struct MakeVessel {
    diameter: f64,
    length: f64,
    top: HeadSpec,
    bottom: Option<HeadSpec>,
    bottom_shift: f64,
    flange: Option<Flange>,
    rings: Vec<StiffeningRing>,
}

impl MakeVessel {
    /// Creates a vessel with only a top head.
    #[must_use]
    pub fn new(diameter: f64, length: f64, top: HeadSpec) -> Self {
        Self {
            diameter,
            length,
            top,
            bottom: None,
            bottom_shift: 0.0,
            flange: None,
            rings: Vec::new(),
        }
    }

    /// Closes the bottom end with a head.
    #[must_use]
    pub fn with_bottom_head(mut self, bottom: HeadSpec) -> Self {
        self.bottom = Some(bottom);
        self
    }

    /// Moves the bottom end of the vessel along `z` by `shift`.
    #[must_use]
    pub fn with_bottom_shift(mut self, shift: f64) -> Self {
        self.bottom_shift = shift;
        self
    }

    /// Adds the flange ring.
    #[must_use]
    pub fn with_flange(mut self, flange: Flange) -> Self {
        self.flange = Some(flange);
        self
    }

    /// Adds a stiffening ring (at most two).
    #[must_use]
    pub fn with_stiffening_ring(mut self, ring: StiffeningRing) -> Self {
        self.rings.push(ring);
        self
    }

    /// Solved geometry of the top head.
    ///
    /// # Errors
    ///
    /// Returns an error if the head is degenerate.
    pub fn top_geometry(&self) -> Result<HeadGeometry> {
        HeadGeometry::solve(0.5 * self.diameter, self.top)
    }

    /// Solved geometry of the bottom head, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the head is degenerate.
    pub fn bottom_geometry(&self) -> Result<Option<HeadGeometry>> {
        self.bottom
            .map(|head| HeadGeometry::solve(0.5 * self.diameter, head))
            .transpose()
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive dimensions, degenerate heads, more
    /// than two stiffening rings, or ring bands that overlap or are too thin
    /// to be padded.
    pub fn execute(&self) -> Result<Solid> {
        for (parameter, value) in [("diameter", self.diameter), ("length", self.length)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SolidError::InvalidExtent {
                    solid: "vessel",
                    parameter,
                    value,
                }
                .into());
            }
        }
        if self.rings.len() > 2 {
            return Err(SolidError::InvalidProfile(format!(
                "vessel supports at most two stiffening rings, got {}",
                self.rings.len()
            ))
            .into());
        }

        let half = 0.5 * self.length;
        let top = self.top_geometry()?;
        let bottom = self.bottom_geometry()?;

        let body = MakePolycone::new(self.body_profile()?).execute()?;
        let mut vessel = attach_head(body, &top, half, 1.0)?;
        if let Some(bottom) = bottom {
            vessel = attach_head(vessel, &bottom, -half + self.bottom_shift, -1.0)?;
        }

        debug!(
            diameter = self.diameter,
            length = self.length,
            theta_top = top.theta.to_degrees(),
            dz_top = top.dz,
            bottom = bottom.is_some(),
            "vessel built"
        );
        Ok(vessel)
    }

    /// Ordered `(z, 0, r)` planes of the cylinder with ring bumps.
    fn body_profile(&self) -> Result<Vec<ZPlane>> {
        let radius = 0.5 * self.diameter;
        let z0 = -0.5 * self.length + self.bottom_shift;
        let z1 = 0.5 * self.length;

        let mut bands: Vec<Band> = self
            .flange
            .iter()
            .map(|f| (f.z_center, f.height, f.protrusion))
            .chain(self.rings.iter().map(|r| (r.z_center, r.height, r.protrusion)))
            .map(|(zc, h, protrusion)| Band {
                lo: (zc - 0.5 * h).max(z0),
                hi: (zc + 0.5 * h).min(z1),
                protrusion,
            })
            .collect();
        bands.sort_by(|a, b| a.lo.total_cmp(&b.lo));

        for band in &bands {
            if band.hi - band.lo <= 2.0 * PROFILE_EPSILON || band.protrusion < 0.0 {
                return Err(SolidError::InvalidProfile(format!(
                    "ring band [{}, {}] with protrusion {} cannot be built",
                    band.lo, band.hi, band.protrusion
                ))
                .into());
            }
        }
        if let Some(w) = bands.windows(2).find(|w| w[1].lo < w[0].hi) {
            return Err(SolidError::InvalidProfile(format!(
                "ring bands overlap: [{}, {}] and [{}, {}]",
                w[0].lo, w[0].hi, w[1].lo, w[1].hi
            ))
            .into());
        }

        let mut planes = vec![ZPlane::new(z0, 0.0, radius)];
        for band in &bands {
            let outer = radius + band.protrusion;
            let last_z = planes.last().map_or(z0, |p| p.z);
            if band.lo > last_z {
                planes.push(ZPlane::new(band.lo, 0.0, radius));
            }
            planes.push(ZPlane::new(band.lo + PROFILE_EPSILON, 0.0, outer));
            planes.push(ZPlane::new(band.hi - PROFILE_EPSILON, 0.0, outer));
            planes.push(ZPlane::new(band.hi, 0.0, radius));
        }
        if planes.last().map_or(true, |p| p.z < z1) {
            planes.push(ZPlane::new(z1, 0.0, radius));
        }
        Ok(planes)
    }
}

/// Unions the knuckle torus and the spherical cap of one head onto `body`.
///
/// `z_end` is where the head meets the cylinder; `side` is `+1` for a head
/// facing `+z` and `-1` for one facing `-z`.
fn attach_head(body: Solid, head: &HeadGeometry, z_end: f64, side: f64) -> Result<Solid> {
    let cap = if side > 0.0 {
        MakeSphere::new(0.0, head.r0).with_theta(0.0, head.theta)
    } else {
        MakeSphere::new(0.0, head.r0).with_theta(PI - head.theta, head.theta)
    }
    .execute()?;
    let body = if head.is_hemispherical() {
        body
    } else {
        Union::new(body, MakeTorus::new(0.0, head.r1, head.rc0).execute()?)
            .with_transform(Transform::translation(0.0, 0.0, z_end))
            .execute()
    };
    Ok(Union::new(body, cap)
        .with_transform(Transform::translation(0.0, 0.0, z_end - side * head.dz))
        .execute())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, DEG};
    use crate::operations::boolean::{classify_point_in_solid, PointClassification};
    use crate::operations::query::BoundingBox;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn reference_head() {
        let g = HeadGeometry::solve(815.0, HeadSpec::new(1309.0, 256.0)).unwrap();
        assert_relative_eq!(g.rc0, 559.0);
        assert_relative_eq!(g.dr0, 1053.0);
        assert_relative_eq!(g.theta.to_degrees(), 32.063_863_786_038_49, epsilon = 1e-9);
        assert_relative_eq!(g.dz, 892.372_119_689_986_7, epsilon = 1e-9);
        assert_relative_eq!(g.cap_height(), 416.627_880_310_013_3, epsilon = 1e-9);
    }

    #[test]
    fn knuckle_meets_cap_without_gap() {
        for (radius, r0, r1, corr) in [
            (815.0, 1309.0, 256.0, 0.0),
            (815.0, 1309.0, 256.0, 5.0),
            (500.0, 1000.0, 100.0, 0.0),
            (700.0, 700.0, 80.0, 0.0),
        ] {
            let g = HeadGeometry::solve(radius, HeadSpec::new(r0, r1).with_correction(corr)).unwrap();
            assert!(g.theta > 0.0 && g.theta <= 90.0 * DEG + 1e-12);
            let rj = g.junction_radius();
            let from_knuckle = g.knuckle_z(rj).unwrap();
            let from_cap = g.cap_z(rj).unwrap();
            assert_relative_eq!(from_knuckle, from_cap, epsilon = 1e-6 * 2.0 * radius);
        }
    }

    #[test]
    fn degenerate_heads_fail() {
        // R0 == R1 on a wider cylinder leaves the crown nothing to close
        assert!(HeadGeometry::solve(815.0, HeadSpec::new(256.0, 256.0)).is_err());
        assert!(HeadGeometry::solve(815.0, HeadSpec::new(-1309.0, 256.0)).is_err());
        // knuckle larger than the cylinder
        assert!(HeadGeometry::solve(815.0, HeadSpec::new(1309.0, 900.0)).is_err());
        // crown too small for the cylinder
        assert!(HeadGeometry::solve(815.0, HeadSpec::new(500.0, 100.0)).is_err());
    }

    #[test]
    fn hemispherical_head_is_the_limit_of_the_formula() {
        let exact = HeadGeometry::solve(815.0, HeadSpec::new(815.0, 815.0)).unwrap();
        let near = HeadGeometry::solve(815.0, HeadSpec::new(815.0, 814.999)).unwrap();
        assert!(exact.is_hemispherical());
        assert_relative_eq!(exact.theta, 90.0 * DEG);
        assert_relative_eq!(exact.dz, 0.0);
        assert_relative_eq!(exact.theta, near.theta, epsilon = 1e-9);
        assert_relative_eq!(exact.dz, near.dz, epsilon = 1e-9);
        assert_relative_eq!(exact.cap_height(), 815.0);
        assert_relative_eq!(exact.knuckle_z(400.0).unwrap(), exact.cap_z(400.0).unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn hemispherical_vessel_volume() {
        let (radius, length) = (500.0, 1000.0);
        let vessel = MakeVessel::new(2.0 * radius, length, HeadSpec::new(radius, radius))
            .execute()
            .unwrap();
        let bb = BoundingBox::new(&vessel).execute();
        assert_relative_eq!(bb.max.z, 0.5 * length + radius, epsilon = 1e-9);
        let expected = PI * radius * radius * length + 2.0 / 3.0 * PI * radius.powi(3);
        let sampled = crate::operations::query::Volume::new(&vessel)
            .with_resolution(100)
            .execute();
        assert_relative_eq!(sampled, expected, max_relative = 0.01);
    }

    #[test]
    fn top_only_vessel_extent() {
        let vessel = MakeVessel::new(1630.0, 1687.0, HeadSpec::new(1309.0, 256.0))
            .execute()
            .unwrap();
        let bb = BoundingBox::new(&vessel).execute();
        assert_relative_eq!(bb.max.z, 1260.127_880_310_013_3, epsilon = 0.01);
        assert_relative_eq!(bb.min.z, -843.5, epsilon = 1e-9);
        assert_eq!(classify_point_in_solid(&p(0.0, 0.0, 1250.0), &vessel), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&p(0.0, 0.0, 1270.0), &vessel), PointClassification::Outside);
        assert_eq!(classify_point_in_solid(&p(0.0, 0.0, -850.0), &vessel), PointClassification::Outside);
    }

    #[test]
    fn bottom_head_closes_both_ends() {
        let head = HeadSpec::new(1309.0, 256.0);
        let vessel = MakeVessel::new(1630.0, 1687.0, head)
            .with_bottom_head(head)
            .execute()
            .unwrap();
        let bb = BoundingBox::new(&vessel).execute();
        assert_relative_eq!(bb.min.z, -bb.max.z, epsilon = 1e-9);
        assert_eq!(classify_point_in_solid(&p(0.0, 0.0, -1250.0), &vessel), PointClassification::Inside);
    }

    #[test]
    fn flange_and_rings_protrude() {
        let vessel = MakeVessel::new(1000.0, 1000.0, HeadSpec::new(800.0, 100.0))
            .with_flange(Flange {
                z_center: 400.0,
                height: 40.0,
                protrusion: 60.0,
            })
            .with_stiffening_ring(StiffeningRing {
                z_center: 0.0,
                height: 20.0,
                protrusion: 15.0,
            })
            .execute()
            .unwrap();
        assert_eq!(classify_point_in_solid(&p(530.0, 0.0, 400.0), &vessel), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&p(530.0, 0.0, 450.0), &vessel), PointClassification::Outside);
        assert_eq!(classify_point_in_solid(&p(0.0, 510.0, 0.0), &vessel), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&p(0.0, 510.0, 100.0), &vessel), PointClassification::Outside);
    }

    #[test]
    fn overlapping_rings_fail() {
        let result = MakeVessel::new(1000.0, 1000.0, HeadSpec::new(800.0, 100.0))
            .with_stiffening_ring(StiffeningRing {
                z_center: 0.0,
                height: 40.0,
                protrusion: 15.0,
            })
            .with_stiffening_ring(StiffeningRing {
                z_center: 10.0,
                height: 40.0,
                protrusion: 15.0,
            })
            .execute();
        assert!(result.is_err());
    }

    #[test]
    fn flange_at_body_end_keeps_profile_monotonic() {
        let vessel = MakeVessel::new(1000.0, 1000.0, HeadSpec::new(800.0, 100.0))
            .with_flange(Flange {
                z_center: 490.0,
                height: 20.0,
                protrusion: 30.0,
            });
        let planes = vessel.body_profile().unwrap();
        assert!(planes.windows(2).all(|w| w[1].z > w[0].z));
        assert_relative_eq!(planes.last().unwrap().z, 500.0);
    }
}
