use std::f64::consts::PI;

use crate::math::{Aabb, Point3, Vector3, TOLERANCE};
use crate::operations::boolean::signed_margin;
use crate::operations::creation::signed_area;
use crate::solid::{BooleanOp, BooleanSolid, Solid, ZPlane};

use super::BoundingBox;

/// Cells per axis used when a solid has to be sampled.
pub const DEFAULT_RESOLUTION: usize = 64;

/// Computes the volume of a solid.
///
/// Primitives use closed-form expressions, as does a box with a primitive
/// cavity fully inside it. Other boolean trees are sampled: the
/// bounding box is split into `resolution³` cells and every cell whose centre
/// lies strictly inside contributes its full volume. Sampling is
/// deterministic, so the same solid always yields the same figure.
pub struct Volume<'a> {
    solid: &'a Solid,
    resolution: usize,
    force_sampling: bool,
}

impl<'a> Volume<'a> {
    /// Creates a new `Volume` query with the default resolution.
    #[must_use]
    pub fn new(solid: &'a Solid) -> Self {
        Self {
            solid,
            resolution: DEFAULT_RESOLUTION,
            force_sampling: false,
        }
    }

    /// Sets the number of sampling cells per axis.
    #[must_use]
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution.max(1);
        self
    }

    /// Samples even when a closed form exists.
    #[must_use]
    pub fn sampled(mut self) -> Self {
        self.force_sampling = true;
        self
    }

    /// Executes the query, returning the volume in mm³.
    #[must_use]
    pub fn execute(&self) -> f64 {
        if self.force_sampling {
            return sample(self.solid, self.resolution);
        }
        exact(self.solid).unwrap_or_else(|| sample(self.solid, self.resolution))
    }
}

fn exact(solid: &Solid) -> Option<f64> {
    let v = match solid {
        Solid::Box { hx, hy, hz } => 8.0 * hx * hy * hz,
        Solid::Tube { rmin, rmax, hz, phi } => {
            phi.fraction() * PI * (rmax * rmax - rmin * rmin) * 2.0 * hz
        }
        Solid::Cone {
            rmin1,
            rmax1,
            rmin2,
            rmax2,
            hz,
            phi,
        } => phi.fraction() * (frustum(*rmax1, *rmax2, 2.0 * hz) - frustum(*rmin1, *rmin2, 2.0 * hz)),
        Solid::Sphere {
            rmin,
            rmax,
            phi,
            theta,
        } => {
            phi.fraction()
                * (2.0 * PI / 3.0)
                * (rmax.powi(3) - rmin.powi(3))
                * (theta.start.cos() - theta.end().cos())
        }
        Solid::Torus {
            rmin,
            rmax,
            rtor,
            phi,
        } => phi.fraction() * 2.0 * PI * rtor * PI * (rmax * rmax - rmin * rmin),
        Solid::Polycone { planes, phi } => {
            let v: f64 = profile_segments(planes)
                .map(|(lo, hi)| {
                    let h = hi.z - lo.z;
                    frustum(lo.rmax, hi.rmax, h) - frustum(lo.rmin, hi.rmin, h)
                })
                .sum();
            phi.fraction() * v
        }
        Solid::Polyhedra { sides, planes, phi } => {
            let n = f64::from(*sides);
            let k = n * (0.5 * phi.delta / n).tan();
            profile_segments(planes)
                .map(|(lo, hi)| {
                    let h = hi.z - lo.z;
                    k * (squared_mean(lo.rmax, hi.rmax) - squared_mean(lo.rmin, hi.rmin)) * h
                })
                .sum()
        }
        Solid::ExtrudedPolygon { outline, hz } => signed_area(outline).abs() * 2.0 * hz,
        Solid::Trd {
            dx1,
            dx2,
            dy1,
            dy2,
            dz,
        } => {
            let (ax, bx) = (*dx1, dx2 - dx1);
            let (ay, by) = (*dy1, dy2 - dy1);
            8.0 * dz * (ax * ay + 0.5 * (ax * by + ay * bx) + bx * by / 3.0)
        }
        Solid::Boolean(boolean) => return cavity(boolean),
    };
    Some(v)
}

/// `a − b` with `a` a box that fully encloses `b` is exact.
fn cavity(boolean: &BooleanSolid) -> Option<f64> {
    let Solid::Box { hx, hy, hz } = *boolean.a else {
        return None;
    };
    if boolean.op != BooleanOp::Subtraction {
        return None;
    }
    let inner = BoundingBox::new(&boolean.b).execute().transformed(&boolean.transform);
    let slack = Vector3::repeat(TOLERANCE);
    let outer = Aabb::centered(hx, hy, hz);
    let enclosed = outer.contains(&(inner.min + slack)) && outer.contains(&(inner.max - slack));
    if !enclosed {
        return None;
    }
    Some(8.0 * hx * hy * hz - exact(&boolean.b)?)
}

/// Segments of a profile with non-zero height.
fn profile_segments(planes: &[ZPlane]) -> impl Iterator<Item = (ZPlane, ZPlane)> + '_ {
    planes
        .windows(2)
        .map(|w| (w[0], w[1]))
        .filter(|(lo, hi)| hi.z > lo.z)
}

/// Mean of `r²` for a radius varying linearly between `a` and `b`.
fn squared_mean(a: f64, b: f64) -> f64 {
    (a * a + a * b + b * b) / 3.0
}

fn frustum(r1: f64, r2: f64, h: f64) -> f64 {
    PI * h * squared_mean(r1, r2)
}

#[allow(clippy::cast_precision_loss)]
fn sample(solid: &Solid, resolution: usize) -> f64 {
    let bb = BoundingBox::new(solid).execute();
    if bb.is_empty() {
        return 0.0;
    }
    let n = resolution.max(1);
    let steps = n as f64;
    let size = bb.size();
    let cell = size / steps;
    let mut inside = 0_usize;
    for i in 0..n {
        let x = bb.min.x + (i as f64 + 0.5) * cell.x;
        for j in 0..n {
            let y = bb.min.y + (j as f64 + 0.5) * cell.y;
            for k in 0..n {
                let z = bb.min.z + (k as f64 + 0.5) * cell.z;
                if signed_margin(solid, &Point3::new(x, y, z)) < 0.0 {
                    inside += 1;
                }
            }
        }
    }
    let count = inside as f64;
    count * cell.x * cell.y * cell.z
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Transform, DEG};
    use crate::operations::boolean::{Subtract, Union};
    use crate::operations::creation::{MakeBox, MakeCone, MakePolycone, MakeSphere, MakeTrd, MakeTube};
    use approx::assert_relative_eq;

    #[test]
    fn primitive_volumes() {
        let b = MakeBox::new(1.0, 2.0, 3.0).execute().unwrap();
        assert_relative_eq!(Volume::new(&b).execute(), 48.0);
        let t = MakeTube::new(1.0, 2.0, 0.5).execute().unwrap();
        assert_relative_eq!(Volume::new(&t).execute(), 3.0 * PI);
        let s = MakeSphere::new(0.0, 3.0).execute().unwrap();
        assert_relative_eq!(Volume::new(&s).execute(), 36.0 * PI, epsilon = 1e-9);
        let c = MakeCone::new(0.0, 3.0, 0.0, 0.0, 1.0).execute().unwrap();
        assert_relative_eq!(Volume::new(&c).execute(), 6.0 * PI);
    }

    #[test]
    fn half_sphere_by_theta() {
        let s = MakeSphere::new(0.0, 3.0)
            .with_theta(0.0, 90.0 * DEG)
            .execute()
            .unwrap();
        assert_relative_eq!(Volume::new(&s).execute(), 18.0 * PI, epsilon = 1e-9);
    }

    #[test]
    fn polycone_matches_tube() {
        let c = MakePolycone::from_arrays(&[-1.0, 1.0], &[1.0, 1.0], &[2.0, 2.0])
            .execute()
            .unwrap();
        let t = MakeTube::new(1.0, 2.0, 1.0).execute().unwrap();
        assert_relative_eq!(Volume::new(&c).execute(), Volume::new(&t).execute());
    }

    #[test]
    fn wedge_trd() {
        let w = MakeTrd::new(1.0, 1.0, 1.0, 0.0, 1.0).execute().unwrap();
        // 2 wide, 2 tall, triangular 2 -> 0 depth
        assert_relative_eq!(Volume::new(&w).execute(), 4.0);
    }

    #[test]
    fn sampling_approaches_exact() {
        let t = MakeTube::new(0.0, 10.0, 5.0).execute().unwrap();
        let exact = Volume::new(&t).execute();
        let sampled = Volume::new(&t).with_resolution(80).sampled().execute();
        assert_relative_eq!(sampled, exact, max_relative = 0.01);
    }

    #[test]
    fn enclosed_cavity_is_exact() {
        let outer = MakeBox::new(80.0, 60.0, 500.0).execute().unwrap();
        let bore = MakeTube::new(0.0, 20.0, 500.0).execute().unwrap();
        let s = Subtract::new(outer, bore)
            .with_transform(Transform::translation(30.0, -10.0, 0.0))
            .execute();
        let expected = 8.0 * 80.0 * 60.0 * 500.0 - PI * 400.0 * 1000.0;
        assert_relative_eq!(Volume::new(&s).execute(), expected, max_relative = 1e-12);

        // a cavity reaching out of the box is sampled
        let outer = MakeBox::new(10.0, 10.0, 10.0).execute().unwrap();
        let notch = MakeBox::new(5.0, 5.0, 5.0).execute().unwrap();
        let s = Subtract::new(outer, notch)
            .with_transform(Transform::translation(10.0, 0.0, 0.0))
            .execute();
        assert_relative_eq!(Volume::new(&s).with_resolution(40).execute(), 7500.0, max_relative = 1e-9);
    }

    #[test]
    fn self_subtraction_is_empty() {
        let t = MakeTube::new(1.0, 2.0, 1.0).execute().unwrap();
        let s = Subtract::new(t.clone(), t).execute();
        assert_relative_eq!(Volume::new(&s).with_resolution(20).execute(), 0.0);
    }

    #[test]
    fn union_is_at_least_each_operand() {
        let a = MakeBox::new(10.0, 10.0, 10.0).execute().unwrap();
        let u = Union::new(a.clone(), a.clone())
            .with_transform(Transform::translation(10.0, 0.0, 0.0))
            .execute();
        let v = Volume::new(&u).with_resolution(30).execute();
        assert_relative_eq!(v, 12000.0, max_relative = 1e-9);
        assert!(v >= Volume::new(&a).execute());
    }
}
