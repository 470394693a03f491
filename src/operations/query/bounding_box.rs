use std::f64::consts::{FRAC_PI_2, PI};

use crate::math::{Aabb, Point2, Point3};
use crate::solid::{BooleanOp, PhiSegment, Solid, ThetaSegment};

/// Computes the axis-aligned bounding box of a solid in its local frame.
///
/// Primitive boxes are tight. Boolean nodes are conservative: a union
/// merges both operands, an intersection clips them, a subtraction keeps
/// the box of the first operand.
pub struct BoundingBox<'a> {
    solid: &'a Solid,
}

impl<'a> BoundingBox<'a> {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(solid: &'a Solid) -> Self {
        Self { solid }
    }

    /// Executes the query, returning the AABB.
    #[must_use]
    pub fn execute(&self) -> Aabb {
        bounds(self.solid)
    }
}

fn bounds(solid: &Solid) -> Aabb {
    match solid {
        Solid::Box { hx, hy, hz } => Aabb::centered(*hx, *hy, *hz),
        Solid::Tube { rmin, rmax, hz, phi } => revolved(*rmin, *rmax, -hz, *hz, *phi),
        Solid::Cone {
            rmin1,
            rmax1,
            rmin2,
            rmax2,
            hz,
            phi,
        } => revolved(rmin1.min(*rmin2), rmax1.max(*rmax2), -hz, *hz, *phi),
        Solid::Sphere {
            rmin,
            rmax,
            phi,
            theta,
        } => sphere_bounds(*rmin, *rmax, *phi, *theta),
        Solid::Torus {
            rmax, rtor, phi, ..
        } => revolved(rtor - rmax, rtor + rmax, -rmax, *rmax, *phi),
        Solid::Polycone { planes, phi } => {
            let (z0, z1, rin, rout) = profile_extent(planes);
            revolved(rin, rout, z0, z1, *phi)
        }
        Solid::Polyhedra { sides, planes, phi } => {
            let (z0, z1, _, rout) = profile_extent(planes);
            // apothem to circumradius
            let half_width = 0.5 * phi.delta / f64::from(*sides);
            revolved(0.0, rout / half_width.cos(), z0, z1, *phi)
        }
        Solid::ExtrudedPolygon { outline, hz } => {
            let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
            let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
            for v in outline {
                min = min.inf(v);
                max = max.sup(v);
            }
            Aabb::new(Point3::new(min.x, min.y, -hz), Point3::new(max.x, max.y, *hz))
        }
        Solid::Trd {
            dx1,
            dx2,
            dy1,
            dy2,
            dz,
        } => Aabb::centered(dx1.max(*dx2), dy1.max(*dy2), *dz),
        Solid::Boolean(node) => {
            let a = bounds(&node.a);
            match node.op {
                BooleanOp::Subtraction => a,
                BooleanOp::Union => a.merge(&bounds(&node.b).transformed(&node.transform)),
                BooleanOp::Intersection => {
                    a.intersection(&bounds(&node.b).transformed(&node.transform))
                }
            }
        }
    }
}

/// `(z_min, z_max, smallest rmin, largest rmax)` of a plane list.
fn profile_extent(planes: &[crate::solid::ZPlane]) -> (f64, f64, f64, f64) {
    let z0 = planes.first().map_or(0.0, |p| p.z);
    let z1 = planes.last().map_or(0.0, |p| p.z);
    let rin = planes.iter().map(|p| p.rmin).fold(f64::INFINITY, f64::min);
    let rout = planes.iter().map(|p| p.rmax).fold(0.0, f64::max);
    (z0, z1, rin.min(rout), rout)
}

fn revolved(r_in: f64, r_out: f64, z0: f64, z1: f64, phi: PhiSegment) -> Aabb {
    let (min, max) = sector_bounds(r_in.max(0.0), r_out, phi);
    Aabb::new(Point3::new(min.x, min.y, z0), Point3::new(max.x, max.y, z1))
}

/// Planar bounds of an annular sector.
fn sector_bounds(r_in: f64, r_out: f64, phi: PhiSegment) -> (Point2, Point2) {
    if phi.is_full() {
        return (Point2::new(-r_out, -r_out), Point2::new(r_out, r_out));
    }
    let end = phi.start + phi.delta;
    let mut points = Vec::with_capacity(8);
    for r in [r_in, r_out] {
        for a in [phi.start, end] {
            points.push(Point2::new(r * a.cos(), r * a.sin()));
        }
    }
    let mut a = (phi.start / FRAC_PI_2).ceil() * FRAC_PI_2;
    while a <= end {
        points.push(Point2::new(r_out * a.cos(), r_out * a.sin()));
        a += FRAC_PI_2;
    }
    let mut min = points[0];
    let mut max = points[0];
    for q in &points[1..] {
        min = min.inf(q);
        max = max.sup(q);
    }
    (min, max)
}

fn sphere_bounds(rmin: f64, rmax: f64, phi: PhiSegment, theta: ThetaSegment) -> Aabb {
    let (t0, t1) = (theta.start, theta.end());
    let z_top = if t0.cos() >= 0.0 { rmax * t0.cos() } else { rmin * t0.cos() };
    let z_bottom = if t1.cos() <= 0.0 { rmax * t1.cos() } else { rmin * t1.cos() };
    let sin_max = if t0 <= FRAC_PI_2 && t1 >= FRAC_PI_2 {
        1.0
    } else {
        t0.sin().max(t1.sin())
    };
    let sin_min = if t0 <= 0.0 || t1 >= PI { 0.0 } else { t0.sin().min(t1.sin()) };
    revolved(rmin * sin_min, rmax * sin_max, z_bottom, z_top, phi)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Transform, DEG};
    use crate::operations::boolean::{Intersect, Subtract, Union};
    use crate::operations::creation::{MakeBox, MakeSphere, MakeTorus, MakeTube};
    use approx::assert_relative_eq;

    #[test]
    fn quarter_tube_is_tight() {
        let t = MakeTube::new(1.0, 2.0, 3.0)
            .with_phi(0.0, 90.0 * DEG)
            .execute()
            .unwrap();
        let bb = BoundingBox::new(&t).execute();
        assert_relative_eq!(bb.min.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(bb.min.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(bb.max.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(bb.max.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(bb.max.z, 3.0);
    }

    #[test]
    fn dome_bounds() {
        let s = MakeSphere::new(0.0, 10.0)
            .with_theta(0.0, 60.0 * DEG)
            .execute()
            .unwrap();
        let bb = BoundingBox::new(&s).execute();
        assert_relative_eq!(bb.max.z, 10.0);
        assert_relative_eq!(bb.min.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(bb.max.x, 10.0 * (60.0 * DEG).sin(), epsilon = 1e-12);
    }

    #[test]
    fn torus_bounds() {
        let t = MakeTorus::new(0.0, 1.0, 5.0).execute().unwrap();
        let bb = BoundingBox::new(&t).execute();
        assert_relative_eq!(bb.max.x, 6.0);
        assert_relative_eq!(bb.max.z, 1.0);
    }

    #[test]
    fn boolean_bounds() {
        let a = MakeBox::new(1.0, 1.0, 1.0).execute().unwrap();
        let shift = Transform::translation(1.5, 0.0, 0.0);
        let u = Union::new(a.clone(), a.clone()).with_transform(shift).execute();
        assert_relative_eq!(BoundingBox::new(&u).execute().max.x, 2.5);
        let i = Intersect::new(a.clone(), a.clone()).with_transform(shift).execute();
        let bb = BoundingBox::new(&i).execute();
        assert_relative_eq!(bb.min.x, 0.5);
        assert_relative_eq!(bb.max.x, 1.0);
        let s = Subtract::new(a.clone(), a.clone()).with_transform(shift).execute();
        assert_eq!(BoundingBox::new(&s).execute(), Aabb::centered(1.0, 1.0, 1.0));
    }

    #[test]
    fn identity_transform_leaves_bounds_unchanged() {
        let a = MakeBox::new(1.0, 2.0, 3.0).execute().unwrap();
        let b = MakeTube::new(0.0, 2.5, 1.0).execute().unwrap();
        let plain = Union::new(a.clone(), b.clone()).execute();
        let explicit = Union::new(a, b).with_transform(Transform::identity()).execute();
        assert_eq!(BoundingBox::new(&plain).execute(), BoundingBox::new(&explicit).execute());
    }
}
