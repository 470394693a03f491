use std::f64::consts::{FRAC_PI_2, PI};

use crate::math::{Point2, Point3, TOLERANCE, TWO_PI};
use crate::solid::{BooleanOp, PhiSegment, Solid, ThetaSegment, ZPlane};

/// Classification of a point relative to a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClassification {
    Inside,
    Outside,
    OnBoundary,
}

/// Classifies a point given in the local frame of `solid`.
#[must_use]
pub fn classify_point_in_solid(point: &Point3, solid: &Solid) -> PointClassification {
    let margin = signed_margin(solid, point);
    if margin < -TOLERANCE {
        PointClassification::Inside
    } else if margin > TOLERANCE {
        PointClassification::Outside
    } else {
        PointClassification::OnBoundary
    }
}

/// Signed margin of `point` with respect to `solid`.
///
/// Negative inside, positive outside, zero on the surface. The magnitude is
/// a distance estimate (exact near flat faces) that is good enough to pick a
/// tolerance band; only the sign is relied upon. Boolean nodes combine the
/// margins of their operands with `min` / `max`, which keeps the sign exact.
#[must_use]
pub fn signed_margin(solid: &Solid, point: &Point3) -> f64 {
    let p = point;
    match solid {
        Solid::Box { hx, hy, hz } => box_margin(p, *hx, *hy, *hz),
        Solid::Tube { rmin, rmax, hz, phi } => {
            let r = p.x.hypot(p.y);
            shell_margin(r, *rmin, *rmax)
                .max(p.z.abs() - hz)
                .max(phi_margin(p, *phi))
        }
        Solid::Cone {
            rmin1,
            rmax1,
            rmin2,
            rmax2,
            hz,
            phi,
        } => {
            let r = p.x.hypot(p.y);
            let t = ((p.z + hz) / (2.0 * hz)).clamp(0.0, 1.0);
            let outer_slope = (rmax2 - rmax1) / (2.0 * hz);
            let inner_slope = (rmin2 - rmin1) / (2.0 * hz);
            let rmax_z = rmax1 + (rmax2 - rmax1) * t;
            let rmin_z = rmin1 + (rmin2 - rmin1) * t;
            let mut radial = (r - rmax_z) / outer_slope.hypot(1.0);
            if rmin_z > 0.0 {
                radial = radial.max((rmin_z - r) / inner_slope.hypot(1.0));
            }
            radial.max(p.z.abs() - hz).max(phi_margin(p, *phi))
        }
        Solid::Sphere {
            rmin,
            rmax,
            phi,
            theta,
        } => {
            let rho = p.coords.norm();
            shell_margin(rho, *rmin, *rmax)
                .max(theta_margin(p, rho, *theta))
                .max(phi_margin(p, *phi))
        }
        Solid::Torus {
            rmin,
            rmax,
            rtor,
            phi,
        } => {
            let d = (p.x.hypot(p.y) - rtor).hypot(p.z);
            shell_margin(d, *rmin, *rmax).max(phi_margin(p, *phi))
        }
        Solid::Polycone { planes, phi } => {
            let r = p.x.hypot(p.y);
            profile_margin(planes, r, p.z).max(phi_margin(p, *phi))
        }
        Solid::Polyhedra { sides, planes, phi } => {
            let r = polygonal_radius(p, *sides, *phi);
            profile_margin(planes, r, p.z).max(phi_margin(p, *phi))
        }
        Solid::ExtrudedPolygon { outline, hz } => {
            outline_margin(outline, Point2::new(p.x, p.y)).max(p.z.abs() - hz)
        }
        Solid::Trd {
            dx1,
            dx2,
            dy1,
            dy2,
            dz,
        } => {
            let t = ((p.z + dz) / (2.0 * dz)).clamp(0.0, 1.0);
            let hx = dx1 + (dx2 - dx1) * t;
            let hy = dy1 + (dy2 - dy1) * t;
            (p.x.abs() - hx)
                .max(p.y.abs() - hy)
                .max(p.z.abs() - dz)
        }
        Solid::Boolean(node) => {
            let ma = signed_margin(&node.a, p);
            let pb = node.transform.inverse_transform_point(p);
            let mb = signed_margin(&node.b, &pb);
            match node.op {
                BooleanOp::Union => ma.min(mb),
                BooleanOp::Intersection => ma.max(mb),
                BooleanOp::Subtraction => ma.max(-mb),
            }
        }
    }
}

fn box_margin(p: &Point3, hx: f64, hy: f64, hz: f64) -> f64 {
    let qx = p.x.abs() - hx;
    let qy = p.y.abs() - hy;
    let qz = p.z.abs() - hz;
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2) + qz.max(0.0).powi(2)).sqrt();
    outside + qx.max(qy).max(qz).min(0.0)
}

/// Radial margin of a shell `rmin..rmax`; a zero `rmin` means solid.
fn shell_margin(r: f64, rmin: f64, rmax: f64) -> f64 {
    let outer = r - rmax;
    if rmin > 0.0 {
        outer.max(rmin - r)
    } else {
        outer
    }
}

/// Margin of the azimuthal wedge, scaled to a length by the radius.
fn phi_margin(p: &Point3, phi: PhiSegment) -> f64 {
    if phi.is_full() {
        return f64::NEG_INFINITY;
    }
    let r = p.x.hypot(p.y);
    let offset = (p.y.atan2(p.x) - phi.start).rem_euclid(TWO_PI);
    if offset <= phi.delta {
        let gap = offset.min(phi.delta - offset);
        -r * gap.min(FRAC_PI_2).sin()
    } else {
        let gap = (offset - phi.delta).min(TWO_PI - offset);
        r * gap.min(FRAC_PI_2).sin()
    }
}

/// Margin of the polar cone pair bounding a sphere section.
fn theta_margin(p: &Point3, rho: f64, theta: ThetaSegment) -> f64 {
    if theta.is_full() || rho <= 0.0 {
        return f64::NEG_INFINITY;
    }
    let polar = (p.z / rho).clamp(-1.0, 1.0).acos();
    let mut margin = f64::NEG_INFINITY;
    if theta.start > 1e-12 {
        margin = margin.max(theta.start - polar);
    }
    if theta.end() < PI - 1e-12 {
        margin = margin.max(polar - theta.end());
    }
    rho * margin.clamp(-FRAC_PI_2, FRAC_PI_2).sin()
}

/// Distance from the axis measured along the normal of the nearest side face.
fn polygonal_radius(p: &Point3, sides: u32, phi: PhiSegment) -> f64 {
    let r = p.x.hypot(p.y);
    let width = phi.delta / f64::from(sides);
    let offset = (p.y.atan2(p.x) - phi.start).rem_euclid(TWO_PI);
    let sector = (offset / width).floor().min(f64::from(sides) - 1.0);
    let centre = (sector + 0.5) * width;
    r * (offset - centre).cos()
}

/// Margin of an ordered `(z, rmin, rmax)` profile at axial position `z`.
///
/// Zero-height segments only mark a step and are skipped; a point on a step
/// takes the wider of the two adjacent segments.
fn profile_margin(planes: &[ZPlane], r: f64, z: f64) -> f64 {
    let (Some(first), Some(last)) = (planes.first(), planes.last()) else {
        return f64::INFINITY;
    };
    let zc = z.clamp(first.z, last.z);
    let mut radial = f64::INFINITY;
    for seg in planes.windows(2) {
        let (lo, hi) = (seg[0], seg[1]);
        if hi.z - lo.z <= 0.0 || zc < lo.z || zc > hi.z {
            continue;
        }
        let t = (zc - lo.z) / (hi.z - lo.z);
        let rmin = lo.rmin + (hi.rmin - lo.rmin) * t;
        let rmax = lo.rmax + (hi.rmax - lo.rmax) * t;
        radial = radial.min(shell_margin(r, rmin, rmax));
    }
    let axial = (first.z - z).max(z - last.z);
    radial.max(axial)
}

fn outline_margin(outline: &[Point2], q: Point2) -> f64 {
    let n = outline.len();
    let mut distance = f64::INFINITY;
    let mut inside = false;
    for i in 0..n {
        let a = outline[i];
        let b = outline[(i + 1) % n];
        let ab = b - a;
        let aq = q - a;
        let len2 = ab.norm_squared();
        let t = if len2 > 0.0 {
            (aq.dot(&ab) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        distance = distance.min((aq - ab * t).norm());
        if (a.y > q.y) != (b.y > q.y) {
            let x_cross = a.x + (q.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if q.x < x_cross {
                inside = !inside;
            }
        }
    }
    if inside {
        -distance
    } else {
        distance
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Transform, DEG};
    use crate::operations::boolean::{Subtract, Union};
    use crate::operations::creation::{
        MakeBox, MakeExtrudedPolygon, MakePolycone, MakePolyhedra, MakeSphere, MakeTorus, MakeTube,
    };
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn box_classification() {
        let b = MakeBox::new(1.0, 2.0, 3.0).execute().unwrap();
        assert_eq!(classify_point_in_solid(&p(0.0, 0.0, 0.0), &b), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&p(1.0, 0.0, 0.0), &b), PointClassification::OnBoundary);
        assert_eq!(classify_point_in_solid(&p(0.0, 2.5, 0.0), &b), PointClassification::Outside);
        assert_relative_eq!(signed_margin(&b, &p(0.0, 0.0, 5.0)), 2.0);
    }

    #[test]
    fn hollow_tube_excludes_bore() {
        let t = MakeTube::new(2.0, 3.0, 1.0).execute().unwrap();
        assert_eq!(classify_point_in_solid(&p(0.0, 0.0, 0.0), &t), PointClassification::Outside);
        assert_eq!(classify_point_in_solid(&p(2.5, 0.0, 0.0), &t), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&p(0.0, -2.5, 0.5), &t), PointClassification::Inside);
    }

    #[test]
    fn phi_segment_limits_tube() {
        let t = MakeTube::new(0.0, 3.0, 1.0)
            .with_phi(0.0, 90.0 * DEG)
            .execute()
            .unwrap();
        assert_eq!(classify_point_in_solid(&p(1.0, 1.0, 0.0), &t), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&p(-1.0, 1.0, 0.0), &t), PointClassification::Outside);
        assert_eq!(classify_point_in_solid(&p(1.0, -1.0, 0.0), &t), PointClassification::Outside);
    }

    #[test]
    fn dome_keeps_only_top() {
        let s = MakeSphere::new(0.0, 10.0)
            .with_theta(0.0, 30.0 * DEG)
            .execute()
            .unwrap();
        assert_eq!(classify_point_in_solid(&p(0.0, 0.0, 9.0), &s), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&p(5.0, 0.0, 1.0), &s), PointClassification::Outside);
    }

    #[test]
    fn torus_tube() {
        let t = MakeTorus::new(0.0, 1.0, 5.0).execute().unwrap();
        assert_eq!(classify_point_in_solid(&p(5.0, 0.0, 0.5), &t), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&p(0.0, 0.0, 0.0), &t), PointClassification::Outside);
    }

    #[test]
    fn stepped_polycone() {
        let c = MakePolycone::from_arrays(
            &[-1.0, 0.0, 0.0, 1.0],
            &[0.0, 0.0, 0.0, 0.0],
            &[1.0, 1.0, 2.0, 2.0],
        )
        .execute()
        .unwrap();
        assert_eq!(classify_point_in_solid(&p(1.5, 0.0, 0.5), &c), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&p(1.5, 0.0, -0.5), &c), PointClassification::Outside);
    }

    #[test]
    fn octagon_corner_reaches_beyond_apothem() {
        let planes = vec![ZPlane::new(-1.0, 0.0, 10.0), ZPlane::new(1.0, 0.0, 10.0)];
        let o = MakePolyhedra::new(8, planes).execute().unwrap();
        // Corners sit on the sector boundaries, faces at the sector centres.
        let corner = 10.0 / (22.5 * DEG).cos();
        assert_eq!(classify_point_in_solid(&p(0.99 * corner, 0.0, 0.0), &o), PointClassification::Inside);
        let a = 22.5 * DEG;
        let beyond_face = p(10.5 * a.cos(), 10.5 * a.sin(), 0.0);
        assert_eq!(classify_point_in_solid(&beyond_face, &o), PointClassification::Outside);
    }

    #[test]
    fn l_shaped_extrusion() {
        let outline = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let e = MakeExtrudedPolygon::new(outline, 1.0).execute().unwrap();
        assert_eq!(classify_point_in_solid(&p(0.5, 1.5, 0.0), &e), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&p(1.5, 1.5, 0.0), &e), PointClassification::Outside);
    }

    #[test]
    fn booleans_use_transform_of_second_operand() {
        let a = MakeBox::new(1.0, 1.0, 1.0).execute().unwrap();
        let b = MakeBox::new(1.0, 1.0, 1.0).execute().unwrap();
        let u = Union::new(a.clone(), b.clone())
            .with_transform(Transform::translation(3.0, 0.0, 0.0))
            .execute();
        assert_eq!(classify_point_in_solid(&p(3.0, 0.0, 0.0), &u), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&p(2.0, 0.0, 0.0), &u), PointClassification::OnBoundary);

        let s = Subtract::new(a, b)
            .with_transform(Transform::translation(1.0, 0.0, 0.0))
            .execute();
        assert_eq!(classify_point_in_solid(&p(-0.5, 0.0, 0.0), &s), PointClassification::Inside);
        assert_eq!(classify_point_in_solid(&p(0.5, 0.0, 0.0), &s), PointClassification::Outside);
    }

    #[test]
    fn self_subtraction_has_no_interior() {
        let a = MakeTube::new(1.0, 2.0, 1.0).execute().unwrap();
        let s = Subtract::new(a.clone(), a).execute();
        for q in [p(1.5, 0.0, 0.0), p(0.0, 1.2, 0.9), p(5.0, 0.0, 0.0)] {
            assert_ne!(classify_point_in_solid(&q, &s), PointClassification::Inside);
        }
    }
}
