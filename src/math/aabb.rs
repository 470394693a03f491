use super::{Point3, Transform, Vector3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a box from two corners.
    #[must_use]
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// A box centred on the origin with the given half-extents.
    #[must_use]
    pub fn centered(hx: f64, hy: f64, hz: f64) -> Self {
        Self::new(Point3::new(-hx, -hy, -hz), Point3::new(hx, hy, hz))
    }

    /// Returns `true` when the box encloses no volume.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y || self.min.z >= self.max.z
    }

    /// Edge lengths along x, y, z.
    #[must_use]
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    /// Volume of the box (zero when empty).
    #[must_use]
    pub fn volume(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Smallest box containing both.
    #[must_use]
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Overlap region; may be empty.
    #[must_use]
    pub fn intersection(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.sup(&other.min), self.max.inf(&other.max))
    }

    /// Returns `true` when the interiors overlap by more than `tol` on every axis.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb, tol: f64) -> bool {
        let i = self.intersection(other);
        i.max.x - i.min.x > tol && i.max.y - i.min.y > tol && i.max.z - i.min.z > tol
    }

    /// Returns `true` when `point` lies inside or on the box.
    #[must_use]
    pub fn contains(&self, point: &Point3) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }

    /// The eight corners.
    #[must_use]
    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Bounding box of this box after a rigid transform.
    #[must_use]
    pub fn transformed(&self, transform: &Transform) -> Aabb {
        let corners = self.corners().map(|c| transform.transform_point(&c));
        let mut out = Aabb::new(corners[0], corners[0]);
        for c in &corners[1..] {
            out.min = out.min.inf(c);
            out.max = out.max.sup(c);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::DEG;
    use approx::assert_relative_eq;

    #[test]
    fn merge_and_intersection() {
        let a = Aabb::centered(1.0, 1.0, 1.0);
        let b = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(a.merge(&b).volume(), 27.0);
        assert_relative_eq!(a.intersection(&b).volume(), 1.0);
        assert!(a.overlaps(&b, 1e-9));
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = Aabb::centered(1.0, 1.0, 1.0);
        let b = a.transformed(&Transform::translation(2.0, 0.0, 0.0));
        assert!(!a.overlaps(&b, 1e-9));
    }

    #[test]
    fn rotated_box_grows() {
        let a = Aabb::centered(1.0, 1.0, 1.0);
        let r = a.transformed(&Transform::rotation_z(45.0 * DEG));
        assert_relative_eq!(r.max.x, 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(r.max.z, 1.0, epsilon = 1e-12);
    }
}
