use super::{Matrix4, Point3, Rotation3, Vector3};

/// A rigid transform: rotation followed by translation.
///
/// The transform is active: a point expressed in the local frame of a child
/// maps to `rotation * p + translation` in the frame of its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Rotation applied first.
    pub rotation: Rotation3,
    /// Translation applied after the rotation.
    pub translation: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: Rotation3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Creates a transform from a rotation and a translation.
    #[must_use]
    pub fn new(rotation: Rotation3, translation: Vector3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// A pure translation.
    #[must_use]
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::new(Rotation3::identity(), Vector3::new(x, y, z))
    }

    /// A pure translation by `v`.
    #[must_use]
    pub fn from_vector(v: Vector3) -> Self {
        Self::new(Rotation3::identity(), v)
    }

    /// A pure rotation about the x axis.
    #[must_use]
    pub fn rotation_x(angle: f64) -> Self {
        Self::new(Rotation3::from_axis_angle(&Vector3::x_axis(), angle), Vector3::zeros())
    }

    /// A pure rotation about the y axis.
    #[must_use]
    pub fn rotation_y(angle: f64) -> Self {
        Self::new(Rotation3::from_axis_angle(&Vector3::y_axis(), angle), Vector3::zeros())
    }

    /// A pure rotation about the z axis.
    #[must_use]
    pub fn rotation_z(angle: f64) -> Self {
        Self::new(Rotation3::from_axis_angle(&Vector3::z_axis(), angle), Vector3::zeros())
    }

    /// Returns a copy with the translation replaced.
    #[must_use]
    pub fn with_translation(mut self, x: f64, y: f64, z: f64) -> Self {
        self.translation = Vector3::new(x, y, z);
        self
    }

    /// Composition `self ∘ inner`: applies `inner` first, then `self`.
    #[must_use]
    pub fn compose(&self, inner: &Transform) -> Transform {
        Transform {
            rotation: self.rotation * inner.rotation,
            translation: self.rotation * inner.translation + self.translation,
        }
    }

    /// Applies `self` first, then `outer`.
    #[must_use]
    pub fn then(&self, outer: &Transform) -> Transform {
        outer.compose(self)
    }

    /// The inverse transform.
    #[must_use]
    pub fn inverse(&self) -> Transform {
        let rotation = self.rotation.inverse();
        Transform {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    /// Maps a point from the local frame into the parent frame.
    #[must_use]
    pub fn transform_point(&self, point: &Point3) -> Point3 {
        self.rotation * *point + self.translation
    }

    /// Maps a point from the parent frame into the local frame.
    #[must_use]
    pub fn inverse_transform_point(&self, point: &Point3) -> Point3 {
        self.rotation.inverse() * (*point - self.translation)
    }

    /// Rotates a direction (translation is ignored).
    #[must_use]
    pub fn transform_vector(&self, vector: &Vector3) -> Vector3 {
        self.rotation * *vector
    }

    /// Returns `true` if this is the identity within `tol`.
    #[must_use]
    pub fn is_identity(&self, tol: f64) -> bool {
        self.translation.norm() <= tol
            && (self.rotation.matrix() - Rotation3::identity().matrix()).abs().max() <= tol
    }

    /// Homogeneous 4x4 matrix of this transform.
    #[must_use]
    pub fn to_matrix(&self) -> Matrix4 {
        let mut m = self.rotation.to_homogeneous();
        m[(0, 3)] = self.translation.x;
        m[(1, 3)] = self.translation.y;
        m[(2, 3)] = self.translation.z;
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::DEG;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn rotation_then_translation() {
        let t = Transform::rotation_z(90.0 * DEG).with_translation(10.0, 0.0, 0.0);
        let q = t.transform_point(&p(1.0, 0.0, 0.0));
        assert_relative_eq!(q, p(10.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn inverse_round_trips() {
        let t = Transform::rotation_x(30.0 * DEG).with_translation(1.0, -2.0, 3.0);
        let q = p(4.0, 5.0, -6.0);
        let back = t.inverse().transform_point(&t.transform_point(&q));
        assert_relative_eq!(back, q, epsilon = 1e-12);
        assert_relative_eq!(t.inverse_transform_point(&t.transform_point(&q)), q, epsilon = 1e-12);
    }

    #[test]
    fn compose_applies_inner_first() {
        let inner = Transform::translation(1.0, 0.0, 0.0);
        let outer = Transform::rotation_z(90.0 * DEG);
        let q = outer.compose(&inner).transform_point(&p(0.0, 0.0, 0.0));
        assert_relative_eq!(q, p(0.0, 1.0, 0.0), epsilon = 1e-12);
        let q2 = inner.then(&outer).transform_point(&p(0.0, 0.0, 0.0));
        assert_relative_eq!(q2, q, epsilon = 1e-12);
    }

    #[test]
    fn matrix_matches_point_transform() {
        let t = Transform::rotation_y(45.0 * DEG).with_translation(0.5, 0.25, -1.0);
        let m = t.to_matrix();
        let v = m * nalgebra::Vector4::new(1.0, 2.0, 3.0, 1.0);
        let q = t.transform_point(&p(1.0, 2.0, 3.0));
        assert_relative_eq!(v.x, q.x, epsilon = 1e-12);
        assert_relative_eq!(v.y, q.y, epsilon = 1e-12);
        assert_relative_eq!(v.z, q.z, epsilon = 1e-12);
    }

    #[test]
    fn identity_detection() {
        assert!(Transform::identity().is_identity(1e-12));
        assert!(!Transform::translation(0.0, 0.0, 1e-3).is_identity(1e-6));
    }
}
