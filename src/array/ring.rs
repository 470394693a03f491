use crate::math::{Transform, TWO_PI};

use super::ArrayLayout;

/// Coaxial rings stacked downwards along `z`.
///
/// Ring 0 sits at `top_z`. The gap below ring `i` is half a pitch for the
/// first `dense_head` rings and for the last `dense_tail` rings of the stack,
/// a full pitch elsewhere. This reproduces the tighter field-shaper spacing
/// at both ends of the drift region.
#[derive(Debug, Clone, PartialEq)]
pub struct RingStack {
    count: usize,
    top_z: f64,
    pitch: f64,
    dense_head: usize,
    dense_tail: usize,
}

impl RingStack {
    /// A uniformly spaced stack.
    #[must_use]
    pub fn new(count: usize, top_z: f64, pitch: f64) -> Self {
        Self {
            count,
            top_z,
            pitch,
            dense_head: 0,
            dense_tail: 0,
        }
    }

    /// Halves the gap below the first `head` and the last `tail` rings.
    #[must_use]
    pub fn with_dense_ends(mut self, head: usize, tail: usize) -> Self {
        self.dense_head = head;
        self.dense_tail = tail;
        self
    }

    /// The field-shaper layout: five dense gaps at the top, the last three
    /// rings dense at the bottom.
    #[must_use]
    pub fn field_shaper(count: usize, top_z: f64, pitch: f64) -> Self {
        Self::new(count, top_z, pitch).with_dense_ends(5, 3)
    }

    /// Gap between ring `i` and ring `i + 1`.
    #[must_use]
    pub fn gap_below(&self, i: usize) -> f64 {
        if i < self.dense_head || i + self.dense_tail >= self.count {
            0.5 * self.pitch
        } else {
            self.pitch
        }
    }

    /// `z` of ring `index`, unchecked.
    #[must_use]
    pub fn z_of(&self, index: usize) -> f64 {
        self.top_z - (0..index).map(|i| self.gap_below(i)).sum::<f64>()
    }
}

impl ArrayLayout for RingStack {
    fn count(&self) -> usize {
        self.count
    }

    fn locate(&self, index: usize) -> Option<Transform> {
        (index < self.count).then(|| Transform::translation(0.0, 0.0, self.z_of(index)))
    }
}

/// Members spread in azimuth on a circle, each turned to face the axis.
///
/// Member `i` sits at angle `φ = start + i * step` measured from `+y`
/// towards `+x`, at `(r sin φ, r cos φ, z)`, rotated by `-φ` about `z` so
/// that its local `+y` points radially outward.
#[derive(Debug, Clone, PartialEq)]
pub struct AngularArray {
    count: usize,
    radius: f64,
    z: f64,
    start: f64,
    step: f64,
}

impl AngularArray {
    /// `count` members evenly spaced over a full turn.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(count: usize, radius: f64, z: f64) -> Self {
        Self {
            count,
            radius,
            z,
            start: 0.0,
            step: TWO_PI / count.max(1) as f64,
        }
    }

    /// Angle of member 0.
    #[must_use]
    pub fn with_start(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    /// Angular step between members.
    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Azimuth of member `index`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn angle_of(&self, index: usize) -> f64 {
        self.start + index as f64 * self.step
    }
}

impl ArrayLayout for AngularArray {
    fn count(&self) -> usize {
        self.count
    }

    fn locate(&self, index: usize) -> Option<Transform> {
        if index >= self.count {
            return None;
        }
        let phi = self.angle_of(index);
        Some(Transform::rotation_z(-phi).with_translation(
            self.radius * phi.sin(),
            self.radius * phi.cos(),
            self.z,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::array::tests::min_pairwise_distance;
    use crate::math::{Point3, Vector3, DEG};
    use approx::assert_relative_eq;

    #[test]
    fn field_shaper_gaps() {
        let stack = RingStack::field_shaper(72, 0.0, 22.0);
        let z: Vec<f64> = stack.members().unwrap().iter().map(|t| t.translation.z).collect();
        assert_eq!(z.len(), 72);
        for i in 0..5 {
            assert_relative_eq!(z[i] - z[i + 1], 11.0);
        }
        assert_relative_eq!(z[5] - z[6], 22.0);
        assert_relative_eq!(z[68] - z[69], 22.0);
        assert_relative_eq!(z[69] - z[70], 11.0);
        assert_relative_eq!(z[70] - z[71], 11.0);
        // 7 half gaps and 64 full ones
        assert_relative_eq!(z[0] - z[71], 7.0 * 11.0 + 64.0 * 22.0, epsilon = 1e-9);
    }

    #[test]
    fn uniform_stack() {
        let stack = RingStack::new(4, 100.0, 10.0);
        assert_relative_eq!(stack.member(3).unwrap().translation.z, 70.0);
        assert!(stack.member(4).is_err());
        assert_relative_eq!(min_pairwise_distance(&stack), 10.0);
    }

    #[test]
    fn angular_members_face_outward() {
        let array = AngularArray::new(24, 682.0, -5.0);
        assert_eq!(array.count(), 24);
        for i in [0, 1, 6, 17] {
            let t = array.member(i).unwrap();
            let phi = f64::from(u32::try_from(i).unwrap()) * 15.0 * DEG;
            let centre = t.transform_point(&Point3::origin());
            assert_relative_eq!(centre, Point3::new(682.0 * phi.sin(), 682.0 * phi.cos(), -5.0), epsilon = 1e-9);
            let outward = t.transform_vector(&Vector3::y());
            assert_relative_eq!(outward, Vector3::new(phi.sin(), phi.cos(), 0.0), epsilon = 1e-12);
        }
    }

    #[test]
    fn angular_quarter_turn_lands_on_x() {
        let t = AngularArray::new(4, 10.0, 0.0).member(1).unwrap();
        assert_relative_eq!(t.translation, Vector3::new(10.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn angular_members_are_distinct() {
        let array = AngularArray::new(24, 682.0, 0.0);
        assert!(min_pairwise_distance(&array) > 170.0);
    }
}
