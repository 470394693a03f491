use std::sync::Arc;

use crate::math::Transform;
use crate::solid::{BooleanOp, Solid};

use super::combine;

/// Computes the boolean intersection of two solids.
pub struct Intersect {
    solid_a: Arc<Solid>,
    solid_b: Arc<Solid>,
    transform: Transform,
}

impl Intersect {
    /// Creates a new `Intersect` operation.
    #[must_use]
    pub fn new(solid_a: impl Into<Arc<Solid>>, solid_b: impl Into<Arc<Solid>>) -> Self {
        Self {
            solid_a: solid_a.into(),
            solid_b: solid_b.into(),
            transform: Transform::identity(),
        }
    }

    /// Places `b` inside the frame of `a` before intersecting.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Executes the intersection.
    #[must_use]
    pub fn execute(&self) -> Solid {
        combine(
            Arc::clone(&self.solid_a),
            Arc::clone(&self.solid_b),
            BooleanOp::Intersection,
            self.transform,
        )
    }
}
