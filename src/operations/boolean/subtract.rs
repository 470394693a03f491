use std::sync::Arc;

use crate::math::Transform;
use crate::solid::{BooleanOp, Solid};

use super::combine;

/// Computes the boolean subtraction (A − B) of two solids.
pub struct Subtract {
    solid_a: Arc<Solid>,
    solid_b: Arc<Solid>,
    transform: Transform,
}

impl Subtract {
    /// Creates a new `Subtract` operation (A − B).
    #[must_use]
    pub fn new(solid_a: impl Into<Arc<Solid>>, solid_b: impl Into<Arc<Solid>>) -> Self {
        Self {
            solid_a: solid_a.into(),
            solid_b: solid_b.into(),
            transform: Transform::identity(),
        }
    }

    /// Places the tool `b` inside the frame of `a` before subtracting.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Executes the subtraction.
    #[must_use]
    pub fn execute(&self) -> Solid {
        combine(
            Arc::clone(&self.solid_a),
            Arc::clone(&self.solid_b),
            BooleanOp::Subtraction,
            self.transform,
        )
    }
}
