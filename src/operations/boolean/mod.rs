mod classify;
mod intersect_op;
mod subtract;
mod union;

use std::sync::Arc;

pub use classify::{classify_point_in_solid, signed_margin, PointClassification};
pub use intersect_op::Intersect;
pub use subtract::Subtract;
pub use union::Union;

use crate::math::Transform;
use crate::solid::{BooleanOp, BooleanSolid, Solid};

/// Builds a boolean node; `transform` places `b` in the frame of `a`.
///
/// Operands are not checked for overlap or degeneracy.
#[must_use]
pub fn combine(
    a: impl Into<Arc<Solid>>,
    b: impl Into<Arc<Solid>>,
    op: BooleanOp,
    transform: Transform,
) -> Solid {
    Solid::Boolean(BooleanSolid {
        op,
        a: a.into(),
        b: b.into(),
        transform,
    })
}
