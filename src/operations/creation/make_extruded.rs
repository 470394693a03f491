use crate::error::{Result, SolidError};
use crate::math::{Point2, TOLERANCE};
use crate::solid::Solid;

use super::check_positive;

/// Signed area of a closed outline (positive when counter-clockwise).
pub(crate) fn signed_area(outline: &[Point2]) -> f64 {
    let n = outline.len();
    let mut twice = 0.0;
    for i in 0..n {
        let a = outline[i];
        let b = outline[(i + 1) % n];
        twice += a.x * b.y - b.x * a.y;
    }
    0.5 * twice
}

/// Extrudes a closed planar outline along `z`.
pub struct MakeExtrudedPolygon {
    outline: Vec<Point2>,
    hz: f64,
}

impl MakeExtrudedPolygon {
    /// Creates a new `MakeExtrudedPolygon` operation.
    ///
    /// The outline is implicitly closed; either winding is accepted.
    #[must_use]
    pub fn new(outline: Vec<Point2>, hz: f64) -> Self {
        Self { outline, hz }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error for fewer than three vertices, a zero-area outline,
    /// or a non-positive half-height.
    pub fn execute(&self) -> Result<Solid> {
        check_positive("extruded polygon", "hz", self.hz)?;
        if self.outline.len() < 3 {
            return Err(SolidError::InvalidProfile(format!(
                "outline needs at least 3 vertices, got {}",
                self.outline.len()
            ))
            .into());
        }
        if signed_area(&self.outline).abs() < TOLERANCE {
            return Err(SolidError::Degenerate("outline has zero area".into()).into());
        }
        Ok(Solid::ExtrudedPolygon {
            outline: self.outline.clone(),
            hz: self.hz,
        })
    }
}
