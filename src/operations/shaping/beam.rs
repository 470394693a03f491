use crate::error::{Result, SolidError};
use crate::operations::boolean::Subtract;
use crate::operations::creation::MakeBox;
use crate::solid::Solid;

/// Builds a hollow rectangular beam: an outer box minus a concentric inner box.
///
/// The beam axis is local `z`. An inner half-length equal to the outer one
/// gives a tube open at both ends.
pub struct MakeBeam {
    outer: [f64; 3],
    inner: [f64; 3],
}

impl MakeBeam {
    /// Creates a new `MakeBeam` operation from outer and inner half-extents.
    #[must_use]
    pub fn new(outer: [f64; 3], inner: [f64; 3]) -> Self {
        Self { outer, inner }
    }

    /// Square section of half-width `half_width` with walls `wall` thick.
    #[must_use]
    pub fn square(half_width: f64, wall: f64, half_length: f64) -> Self {
        let inner = half_width - wall;
        Self::new(
            [half_width, half_width, half_length],
            [inner, inner, half_length],
        )
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if either box is invalid or the inner section does
    /// not fit strictly inside the outer one.
    pub fn execute(&self) -> Result<Solid> {
        let [ox, oy, oz] = self.outer;
        let [ix, iy, iz] = self.inner;
        let outer = MakeBox::new(ox, oy, oz).execute()?;
        let inner = MakeBox::new(ix, iy, iz).execute()?;
        if ix >= ox || iy >= oy || iz > oz {
            return Err(SolidError::Degenerate(format!(
                "beam inner section ({ix}, {iy}, {iz}) does not fit in ({ox}, {oy}, {oz})"
            ))
            .into());
        }
        Ok(Subtract::new(outer, inner).execute())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::query::Volume;
    use approx::assert_relative_eq;

    #[test]
    fn beam_volume_is_outer_minus_inner() {
        let beam = MakeBeam::new([75.0, 75.0, 1582.5], [69.0, 69.0, 1582.5])
            .execute()
            .unwrap();
        let expected = 150.0 * 150.0 * 3165.0 - 138.0 * 138.0 * 3165.0;
        assert_relative_eq!(Volume::new(&beam).execute(), expected, max_relative = 1e-12);
    }

    #[test]
    fn sampled_beam_volume_converges() {
        // walls that do not fall on cell boundaries
        let beam = MakeBeam::new([80.0, 60.0, 500.0], [73.3, 52.1, 500.0])
            .execute()
            .unwrap();
        let expected = 8.0 * (80.0 * 60.0 - 73.3 * 52.1) * 500.0;
        let coarse = Volume::new(&beam).with_resolution(64).sampled().execute();
        let fine = Volume::new(&beam).with_resolution(150).sampled().execute();
        assert_relative_eq!(coarse, expected, max_relative = 0.02);
        assert_relative_eq!(fine, expected, max_relative = 0.01);
    }

    #[test]
    fn square_helper() {
        let a = MakeBeam::square(75.0, 6.0, 10.0).execute().unwrap();
        let b = MakeBeam::new([75.0, 75.0, 10.0], [69.0, 69.0, 10.0])
            .execute()
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn inner_wider_than_outer_fails() {
        assert!(MakeBeam::new([10.0, 10.0, 10.0], [10.0, 5.0, 10.0]).execute().is_err());
    }
}
