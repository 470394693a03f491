use crate::error::Result;
use crate::solid::{PhiSegment, Solid};

use super::{check_phi, check_positive, check_radii};

/// Creates a cylindrical shell (or full cylinder when `rmin = 0`).
pub struct MakeTube {
    rmin: f64,
    rmax: f64,
    hz: f64,
    phi: PhiSegment,
}

impl MakeTube {
    /// Creates a new `MakeTube` operation for a full turn.
    #[must_use]
    pub fn new(rmin: f64, rmax: f64, hz: f64) -> Self {
        Self {
            rmin,
            rmax,
            hz,
            phi: PhiSegment::FULL,
        }
    }

    /// Restricts the tube to an azimuthal segment.
    #[must_use]
    pub fn with_phi(mut self, start: f64, delta: f64) -> Self {
        self.phi = PhiSegment::new(start, delta);
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the radii are invalid, the half-height is not
    /// positive, or the phi segment is empty.
    pub fn execute(&self) -> Result<Solid> {
        check_radii("tube", self.rmin, self.rmax)?;
        check_positive("tube", "hz", self.hz)?;
        check_phi("tube", self.phi)?;
        Ok(Solid::Tube {
            rmin: self.rmin,
            rmax: self.rmax,
            hz: self.hz,
            phi: self.phi,
        })
    }
}
