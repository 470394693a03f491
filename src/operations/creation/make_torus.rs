use crate::error::{Result, SolidError};
use crate::solid::{PhiSegment, Solid};

use super::{check_phi, check_radii};

/// Creates a torus: a tube of radii `rmin..rmax` swept around `z` at `rtor`.
pub struct MakeTorus {
    rmin: f64,
    rmax: f64,
    rtor: f64,
    phi: PhiSegment,
}

impl MakeTorus {
    /// Creates a new `MakeTorus` operation for a full turn.
    #[must_use]
    pub fn new(rmin: f64, rmax: f64, rtor: f64) -> Self {
        Self {
            rmin,
            rmax,
            rtor,
            phi: PhiSegment::FULL,
        }
    }

    /// Restricts the sweep to an azimuthal segment.
    #[must_use]
    pub fn with_phi(mut self, start: f64, delta: f64) -> Self {
        self.phi = PhiSegment::new(start, delta);
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid tube radii or when the tube crosses the
    /// axis (`rmax > rtor`).
    pub fn execute(&self) -> Result<Solid> {
        check_radii("torus", self.rmin, self.rmax)?;
        check_phi("torus", self.phi)?;
        if !self.rtor.is_finite() || self.rmax > self.rtor {
            return Err(SolidError::Degenerate(format!(
                "torus tube radius {} exceeds swept radius {}",
                self.rmax, self.rtor
            ))
            .into());
        }
        Ok(Solid::Torus {
            rmin: self.rmin,
            rmax: self.rmax,
            rtor: self.rtor,
            phi: self.phi,
        })
    }
}
