use crate::error::{Result, SolidError};
use crate::solid::{PhiSegment, Solid};

use super::{check_non_negative, check_phi, check_positive};

/// Creates a conical shell section.
///
/// Radii with index 1 apply at `-hz`, index 2 at `+hz`. A zero outer radius
/// on one end gives a pointed cone.
pub struct MakeCone {
    rmin1: f64,
    rmax1: f64,
    rmin2: f64,
    rmax2: f64,
    hz: f64,
    phi: PhiSegment,
}

impl MakeCone {
    /// Creates a new `MakeCone` operation for a full turn.
    #[must_use]
    pub fn new(rmin1: f64, rmax1: f64, rmin2: f64, rmax2: f64, hz: f64) -> Self {
        Self {
            rmin1,
            rmax1,
            rmin2,
            rmax2,
            hz,
            phi: PhiSegment::FULL,
        }
    }

    /// Restricts the cone to an azimuthal segment.
    #[must_use]
    pub fn with_phi(mut self, start: f64, delta: f64) -> Self {
        self.phi = PhiSegment::new(start, delta);
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error for negative radii, an inner radius above the outer
    /// one at either end, both outer radii zero, or a non-positive `hz`.
    pub fn execute(&self) -> Result<Solid> {
        check_non_negative("cone", "rmin1", self.rmin1)?;
        check_non_negative("cone", "rmax1", self.rmax1)?;
        check_non_negative("cone", "rmin2", self.rmin2)?;
        check_non_negative("cone", "rmax2", self.rmax2)?;
        check_positive("cone", "hz", self.hz)?;
        check_phi("cone", self.phi)?;
        if self.rmin1 > self.rmax1 || self.rmin2 > self.rmax2 {
            return Err(SolidError::Degenerate("cone inner radius exceeds outer radius".into()).into());
        }
        if self.rmax1 <= 0.0 && self.rmax2 <= 0.0 {
            return Err(SolidError::Degenerate("cone has no outer radius".into()).into());
        }
        Ok(Solid::Cone {
            rmin1: self.rmin1,
            rmax1: self.rmax1,
            rmin2: self.rmin2,
            rmax2: self.rmax2,
            hz: self.hz,
            phi: self.phi,
        })
    }
}
