use std::f64::consts::PI;

use crate::error::{Result, SolidError};
use crate::solid::{PhiSegment, Solid, ThetaSegment};

use super::{check_phi, check_radii};

/// Creates a spherical shell section.
///
/// With the default segments this is a full ball (`rmin = 0`) or hollow
/// sphere. A polar segment `θ ∈ [0, θ₁]` gives the dome used for vessel caps.
pub struct MakeSphere {
    rmin: f64,
    rmax: f64,
    phi: PhiSegment,
    theta: ThetaSegment,
}

impl MakeSphere {
    /// Creates a new `MakeSphere` operation.
    #[must_use]
    pub fn new(rmin: f64, rmax: f64) -> Self {
        Self {
            rmin,
            rmax,
            phi: PhiSegment::FULL,
            theta: ThetaSegment::FULL,
        }
    }

    /// Restricts the azimuthal range.
    #[must_use]
    pub fn with_phi(mut self, start: f64, delta: f64) -> Self {
        self.phi = PhiSegment::new(start, delta);
        self
    }

    /// Restricts the polar range (measured from `+z`).
    #[must_use]
    pub fn with_theta(mut self, start: f64, delta: f64) -> Self {
        self.theta = ThetaSegment::new(start, delta);
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid radii or angular ranges outside `[0, π]`.
    pub fn execute(&self) -> Result<Solid> {
        check_radii("sphere", self.rmin, self.rmax)?;
        check_phi("sphere", self.phi)?;
        let ThetaSegment { start, delta } = self.theta;
        if !(0.0..PI).contains(&start) || delta <= 0.0 || start + delta > PI + 1e-12 {
            return Err(SolidError::Degenerate(format!(
                "sphere polar range [{start}, {}] is outside [0, pi]",
                start + delta
            ))
            .into());
        }
        Ok(Solid::Sphere {
            rmin: self.rmin,
            rmax: self.rmax,
            phi: self.phi,
            theta: self.theta,
        })
    }
}
