use crate::error::{Result, SolidError};
use crate::solid::{PhiSegment, Solid, ZPlane};

use super::{check_non_negative, check_phi};

/// Checks an ordered `(z, rmin, rmax)` profile.
///
/// Planes must be non-decreasing in `z`; a repeated `z` encodes a radius step.
fn check_planes(solid: &'static str, planes: &[ZPlane]) -> Result<()> {
    if planes.len() < 2 {
        return Err(SolidError::InvalidProfile(format!(
            "{solid} needs at least two planes, got {}",
            planes.len()
        ))
        .into());
    }
    for plane in planes {
        check_non_negative(solid, "rmin", plane.rmin)?;
        check_non_negative(solid, "rmax", plane.rmax)?;
        if !plane.z.is_finite() || plane.rmin > plane.rmax {
            return Err(SolidError::InvalidProfile(format!(
                "{solid} plane at z = {} has rmin {} > rmax {}",
                plane.z, plane.rmin, plane.rmax
            ))
            .into());
        }
    }
    if let Some(w) = planes.windows(2).find(|w| w[1].z < w[0].z) {
        return Err(SolidError::InvalidProfile(format!(
            "{solid} planes must be ordered in z ({} after {})",
            w[1].z, w[0].z
        ))
        .into());
    }
    let first = planes[0].z;
    let last = planes[planes.len() - 1].z;
    if last - first <= 0.0 {
        return Err(SolidError::InvalidProfile(format!("{solid} has zero axial length")).into());
    }
    Ok(())
}

/// Creates a solid of revolution from an ordered plane list.
pub struct MakePolycone {
    planes: Vec<ZPlane>,
    phi: PhiSegment,
}

impl MakePolycone {
    /// Creates a new `MakePolycone` operation for a full turn.
    #[must_use]
    pub fn new(planes: Vec<ZPlane>) -> Self {
        Self {
            planes,
            phi: PhiSegment::FULL,
        }
    }

    /// Builds the plane list from parallel arrays.
    #[must_use]
    pub fn from_arrays(z: &[f64], rmin: &[f64], rmax: &[f64]) -> Self {
        let planes = z
            .iter()
            .zip(rmin)
            .zip(rmax)
            .map(|((&z, &rmin), &rmax)| ZPlane::new(z, rmin, rmax))
            .collect();
        Self::new(planes)
    }

    /// Restricts the revolution to an azimuthal segment.
    #[must_use]
    pub fn with_phi(mut self, start: f64, delta: f64) -> Self {
        self.phi = PhiSegment::new(start, delta);
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error for fewer than two planes, unordered `z`, or invalid radii.
    pub fn execute(&self) -> Result<Solid> {
        check_planes("polycone", &self.planes)?;
        check_phi("polycone", self.phi)?;
        Ok(Solid::Polycone {
            planes: self.planes.clone(),
            phi: self.phi,
        })
    }
}

/// Creates a polycone with a regular polygonal cross-section.
///
/// Plane radii are apothems (distance from the axis to the side faces).
pub struct MakePolyhedra {
    sides: u32,
    planes: Vec<ZPlane>,
    phi: PhiSegment,
}

impl MakePolyhedra {
    /// Creates a new `MakePolyhedra` operation for a full turn.
    #[must_use]
    pub fn new(sides: u32, planes: Vec<ZPlane>) -> Self {
        Self {
            sides,
            planes,
            phi: PhiSegment::FULL,
        }
    }

    /// Restricts the solid to an azimuthal segment split into `sides` faces.
    #[must_use]
    pub fn with_phi(mut self, start: f64, delta: f64) -> Self {
        self.phi = PhiSegment::new(start, delta);
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error for fewer than three sides on a full turn or an
    /// invalid profile.
    pub fn execute(&self) -> Result<Solid> {
        if self.sides == 0 || (self.phi.is_full() && self.sides < 3) {
            return Err(SolidError::Degenerate(format!(
                "polyhedra needs at least 3 sides, got {}",
                self.sides
            ))
            .into());
        }
        check_planes("polyhedra", &self.planes)?;
        check_phi("polyhedra", self.phi)?;
        Ok(Solid::Polyhedra {
            sides: self.sides,
            planes: self.planes.clone(),
            phi: self.phi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_profile_is_valid() {
        let op = MakePolycone::from_arrays(
            &[-1.0, 0.0, 0.0, 1.0],
            &[0.0, 0.0, 0.0, 0.0],
            &[1.0, 1.0, 2.0, 2.0],
        );
        assert!(op.execute().is_ok());
    }

    #[test]
    fn unordered_profile_fails() {
        let op = MakePolycone::from_arrays(&[0.0, -1.0], &[0.0, 0.0], &[1.0, 1.0]);
        assert!(op.execute().is_err());
    }

    #[test]
    fn single_plane_fails() {
        assert!(MakePolycone::new(vec![ZPlane::new(0.0, 0.0, 1.0)]).execute().is_err());
    }

    #[test]
    fn octagonal_prism_is_valid() {
        let planes = vec![ZPlane::new(-1.0, 0.0, 5.0), ZPlane::new(1.0, 0.0, 5.0)];
        assert!(MakePolyhedra::new(8, planes.clone()).execute().is_ok());
        assert!(MakePolyhedra::new(2, planes).execute().is_err());
    }
}
