use crate::error::Result;
use crate::solid::Solid;

use super::{check_non_negative, check_positive};

/// Creates a box from its three half-lengths.
pub struct MakeBox {
    hx: f64,
    hy: f64,
    hz: f64,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(hx: f64, hy: f64, hz: f64) -> Self {
        Self { hx, hy, hz }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if any half-length is not strictly positive.
    pub fn execute(&self) -> Result<Solid> {
        check_positive("box", "hx", self.hx)?;
        check_positive("box", "hy", self.hy)?;
        check_positive("box", "hz", self.hz)?;
        Ok(Solid::Box {
            hx: self.hx,
            hy: self.hy,
            hz: self.hz,
        })
    }
}

/// Creates a generic trapezoid whose x and y half-widths vary linearly in z.
pub struct MakeTrd {
    dx1: f64,
    dx2: f64,
    dy1: f64,
    dy2: f64,
    dz: f64,
}

impl MakeTrd {
    /// Creates a new `MakeTrd` operation.
    ///
    /// `dx1`, `dy1` are the half-widths at `-dz`; `dx2`, `dy2` at `+dz`.
    #[must_use]
    pub fn new(dx1: f64, dx2: f64, dy1: f64, dy2: f64, dz: f64) -> Self {
        Self {
            dx1,
            dx2,
            dy1,
            dy2,
            dz,
        }
    }

    /// Executes the operation.
    ///
    /// A zero half-width on one face is allowed (a wedge).
    ///
    /// # Errors
    ///
    /// Returns an error for negative widths or a non-positive `dz`.
    pub fn execute(&self) -> Result<Solid> {
        check_non_negative("trd", "dx1", self.dx1)?;
        check_non_negative("trd", "dx2", self.dx2)?;
        check_non_negative("trd", "dy1", self.dy1)?;
        check_non_negative("trd", "dy2", self.dy2)?;
        check_positive("trd", "dz", self.dz)?;
        Ok(Solid::Trd {
            dx1: self.dx1,
            dx2: self.dx2,
            dy1: self.dy1,
            dy2: self.dy2,
            dz: self.dz,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn box_keeps_half_lengths() {
        let solid = MakeBox::new(1.0, 2.0, 3.0).execute().unwrap();
        assert_eq!(
            solid,
            Solid::Box {
                hx: 1.0,
                hy: 2.0,
                hz: 3.0
            }
        );
    }

    #[test]
    fn zero_half_length_fails() {
        assert!(MakeBox::new(1.0, 0.0, 3.0).execute().is_err());
        assert!(MakeBox::new(1.0, f64::NAN, 3.0).execute().is_err());
    }

    #[test]
    fn wedge_trd_is_allowed() {
        assert!(MakeTrd::new(9.0, 9.0, 13.0, 0.0, 6.5).execute().is_ok());
        assert!(MakeTrd::new(9.0, 9.0, -1.0, 0.0, 6.5).execute().is_err());
    }
}
