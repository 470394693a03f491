mod make_box;
mod make_cone;
mod make_extruded;
mod make_polycone;
mod make_sphere;
mod make_torus;
mod make_tube;

pub use make_box::{MakeBox, MakeTrd};
pub use make_cone::MakeCone;
pub use make_extruded::MakeExtrudedPolygon;
pub(crate) use make_extruded::signed_area;
pub use make_polycone::{MakePolycone, MakePolyhedra};
pub use make_sphere::MakeSphere;
pub use make_torus::MakeTorus;
pub use make_tube::MakeTube;

use crate::error::{Result, SolidError};
use crate::math::TWO_PI;
use crate::solid::PhiSegment;

/// Rejects negative or non-finite extents.
fn check_non_negative(solid: &'static str, parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SolidError::InvalidExtent {
            solid,
            parameter,
            value,
        }
        .into())
    }
}

/// Rejects zero, negative or non-finite extents.
fn check_positive(solid: &'static str, parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SolidError::InvalidExtent {
            solid,
            parameter,
            value,
        }
        .into())
    }
}

/// Rejects an inner radius larger than the outer one.
fn check_radii(solid: &'static str, rmin: f64, rmax: f64) -> Result<()> {
    check_non_negative(solid, "rmin", rmin)?;
    check_positive(solid, "rmax", rmax)?;
    if rmin > rmax {
        return Err(SolidError::InvalidExtent {
            solid,
            parameter: "rmin",
            value: rmin,
        }
        .into());
    }
    Ok(())
}

fn check_phi(solid: &'static str, phi: PhiSegment) -> Result<()> {
    if !phi.start.is_finite() {
        return Err(SolidError::InvalidExtent {
            solid,
            parameter: "start phi",
            value: phi.start,
        }
        .into());
    }
    if !(phi.delta > 0.0 && phi.delta <= TWO_PI + 1e-12) {
        return Err(SolidError::InvalidExtent {
            solid,
            parameter: "delta phi",
            value: phi.delta,
        }
        .into());
    }
    Ok(())
}
