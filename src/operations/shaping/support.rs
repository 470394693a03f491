use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SolidError};
use crate::math::{Rotation3, Transform, Vector3, TWO_PI};
use crate::operations::creation::MakeTube;
use crate::solid::Solid;

use super::MakeBeam;

/// One member of a support lattice, ready to be placed.
#[derive(Debug, Clone)]
pub struct LatticeMember {
    /// Placement name, e.g. `TiltedLeg_2`.
    pub name: String,
    /// Member solid, shared between identical members.
    pub solid: Arc<Solid>,
    /// Position of the member in the lattice frame.
    pub transform: Transform,
}

/// Builds a welded support structure of hollow beams.
///
/// The lattice frame has the floor at `z = 0`. Each of the `legs` legs is a
/// vertical floor leg followed by a leg tilted inward by `tilt`. Floor legs
/// are tied by horizontal braces and diagonal tie-rods, tilted-leg tops by
/// spreaders and by radial connectors reaching the vessel support ring.
pub struct SupportLattice {
    legs: u32,
    leg_radius: f64,
    azimuth_offset: f64,
    half_width: f64,
    wall: f64,
    floor_leg_length: f64,
    tilt: f64,
    tilted_leg_length: f64,
    brace_height: f64,
    ring_radius: f64,
    rod_radius: f64,
}

impl SupportLattice {
    /// Creates a lattice with `legs` legs standing at `leg_radius` from the axis.
    ///
    /// Defaults: 150 mm beams with 6 mm walls, 10° tilt, braces at mid-height
    /// of the floor legs, 10 mm tie-rods and connectors reaching the axis
    /// region at 60% of the top radius.
    #[must_use]
    pub fn new(legs: u32, leg_radius: f64, floor_leg_length: f64, tilted_leg_length: f64) -> Self {
        Self {
            legs,
            leg_radius,
            azimuth_offset: 0.0,
            half_width: 75.0,
            wall: 6.0,
            floor_leg_length,
            tilt: 10f64.to_radians(),
            tilted_leg_length,
            brace_height: 0.5 * floor_leg_length,
            ring_radius: 0.6 * leg_radius,
            rod_radius: 10.0,
        }
    }

    /// Sets the beam section.
    #[must_use]
    pub fn with_section(mut self, half_width: f64, wall: f64) -> Self {
        self.half_width = half_width;
        self.wall = wall;
        self
    }

    /// Sets the inward tilt of the upper legs (radians from vertical).
    #[must_use]
    pub fn with_tilt(mut self, tilt: f64) -> Self {
        self.tilt = tilt;
        self
    }

    /// Rotates the whole lattice about `z`.
    #[must_use]
    pub fn with_azimuth_offset(mut self, offset: f64) -> Self {
        self.azimuth_offset = offset;
        self
    }

    /// Sets the height of the horizontal braces above the floor.
    #[must_use]
    pub fn with_brace_height(mut self, height: f64) -> Self {
        self.brace_height = height;
        self
    }

    /// Sets the radius of the vessel support ring the connectors reach.
    #[must_use]
    pub fn with_ring_radius(mut self, radius: f64) -> Self {
        self.ring_radius = radius;
        self
    }

    /// Sets the radius of the diagonal tie-rods.
    #[must_use]
    pub fn with_rod_radius(mut self, radius: f64) -> Self {
        self.rod_radius = radius;
        self
    }

    /// Height of the tilted-leg tops above the floor.
    #[must_use]
    pub fn top_height(&self) -> f64 {
        self.floor_leg_length + self.tilted_leg_length * self.tilt.cos()
    }

    /// Radial distance of the tilted-leg tops from the axis.
    #[must_use]
    pub fn top_radius(&self) -> f64 {
        self.leg_radius - self.tilted_leg_length * self.tilt.sin()
    }

    fn azimuth(&self, i: u32) -> f64 {
        self.azimuth_offset + f64::from(i) * TWO_PI / f64::from(self.legs)
    }

    fn radial(&self, i: u32) -> Vector3 {
        let phi = self.azimuth(i);
        Vector3::new(phi.cos(), phi.sin(), 0.0)
    }

    /// Executes the operation, returning every member of the lattice.
    ///
    /// # Errors
    ///
    /// Returns an error for fewer than three legs, an invalid beam section,
    /// or dimensions that leave a member with no length.
    pub fn execute(&self) -> Result<Vec<LatticeMember>> {
        if self.legs < 3 {
            return Err(SolidError::Degenerate(format!(
                "support lattice needs at least 3 legs, got {}",
                self.legs
            ))
            .into());
        }
        let w = self.half_width;
        let n = self.legs;

        // Mitre: extend the tilted leg below the joint so that its outer
        // corner reaches the top plane of the floor leg.
        let extension = w * self.tilt.tan();
        let tilted_total = self.tilted_leg_length + extension;

        let floor_leg = self.beam(0.5 * self.floor_leg_length)?;
        let tilted_leg = self.beam(0.5 * tilted_total)?;

        let brace_chord = chord(self.leg_radius, n);
        let spreader_chord = chord(self.top_radius(), n);
        let brace = self.beam(0.5 * (brace_chord - 2.0 * w))?;
        let spreader = self.beam(0.5 * (spreader_chord - 2.0 * w))?;
        let connector_length = self.top_radius() - w - self.ring_radius;
        let connector = self.beam(0.5 * connector_length)?;

        let rod_start_z = w;
        let rod_end_z = self.brace_height - w;
        let rod_span = (brace_chord.powi(2) + (rod_end_z - rod_start_z).powi(2)).sqrt();
        let rod: Arc<Solid> = MakeTube::new(0.0, self.rod_radius, 0.5 * (rod_span - 2.0 * w))
            .execute()?
            .into();

        let mut members = Vec::with_capacity(6 * n as usize);
        for i in 0..n {
            let u = self.radial(i);
            let u_next = self.radial((i + 1) % n);
            let phi = self.azimuth(i);
            let foot = u * self.leg_radius;
            let joint = foot + Vector3::z() * self.floor_leg_length;

            members.push(LatticeMember {
                name: format!("FloorLeg_{i}"),
                solid: Arc::clone(&floor_leg),
                transform: Transform::rotation_z(phi)
                    .then(&Transform::from_vector(joint - Vector3::z() * (0.5 * self.floor_leg_length))),
            });

            let direction = u * -self.tilt.sin() + Vector3::z() * self.tilt.cos();
            let centre = joint + direction * (0.5 * (self.tilted_leg_length - extension));
            members.push(LatticeMember {
                name: format!("TiltedLeg_{i}"),
                solid: Arc::clone(&tilted_leg),
                transform: Transform::rotation_z(phi)
                    .compose(&Transform::rotation_y(-self.tilt))
                    .then(&Transform::from_vector(centre)),
            });

            let brace_a = foot + Vector3::z() * self.brace_height;
            let brace_b = u_next * self.leg_radius + Vector3::z() * self.brace_height;
            members.push(LatticeMember {
                name: format!("Brace_{i}"),
                solid: Arc::clone(&brace),
                transform: horizontal_between(brace_a, brace_b),
            });

            let top = joint + direction * self.tilted_leg_length;
            let top_next = u_next * self.top_radius() + Vector3::z() * top.z;
            members.push(LatticeMember {
                name: format!("Spreader_{i}"),
                solid: Arc::clone(&spreader),
                transform: horizontal_between(top, top_next),
            });

            let inner_end = u * self.ring_radius + Vector3::z() * top.z;
            let outer_end = top - u * w;
            members.push(LatticeMember {
                name: format!("Connector_{i}"),
                solid: Arc::clone(&connector),
                transform: horizontal_between(inner_end, outer_end),
            });

            let rod_a = foot + Vector3::z() * rod_start_z;
            let rod_b = u_next * self.leg_radius + Vector3::z() * rod_end_z;
            members.push(LatticeMember {
                name: format!("TieRod_{i}"),
                solid: Arc::clone(&rod),
                transform: along(rod_a, rod_b),
            });
        }
        debug!(
            legs = n,
            members = members.len(),
            top_height = self.top_height(),
            top_radius = self.top_radius(),
            "support lattice built"
        );
        Ok(members)
    }

    fn beam(&self, half_length: f64) -> Result<Arc<Solid>> {
        Ok(MakeBeam::square(self.half_width, self.wall, half_length)
            .execute()?
            .into())
    }
}

/// Chord between neighbouring points of a regular `n`-gon of radius `r`.
fn chord(r: f64, n: u32) -> f64 {
    2.0 * r * (PI / f64::from(n)).sin()
}

/// Lays a beam axis horizontally between `a` and `b`, centred between them.
fn horizontal_between(a: Vector3, b: Vector3) -> Transform {
    let d = b - a;
    let heading = d.y.atan2(d.x);
    Transform::rotation_z(heading)
        .compose(&Transform::rotation_y(FRAC_PI_2))
        .then(&Transform::from_vector((a + b) * 0.5))
}

/// Aligns a round member's axis with the segment `a → b`.
fn along(a: Vector3, b: Vector3) -> Transform {
    let d = b - a;
    let rotation = Rotation3::rotation_between(&Vector3::z(), &d)
        .unwrap_or_else(|| Rotation3::from_axis_angle(&Vector3::x_axis(), PI));
    Transform::new(rotation, (a + b) * 0.5)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use approx::assert_relative_eq;

    fn lattice() -> SupportLattice {
        SupportLattice::new(4, 2000.0, 3165.0, 1500.0).with_ring_radius(900.0)
    }

    #[test]
    fn member_counts() {
        let members = lattice().execute().unwrap();
        assert_eq!(members.len(), 24);
        assert!(members.iter().any(|m| m.name == "TieRod_3"));
    }

    #[test]
    fn floor_legs_stand_on_the_floor() {
        let members = lattice().execute().unwrap();
        let leg = members.iter().find(|m| m.name == "FloorLeg_1").unwrap();
        let bottom = leg.transform.transform_point(&Point3::new(0.0, 0.0, -1582.5));
        assert_relative_eq!(bottom.z, 0.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.y, 2000.0, epsilon = 1e-9);
    }

    #[test]
    fn tilted_leg_outer_corner_meets_floor_leg_top() {
        let l = lattice();
        let members = l.execute().unwrap();
        let leg = members.iter().find(|m| m.name == "TiltedLeg_0").unwrap();
        let half = 0.5 * (1500.0 + 75.0 * l.tilt.tan());
        // outer bottom corner in the beam frame: +x is radially outward
        let corner = leg.transform.transform_point(&Point3::new(75.0, 0.0, -half));
        assert_relative_eq!(corner.z, 3165.0, epsilon = 1e-9);
        let top = leg.transform.transform_point(&Point3::new(0.0, 0.0, half));
        assert_relative_eq!(top.z, l.top_height(), epsilon = 1e-9);
        assert_relative_eq!(top.x, l.top_radius(), epsilon = 1e-9);
    }

    #[test]
    fn too_few_legs_fail() {
        assert!(SupportLattice::new(2, 2000.0, 3000.0, 1000.0).execute().is_err());
    }

    #[test]
    fn connector_must_have_length() {
        let l = SupportLattice::new(3, 2000.0, 3000.0, 1000.0).with_ring_radius(5000.0);
        assert!(l.execute().is_err());
    }
}
