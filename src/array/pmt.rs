use crate::math::{Transform, DEG};

use super::ArrayLayout;

/// Photosensors laid out in horizontal rows, alternate rows staggered by
/// half a pitch.
///
/// Members are numbered row by row from the row at the largest `y`, left to
/// right within a row. A row with an even population is shifted by half a
/// pitch so that neighbouring rows interlock.
#[derive(Debug, Clone, PartialEq)]
pub struct HexRows {
    rows: Vec<usize>,
    pitch: f64,
    row_pitch: f64,
    first_row_y: f64,
    scale: f64,
    z: f64,
}

impl HexRows {
    /// Row populations of the top array, 253 sensors.
    pub const TOP_ROWS: [usize; 19] = [6, 9, 12, 13, 14, 15, 16, 17, 16, 17, 16, 17, 16, 15, 14, 13, 12, 9, 6];

    /// Row populations of the bottom array, 241 sensors.
    pub const BOTTOM_ROWS: [usize; 19] = [4, 9, 10, 13, 14, 15, 16, 15, 16, 17, 16, 15, 16, 15, 14, 13, 10, 9, 4];

    /// Creates a layout with the standard 81 mm pitch.
    #[must_use]
    pub fn new(rows: Vec<usize>) -> Self {
        Self {
            rows,
            pitch: 81.0,
            row_pitch: 70.1481,
            first_row_y: 631.3329,
            scale: 1.0,
            z: 0.0,
        }
    }

    /// The top array.
    #[must_use]
    pub fn top() -> Self {
        Self::new(Self::TOP_ROWS.to_vec())
    }

    /// The bottom array.
    #[must_use]
    pub fn bottom() -> Self {
        Self::new(Self::BOTTOM_ROWS.to_vec())
    }

    /// Scales every in-plane distance, e.g. by `1 - shrinkage` for a cold holder.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the common `z` of the members.
    #[must_use]
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    /// Row populations.
    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// `(row, column)` of member `index`.
    #[must_use]
    pub fn row_column(&self, index: usize) -> Option<(usize, usize)> {
        let mut first = 0;
        for (row, &n) in self.rows.iter().enumerate() {
            if index < first + n {
                return Some((row, index - first));
            }
            first += n;
        }
        None
    }
}

impl ArrayLayout for HexRows {
    fn count(&self) -> usize {
        self.rows.iter().sum()
    }

    #[allow(clippy::cast_precision_loss)]
    fn locate(&self, index: usize) -> Option<Transform> {
        let (row, col) = self.row_column(index)?;
        let n = self.rows[row];
        let pitch = self.pitch * self.scale;
        let mut x = -((n / 2) as f64) * pitch;
        if n % 2 == 0 {
            x += 0.5 * pitch;
        }
        x += col as f64 * pitch;
        let y = (self.first_row_y - row as f64 * self.row_pitch) * self.scale;
        Some(Transform::translation(x, y, self.z))
    }
}

/// Photosensors on concentric rings.
///
/// Ring `k` holds `populations[k]` members at radius `radii[k]`, the first
/// one at `start_angles[k]` and the rest evenly spaced. Numbering runs ring
/// by ring from the centre, counter-clockwise within a ring.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialRings {
    populations: Vec<usize>,
    radii: Vec<f64>,
    start_angles: Vec<f64>,
    scale: f64,
    z: f64,
}

impl RadialRings {
    /// Ring populations of the radial top array, 225 sensors.
    pub const POPULATIONS: [usize; 9] = [1, 6, 12, 18, 24, 32, 38, 44, 50];

    /// Ring radii in mm.
    pub const RADII: [f64; 9] = [0.0, 82.0, 163.0, 245.0, 327.0, 408.0, 489.0, 570.0, 651.0];

    /// Angle of the first member of each ring, in degrees.
    pub const START_ANGLES: [f64; 9] = [0.0, 60.0, 30.0, 20.0, 15.0, 11.25, 9.473_68, 8.181_82, 7.2];

    /// Creates a layout from per-ring tables; angles in radians.
    ///
    /// The three tables are truncated to the shortest one.
    #[must_use]
    pub fn new(mut populations: Vec<usize>, mut radii: Vec<f64>, mut start_angles: Vec<f64>) -> Self {
        let n = populations.len().min(radii.len()).min(start_angles.len());
        populations.truncate(n);
        radii.truncate(n);
        start_angles.truncate(n);
        Self {
            populations,
            radii,
            start_angles,
            scale: 1.0,
            z: 0.0,
        }
    }

    /// The radial top array.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(
            Self::POPULATIONS.to_vec(),
            Self::RADII.to_vec(),
            Self::START_ANGLES.iter().map(|a| a * DEG).collect(),
        )
    }

    /// Scales the ring radii.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the common `z` of the members.
    #[must_use]
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }
}

impl ArrayLayout for RadialRings {
    fn count(&self) -> usize {
        self.populations.iter().sum()
    }

    #[allow(clippy::cast_precision_loss)]
    fn locate(&self, index: usize) -> Option<Transform> {
        let mut first = 0;
        for (ring, &n) in self.populations.iter().enumerate() {
            if index < first + n {
                let j = index - first;
                let angle = self.start_angles[ring] + j as f64 * 360.0 * DEG / n as f64;
                let r = self.radii[ring] * self.scale;
                return Some(Transform::translation(r * angle.cos(), r * angle.sin(), self.z));
            }
            first += n;
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::array::tests::min_pairwise_distance;
    use approx::assert_relative_eq;

    const CORR_R: f64 = 1.0 - 0.011;
    /// Outer diameter of a PMT body.
    const PMT_FOOTPRINT: f64 = 76.0;

    #[test]
    fn hex_top_has_253_distinct_positions() {
        let layout = HexRows::top().with_scale(CORR_R);
        assert_eq!(layout.count(), 253);
        assert!(min_pairwise_distance(&layout) > PMT_FOOTPRINT);
    }

    #[test]
    fn hex_bottom_has_241_distinct_positions() {
        let layout = HexRows::bottom().with_scale(CORR_R);
        assert_eq!(layout.count(), 241);
        assert!(min_pairwise_distance(&layout) > PMT_FOOTPRINT);
    }

    #[test]
    fn hex_first_row_is_centred() {
        let layout = HexRows::top();
        // six sensors, even row: -202.5 .. 202.5
        let first = layout.member(0).unwrap();
        let last = layout.member(5).unwrap();
        assert_relative_eq!(first.translation.x, -202.5);
        assert_relative_eq!(last.translation.x, 202.5);
        assert_relative_eq!(first.translation.y, 631.3329);
        // second row has nine sensors, odd: -324 .. 324
        let second = layout.member(6).unwrap();
        assert_relative_eq!(second.translation.x, -324.0);
        assert_relative_eq!(second.translation.y, 631.3329 - 70.1481);
    }

    #[test]
    fn hex_last_member_closes_the_pattern() {
        let layout = HexRows::top();
        let last = layout.member(252).unwrap();
        assert_relative_eq!(last.translation.x, 202.5);
        assert_relative_eq!(last.translation.y, 631.3329 - 18.0 * 70.1481, epsilon = 1e-9);
        assert_eq!(layout.row_column(252), Some((18, 5)));
        assert!(layout.member(253).is_err());
    }

    #[test]
    fn hex_scale_and_z() {
        let t = HexRows::top().with_scale(0.5).with_z(-3.0).member(0).unwrap();
        assert_relative_eq!(t.translation.x, -101.25);
        assert_relative_eq!(t.translation.z, -3.0);
    }

    #[test]
    fn radial_has_225_distinct_positions() {
        let layout = RadialRings::standard().with_scale(CORR_R);
        assert_eq!(layout.count(), 225);
        assert!(min_pairwise_distance(&layout) > PMT_FOOTPRINT);
    }

    #[test]
    fn radial_ring_starts() {
        let layout = RadialRings::standard();
        let centre = layout.member(0).unwrap();
        assert_relative_eq!(centre.translation.norm(), 0.0);
        let first = layout.member(1).unwrap();
        assert_relative_eq!(first.translation.x, 82.0 * (60.0 * DEG).cos(), epsilon = 1e-9);
        assert_relative_eq!(first.translation.y, 82.0 * (60.0 * DEG).sin(), epsilon = 1e-9);
        // ring 2 begins after 1 + 6 members
        let ring2 = layout.member(7).unwrap();
        assert_relative_eq!(ring2.translation.y, 163.0 * (30.0 * DEG).sin(), epsilon = 1e-9);
    }
}
