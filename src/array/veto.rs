use crate::math::{Transform, Vector3, TWO_PI};

use super::ArrayLayout;

/// Rows and columns of panels covering one flat wall.
///
/// Columns are centred on the wall axis, rows stack upwards from `bottom_z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelGrid {
    /// Panels per row.
    pub columns: usize,
    /// Rows per wall.
    pub rows: usize,
    /// Horizontal centre-to-centre distance.
    pub column_pitch: f64,
    /// Vertical centre-to-centre distance.
    pub row_pitch: f64,
    /// `z` of the lowest row.
    pub bottom_z: f64,
}

impl PanelGrid {
    /// Creates a grid.
    #[must_use]
    pub fn new(columns: usize, rows: usize, column_pitch: f64, row_pitch: f64, bottom_z: f64) -> Self {
        Self {
            columns,
            rows,
            column_pitch,
            row_pitch,
            bottom_z,
        }
    }

    fn per_wall(&self) -> usize {
        self.columns * self.rows
    }

    /// Placement of panel `k` of a wall facing along `normal_angle` at
    /// distance `distance` from the axis. Local `+x` is the wall normal.
    #[allow(clippy::cast_precision_loss)]
    fn on_wall(&self, k: usize, normal_angle: f64, distance: f64) -> Transform {
        let row = k / self.columns;
        let col = k % self.columns;
        let lateral = (col as f64 - 0.5 * (self.columns as f64 - 1.0)) * self.column_pitch;
        let z = self.bottom_z + row as f64 * self.row_pitch;
        let turn = Transform::rotation_z(normal_angle);
        let centre = turn.transform_vector(&Vector3::new(distance, lateral, 0.0));
        turn.with_translation(centre.x, centre.y, z)
    }
}

/// Panels on a cylinder, rows stacked along `z`.
///
/// Panel `i` is in row `i / per_row` and column `i % per_row`; columns are
/// evenly spaced in azimuth starting at `phi_offset`. Local `+x` is radial.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderPanels {
    per_row: usize,
    rows: usize,
    radius: f64,
    row_pitch: f64,
    bottom_z: f64,
    phi_offset: f64,
}

impl CylinderPanels {
    /// Creates the layout.
    #[must_use]
    pub fn new(per_row: usize, rows: usize, radius: f64, row_pitch: f64, bottom_z: f64) -> Self {
        Self {
            per_row,
            rows,
            radius,
            row_pitch,
            bottom_z,
            phi_offset: 0.0,
        }
    }

    /// Rotates every row by `offset`.
    #[must_use]
    pub fn with_phi_offset(mut self, offset: f64) -> Self {
        self.phi_offset = offset;
        self
    }
}

impl ArrayLayout for CylinderPanels {
    fn count(&self) -> usize {
        self.per_row * self.rows
    }

    #[allow(clippy::cast_precision_loss)]
    fn locate(&self, index: usize) -> Option<Transform> {
        if index >= self.count() {
            return None;
        }
        let row = index / self.per_row;
        let col = index % self.per_row;
        let phi = self.phi_offset + col as f64 * TWO_PI / self.per_row as f64;
        Some(Transform::rotation_z(phi).with_translation(
            self.radius * phi.cos(),
            self.radius * phi.sin(),
            self.bottom_z + row as f64 * self.row_pitch,
        ))
    }
}

/// Panels lining the four walls of a rectangular tank.
///
/// Panel id modulo 4 selects the wall (`+x`, `+y`, `-x`, `-y`); the quotient
/// is the position within that wall's grid, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPanels {
    half_x: f64,
    half_y: f64,
    grid: PanelGrid,
}

impl BoxPanels {
    /// Walls at `x = ±half_x` and `y = ±half_y`.
    #[must_use]
    pub fn new(half_x: f64, half_y: f64, grid: PanelGrid) -> Self {
        Self { half_x, half_y, grid }
    }
}

impl ArrayLayout for BoxPanels {
    fn count(&self) -> usize {
        4 * self.grid.per_wall()
    }

    #[allow(clippy::cast_precision_loss)]
    fn locate(&self, index: usize) -> Option<Transform> {
        if index >= self.count() {
            return None;
        }
        let wall = index % 4;
        let distance = if wall % 2 == 0 { self.half_x } else { self.half_y };
        let angle = wall as f64 * 0.25 * TWO_PI;
        Some(self.grid.on_wall(index / 4, angle, distance))
    }
}

/// Panels lining the eight walls of an octagonal enclosure.
///
/// Panel id modulo 8 selects the wall, counter-clockwise from `+x`; the
/// quotient is the position within that wall's grid.
#[derive(Debug, Clone, PartialEq)]
pub struct OctagonPanels {
    apothem: f64,
    grid: PanelGrid,
}

impl OctagonPanels {
    /// Walls at distance `apothem` from the axis.
    #[must_use]
    pub fn new(apothem: f64, grid: PanelGrid) -> Self {
        Self { apothem, grid }
    }
}

impl ArrayLayout for OctagonPanels {
    fn count(&self) -> usize {
        8 * self.grid.per_wall()
    }

    #[allow(clippy::cast_precision_loss)]
    fn locate(&self, index: usize) -> Option<Transform> {
        if index >= self.count() {
            return None;
        }
        let angle = (index % 8) as f64 * TWO_PI / 8.0;
        Some(self.grid.on_wall(index / 8, angle, self.apothem))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::array::tests::min_pairwise_distance;
    use approx::assert_relative_eq;

    fn grid() -> PanelGrid {
        PanelGrid::new(3, 2, 1000.0, 1500.0, 0.0)
    }

    #[test]
    fn cylinder_row_major() {
        let layout = CylinderPanels::new(8, 3, 4800.0, 2000.0, 500.0);
        assert_eq!(layout.count(), 24);
        let t = layout.member(10).unwrap();
        // row 1, column 2: quarter turn
        assert_relative_eq!(t.translation, Vector3::new(0.0, 4800.0, 2500.0), epsilon = 1e-9);
        assert_relative_eq!(t.transform_vector(&Vector3::x()), Vector3::y(), epsilon = 1e-12);
        assert!(min_pairwise_distance(&layout) > 1000.0);
    }

    #[test]
    fn box_panels_cycle_through_walls() {
        let layout = BoxPanels::new(5000.0, 4000.0, grid());
        assert_eq!(layout.count(), 24);
        let first = layout.member(0).unwrap();
        assert_relative_eq!(first.translation, Vector3::new(5000.0, -1000.0, 0.0), epsilon = 1e-9);
        let second = layout.member(1).unwrap();
        assert_relative_eq!(second.translation.y, 4000.0, epsilon = 1e-9);
        assert_relative_eq!(second.translation.x, 1000.0, epsilon = 1e-9);
        let third = layout.member(2).unwrap();
        assert_relative_eq!(third.translation.x, -5000.0, epsilon = 1e-9);
        // id 13: wall 1, k = 3 -> row 1, column 0
        let t = layout.member(13).unwrap();
        assert_relative_eq!(t.translation.z, 1500.0);
        assert_relative_eq!(t.transform_vector(&Vector3::x()), Vector3::y(), epsilon = 1e-12);
        assert!(min_pairwise_distance(&layout) > 999.0);
    }

    #[test]
    fn octagon_panels_use_eight_walls() {
        let layout = OctagonPanels::new(5000.0, grid());
        assert_eq!(layout.count(), 48);
        for i in 0..8 {
            let t = layout.member(i).unwrap();
            let normal = t.transform_vector(&Vector3::x());
            assert_relative_eq!(t.translation.dot(&normal), 5000.0, epsilon = 1e-9);
        }
        assert!(min_pairwise_distance(&layout) > 999.0);
        assert!(layout.member(48).is_err());
    }
}
