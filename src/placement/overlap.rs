use tracing::{info, warn};

use crate::error::Result;
use crate::math::{Aabb, Point3, Transform};
use crate::operations::boolean::signed_margin;
use crate::operations::query::BoundingBox;

use super::{PlacementId, PlacementTree};

/// What a sample point revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapKind {
    /// The placement reaches into a sibling.
    Sibling(PlacementId),
    /// The placement sticks out of its mother volume.
    Protrusion,
}

/// One detected problem, with the deepest penetration seen.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    pub placement: PlacementId,
    pub name: String,
    pub kind: OverlapKind,
    /// Deepest penetration found, in mm.
    pub depth: f64,
}

/// Result of an overlap check; purely diagnostic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlapReport {
    pub overlaps: Vec<Overlap>,
    /// Placements examined.
    pub checked: usize,
}

impl OverlapReport {
    /// Returns `true` when nothing was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.overlaps.is_empty()
    }
}

/// Samples every placement for interpenetration with its siblings and for
/// protrusion from its mother.
///
/// Points are taken at cell centres of the placement's bounding box and kept
/// when strictly inside its solid. Reporting never modifies the tree.
pub struct CheckOverlaps<'a> {
    tree: &'a PlacementTree,
    resolution: usize,
    tolerance: f64,
    verbose: bool,
}

impl<'a> CheckOverlaps<'a> {
    /// Creates a new `CheckOverlaps` query with 8 cells per axis.
    #[must_use]
    pub fn new(tree: &'a PlacementTree) -> Self {
        Self {
            tree,
            resolution: 8,
            tolerance: 1e-6,
            verbose: true,
        }
    }

    /// Sets the number of sampling cells per axis.
    #[must_use]
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution.max(1);
        self
    }

    /// Sets the penetration depth below which contacts are ignored.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Logs each overlap at `warn` when `verbose`; the summary is always
    /// logged.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Executes the check.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree references a missing node or volume.
    pub fn execute(&self) -> Result<OverlapReport> {
        let mut report = OverlapReport::default();
        for id in self.tree.depth_first() {
            let node = self.tree.placement(id)?;
            let Some(mother_id) = node.parent else {
                continue;
            };
            report.checked += 1;
            let solid = &self.tree.volume(node.volume)?.solid;
            let mother = &self.tree.volume(self.tree.placement(mother_id)?.volume)?.solid;
            let samples = self.samples(solid, &node.transform);
            if samples.is_empty() {
                continue;
            }

            let protrusion = samples
                .iter()
                .map(|p| signed_margin(mother, p))
                .fold(f64::NEG_INFINITY, f64::max);
            if protrusion > self.tolerance {
                report.overlaps.push(Overlap {
                    placement: id,
                    name: node.name.clone(),
                    kind: OverlapKind::Protrusion,
                    depth: protrusion,
                });
            }

            let own_box = bounds_in_parent(self.tree, id)?;
            for &sibling in self.tree.children(mother_id)? {
                if sibling == id {
                    continue;
                }
                if !own_box.overlaps(&bounds_in_parent(self.tree, sibling)?, self.tolerance) {
                    continue;
                }
                let other = self.tree.placement(sibling)?;
                let other_solid = &self.tree.volume(other.volume)?.solid;
                let depth = samples
                    .iter()
                    .map(|p| -signed_margin(other_solid, &other.transform.inverse_transform_point(p)))
                    .fold(f64::NEG_INFINITY, f64::max);
                if depth > self.tolerance {
                    report.overlaps.push(Overlap {
                        placement: id,
                        name: node.name.clone(),
                        kind: OverlapKind::Sibling(sibling),
                        depth,
                    });
                }
            }
        }
        for o in report.overlaps.iter().filter(|_| self.verbose) {
            warn!(placement = %o.name, kind = ?o.kind, depth = o.depth, "overlap detected");
        }
        info!(checked = report.checked, found = report.overlaps.len(), "overlap check finished");
        Ok(report)
    }

    /// Interior sample points of `solid`, mapped into the parent frame.
    #[allow(clippy::cast_precision_loss)]
    fn samples(&self, solid: &crate::solid::Solid, transform: &Transform) -> Vec<Point3> {
        let bb = BoundingBox::new(solid).execute();
        if bb.is_empty() {
            return Vec::new();
        }
        let n = self.resolution;
        let cell = bb.size() / n as f64;
        let mut out = Vec::new();
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let p = Point3::new(
                        bb.min.x + (i as f64 + 0.5) * cell.x,
                        bb.min.y + (j as f64 + 0.5) * cell.y,
                        bb.min.z + (k as f64 + 0.5) * cell.z,
                    );
                    if signed_margin(solid, &p) < -self.tolerance {
                        out.push(transform.transform_point(&p));
                    }
                }
            }
        }
        out
    }
}

fn bounds_in_parent(tree: &PlacementTree, id: PlacementId) -> Result<Aabb> {
    let node = tree.placement(id)?;
    let solid = &tree.volume(node.volume)?.solid;
    Ok(BoundingBox::new(solid).execute().transformed(&node.transform))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeBox;
    use crate::placement::VolumeDescriptor;

    fn tree_with(offsets: &[(f64, f64)]) -> (PlacementTree, Vec<PlacementId>) {
        let world = VolumeDescriptor::new("World", MakeBox::new(10.0, 10.0, 10.0).execute().unwrap(), "G4_AIR");
        let mut tree = PlacementTree::new(world);
        let root = tree.root().unwrap();
        let v = tree.add_volume(VolumeDescriptor::new(
            "Cube",
            MakeBox::new(1.0, 1.0, 1.0).execute().unwrap(),
            "Copper",
        ));
        let ids = offsets
            .iter()
            .enumerate()
            .map(|(i, (x, y))| {
                tree.place(v, root, format!("Cube_{i}"), Transform::translation(*x, *y, 0.0), 0)
                    .unwrap()
            })
            .collect();
        (tree, ids)
    }

    #[test]
    fn separated_siblings_are_clean() {
        let (tree, _) = tree_with(&[(-3.0, 0.0), (3.0, 0.0)]);
        let report = CheckOverlaps::new(&tree).execute().unwrap();
        assert_eq!(report.checked, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn touching_siblings_are_clean() {
        let (tree, _) = tree_with(&[(-1.0, 0.0), (1.0, 0.0)]);
        assert!(CheckOverlaps::new(&tree).execute().unwrap().is_clean());
    }

    #[test]
    fn interpenetrating_siblings_are_reported_both_ways() {
        let (tree, ids) = tree_with(&[(0.0, 0.0), (1.0, 0.0)]);
        let report = CheckOverlaps::new(&tree).execute().unwrap();
        assert_eq!(report.overlaps.len(), 2);
        assert_eq!(report.overlaps[0].kind, OverlapKind::Sibling(ids[1]));
        assert!(report.overlaps[0].depth > 0.5);
    }

    #[test]
    fn protrusion_from_mother_is_reported() {
        let (tree, ids) = tree_with(&[(9.5, 0.0)]);
        let report = CheckOverlaps::new(&tree).execute().unwrap();
        assert_eq!(report.overlaps.len(), 1);
        assert_eq!(report.overlaps[0].placement, ids[0]);
        assert_eq!(report.overlaps[0].kind, OverlapKind::Protrusion);
    }
}
