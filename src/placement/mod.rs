//! The hierarchy of placed volumes.
//!
//! A [`PlacementTree`] owns volume descriptors and placement nodes in two
//! arenas keyed by generational ids. Every node except the root has exactly
//! one parent, fixed when the node is created; nodes are never re-parented,
//! so the hierarchy cannot contain cycles.

mod dump;
mod overlap;
mod volume;

pub use dump::write_hierarchy;
pub use overlap::{CheckOverlaps, Overlap, OverlapKind, OverlapReport};
pub use volume::{Rgba, VisAttributes, VolumeDescriptor, VolumeId};

use std::collections::HashSet;

use serde::Serialize;
use slotmap::SlotMap;
use tracing::debug;

use crate::array::ArrayLayout;
use crate::error::{PlacementError, Result};
use crate::math::Transform;

slotmap::new_key_type! {
    /// Unique identifier for a placement node in the placement tree.
    pub struct PlacementId;
}

/// One placed instance of a volume.
#[derive(Debug, Clone)]
pub struct PlacementNode {
    /// Placement name, e.g. `Copper_FieldShaperRing_3`.
    pub name: String,
    /// The volume placed.
    pub volume: VolumeId,
    /// Enclosing placement, `None` for the root.
    pub parent: Option<PlacementId>,
    /// Position in the parent volume's frame.
    pub transform: Transform,
    /// Index among bulk-instanced siblings.
    pub copy_number: u32,
    children: Vec<PlacementId>,
}

/// Surface model attached to an interface between two placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpticalSurface {
    LXeTeflon,
    LXeTeflonUnpolished,
    GXeTeflon,
    GXeTeflonUnpolished,
    WaterSteel,
    WaterTyvek,
}

/// An optical interface from one placement into an adjacent one.
#[derive(Debug, Clone, PartialEq)]
pub struct OpticalBoundary {
    pub name: String,
    pub from: PlacementId,
    pub to: PlacementId,
    pub surface: OpticalSurface,
}

/// Arena of volumes and the tree of their placements.
#[derive(Debug)]
pub struct PlacementTree {
    volumes: SlotMap<VolumeId, VolumeDescriptor>,
    placements: SlotMap<PlacementId, PlacementNode>,
    root: Option<PlacementId>,
    boundaries: Vec<OpticalBoundary>,
}

impl PlacementTree {
    /// Creates a tree whose root is `world`, placed at the origin.
    #[must_use]
    pub fn new(world: VolumeDescriptor) -> Self {
        let mut volumes = SlotMap::with_key();
        let mut placements = SlotMap::with_key();
        let name = world.name.clone();
        let volume = volumes.insert(world);
        let root = placements.insert(PlacementNode {
            name,
            volume,
            parent: None,
            transform: Transform::identity(),
            copy_number: 0,
            children: Vec::new(),
        });
        Self {
            volumes,
            placements,
            root: Some(root),
            boundaries: Vec::new(),
        }
    }

    /// The root placement; `None` once the root has been removed.
    #[must_use]
    pub fn root(&self) -> Option<PlacementId> {
        self.root
    }

    /// Inserts a volume descriptor and returns its ID.
    pub fn add_volume(&mut self, volume: VolumeDescriptor) -> VolumeId {
        self.volumes.insert(volume)
    }

    /// Returns the volume descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume is not in the tree.
    pub fn volume(&self, id: VolumeId) -> Result<&VolumeDescriptor> {
        self.volumes
            .get(id)
            .ok_or_else(|| PlacementError::EntityNotFound("volume".into()).into())
    }

    /// Returns the placement node.
    ///
    /// # Errors
    ///
    /// Returns an error if the placement is not in the tree.
    pub fn placement(&self, id: PlacementId) -> Result<&PlacementNode> {
        self.placements
            .get(id)
            .ok_or_else(|| PlacementError::EntityNotFound("placement".into()).into())
    }

    /// Places `volume` inside `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if either the volume or the parent does not exist.
    pub fn place(
        &mut self,
        volume: VolumeId,
        parent: PlacementId,
        name: impl Into<String>,
        transform: Transform,
        copy_number: u32,
    ) -> Result<PlacementId> {
        self.volume(volume)?;
        self.placement(parent)?;
        let id = self.placements.insert(PlacementNode {
            name: name.into(),
            volume,
            parent: Some(parent),
            transform,
            copy_number,
            children: Vec::new(),
        });
        if let Some(node) = self.placements.get_mut(parent) {
            node.children.push(id);
        }
        Ok(id)
    }

    /// Places one copy of `volume` per member of `layout`.
    ///
    /// Member `i` is named `{prefix}_{first_copy + i}`, carries copy number
    /// `first_copy + i` and is positioned at `member(i) ∘ local`.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume or the parent does not exist, or the
    /// layout cannot produce a member.
    pub fn place_array(
        &mut self,
        volume: VolumeId,
        parent: PlacementId,
        prefix: &str,
        layout: &impl ArrayLayout,
        local: Transform,
        first_copy: u32,
    ) -> Result<Vec<PlacementId>> {
        let members = layout.members()?;
        let mut ids = Vec::with_capacity(members.len());
        for (copy, member) in (first_copy..).zip(members) {
            let id = self.place(
                volume,
                parent,
                format!("{prefix}_{copy}"),
                member.compose(&local),
                copy,
            )?;
            ids.push(id);
        }
        debug!(prefix, count = ids.len(), "array placed");
        Ok(ids)
    }

    /// Parent of `id`, `None` for the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the placement does not exist.
    pub fn parent(&self, id: PlacementId) -> Result<Option<PlacementId>> {
        Ok(self.placement(id)?.parent)
    }

    /// Direct children of `id` in placement order.
    ///
    /// # Errors
    ///
    /// Returns an error if the placement does not exist.
    pub fn children(&self, id: PlacementId) -> Result<&[PlacementId]> {
        Ok(&self.placement(id)?.children)
    }

    /// Every placement reachable from the root, parents before children.
    #[must_use]
    pub fn depth_first(&self) -> Vec<PlacementId> {
        let mut out = Vec::with_capacity(self.placements.len());
        let mut stack: Vec<PlacementId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.placements.get(id) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Transform from the local frame of `id` to the world frame.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` or one of its ancestors does not exist.
    pub fn world_transform(&self, id: PlacementId) -> Result<Transform> {
        let mut node = self.placement(id)?;
        let mut transform = node.transform;
        while let Some(parent) = node.parent {
            node = self.placement(parent)?;
            transform = node.transform.compose(&transform);
        }
        Ok(transform)
    }

    /// First placement named `name`, in depth-first order.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<PlacementId> {
        self.depth_first()
            .into_iter()
            .find(|id| self.placements.get(*id).is_some_and(|n| n.name == name))
    }

    /// Number of placements of `volume`.
    #[must_use]
    pub fn copies(&self, volume: VolumeId) -> usize {
        self.placements.values().filter(|n| n.volume == volume).count()
    }

    /// Number of placement nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Returns `true` if the tree holds no placement.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Iterates all volumes.
    pub fn volumes(&self) -> impl Iterator<Item = (VolumeId, &VolumeDescriptor)> {
        self.volumes.iter()
    }

    /// Checks that the hierarchy is a tree rooted at [`root`](Self::root).
    ///
    /// Every node must be reachable exactly once, its `parent` must list it
    /// as a child, and no node may be left dangling outside the tree.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Malformed`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.placements.len());
        for id in self.depth_first() {
            if !seen.insert(id) {
                return Err(malformed(format!("{} is reachable twice", self.label(id))));
            }
            let node = self.placement(id)?;
            if !self.volumes.contains_key(node.volume) {
                return Err(malformed(format!("{} places a missing volume", node.name)));
            }
            match node.parent {
                None if Some(id) != self.root => {
                    return Err(malformed(format!("{} has no parent", node.name)));
                }
                Some(parent) => {
                    let listed = self
                        .placements
                        .get(parent)
                        .is_some_and(|p| p.children.contains(&id));
                    if !listed {
                        return Err(malformed(format!("{} is not listed by its parent", node.name)));
                    }
                }
                None => {}
            }
        }
        if seen.len() != self.placements.len() {
            return Err(malformed(format!(
                "{} placements are not reachable from the root",
                self.placements.len() - seen.len()
            )));
        }
        Ok(())
    }

    /// Removes `id` and everything placed inside it, together with the
    /// optical boundaries that touch a removed node. Returns the number of
    /// placements removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the placement does not exist.
    pub fn remove_subtree(&mut self, id: PlacementId) -> Result<usize> {
        let parent = self.placement(id)?.parent;
        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.placements.remove(next) {
                stack.extend(node.children);
                removed.push(next);
            }
        }
        match parent {
            Some(p) => {
                if let Some(node) = self.placements.get_mut(p) {
                    node.children.retain(|c| *c != id);
                }
            }
            None => self.root = None,
        }
        self.boundaries
            .retain(|b| !removed.contains(&b.from) && !removed.contains(&b.to));
        Ok(removed.len())
    }

    /// Records an optical interface from placement `from` into `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if either placement does not exist.
    pub fn add_border_surface(
        &mut self,
        name: impl Into<String>,
        from: PlacementId,
        to: PlacementId,
        surface: OpticalSurface,
    ) -> Result<()> {
        self.placement(from)?;
        self.placement(to)?;
        self.boundaries.push(OpticalBoundary {
            name: name.into(),
            from,
            to,
            surface,
        });
        Ok(())
    }

    /// Optical interfaces in creation order.
    #[must_use]
    pub fn boundaries(&self) -> &[OpticalBoundary] {
        &self.boundaries
    }

    fn label(&self, id: PlacementId) -> String {
        self.placements
            .get(id)
            .map_or_else(|| "placement".to_owned(), |n| n.name.clone())
    }
}

fn malformed(message: String) -> crate::error::GeoError {
    PlacementError::Malformed(message).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::array::RingStack;
    use crate::math::{Point3, DEG};
    use crate::operations::creation::{MakeBox, MakeTube};
    use approx::assert_relative_eq;

    fn world() -> VolumeDescriptor {
        VolumeDescriptor::new("World", MakeBox::new(100.0, 100.0, 100.0).execute().unwrap(), "G4_AIR")
    }

    fn small_box() -> VolumeDescriptor {
        VolumeDescriptor::new("Box", MakeBox::new(1.0, 1.0, 1.0).execute().unwrap(), "Copper")
    }

    #[test]
    fn place_and_query() {
        let mut tree = PlacementTree::new(world());
        let root = tree.root().unwrap();
        let v = tree.add_volume(small_box());
        let a = tree.place(v, root, "A", Transform::translation(1.0, 0.0, 0.0), 0).unwrap();
        let b = tree.place(v, a, "B", Transform::translation(0.0, 2.0, 0.0), 0).unwrap();
        assert_eq!(tree.parent(b).unwrap(), Some(a));
        assert_eq!(tree.children(root).unwrap(), &[a]);
        assert_eq!(tree.depth_first(), vec![root, a, b]);
        assert_eq!(tree.find("B"), Some(b));
        assert_eq!(tree.copies(v), 2);
        tree.validate().unwrap();
    }

    #[test]
    fn world_transform_chains_parents() {
        let mut tree = PlacementTree::new(world());
        let root = tree.root().unwrap();
        let v = tree.add_volume(small_box());
        let a = tree
            .place(v, root, "A", Transform::rotation_z(90.0 * DEG).with_translation(10.0, 0.0, 0.0), 0)
            .unwrap();
        let b = tree.place(v, a, "B", Transform::translation(1.0, 0.0, 0.0), 0).unwrap();
        let p = tree.world_transform(b).unwrap().transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(10.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn array_members_are_named_by_copy_number() {
        let mut tree = PlacementTree::new(world());
        let root = tree.root().unwrap();
        let v = tree.add_volume(small_box());
        let ids = tree
            .place_array(v, root, "Ring", &RingStack::new(3, 10.0, 5.0), Transform::identity(), 7)
            .unwrap();
        assert_eq!(ids.len(), 3);
        let last = tree.placement(ids[2]).unwrap();
        assert_eq!(last.name, "Ring_9");
        assert_eq!(last.copy_number, 9);
        assert_relative_eq!(last.transform.translation.z, 0.0);
    }

    #[test]
    fn removing_a_branch_keeps_the_rest_valid() {
        let mut tree = PlacementTree::new(world());
        let root = tree.root().unwrap();
        let v = tree.add_volume(small_box());
        let a = tree.place(v, root, "A", Transform::identity(), 0).unwrap();
        let b = tree.place(v, a, "B", Transform::identity(), 0).unwrap();
        let c = tree.place(v, root, "C", Transform::identity(), 0).unwrap();
        tree.add_border_surface("AB", a, b, OpticalSurface::LXeTeflon).unwrap();
        tree.add_border_surface("RC", root, c, OpticalSurface::LXeTeflon).unwrap();
        assert_eq!(tree.remove_subtree(a).unwrap(), 2);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.boundaries().len(), 1);
        assert!(tree.placement(b).is_err());
        tree.validate().unwrap();
    }

    #[test]
    fn removing_the_root_empties_the_tree() {
        let mut tree = PlacementTree::new(world());
        let root = tree.root().unwrap();
        let v = tree.add_volume(small_box());
        let a = tree.place(v, root, "A", Transform::identity(), 0).unwrap();
        tree.place(v, a, "B", Transform::identity(), 0).unwrap();
        assert_eq!(tree.remove_subtree(root).unwrap(), 3);
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert!(tree.depth_first().is_empty());
        tree.validate().unwrap();
    }

    #[test]
    fn placing_into_a_removed_parent_fails() {
        let mut tree = PlacementTree::new(world());
        let root = tree.root().unwrap();
        let v = tree.add_volume(small_box());
        let a = tree.place(v, root, "A", Transform::identity(), 0).unwrap();
        tree.remove_subtree(a).unwrap();
        assert!(tree.place(v, a, "B", Transform::identity(), 0).is_err());
    }

    #[test]
    fn sensitive_tag_and_vis_are_kept() {
        let mut tree = PlacementTree::new(world());
        let tube = MakeTube::new(0.0, 1.0, 1.0).execute().unwrap();
        let v = tree.add_volume(
            VolumeDescriptor::new("LXe", tube, "LXe")
                .with_sensitive("detgeo/LXeSD")
                .with_vis(VisAttributes::hidden(Rgba::LXE)),
        );
        let desc = tree.volume(v).unwrap();
        assert_eq!(desc.sensitive.as_deref(), Some("detgeo/LXeSD"));
        assert!(!desc.vis.visible);
    }
}
