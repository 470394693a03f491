use std::io::Write;

use crate::error::Result;

use super::PlacementTree;

/// Writes one line per placement, parents first:
/// `placement-name volume-name parent-volume-name`.
///
/// The root has `-` as its parent volume.
///
/// # Errors
///
/// Returns an error if writing fails or the tree references a missing entity.
pub fn write_hierarchy<W: Write>(tree: &PlacementTree, out: &mut W) -> Result<()> {
    for id in tree.depth_first() {
        let node = tree.placement(id)?;
        let volume = &tree.volume(node.volume)?.name;
        let parent = match node.parent {
            Some(p) => tree.volume(tree.placement(p)?.volume)?.name.as_str(),
            None => "-",
        };
        writeln!(out, "{} {} {}", node.name, volume, parent)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Transform;
    use crate::operations::creation::MakeBox;
    use crate::placement::VolumeDescriptor;

    #[test]
    fn one_line_per_placement() {
        let world = VolumeDescriptor::new("WorldVolume", MakeBox::new(5.0, 5.0, 5.0).execute().unwrap(), "G4_AIR");
        let mut tree = PlacementTree::new(world);
        let root = tree.root().unwrap();
        let v = tree.add_volume(VolumeDescriptor::new(
            "TankVolume",
            MakeBox::new(1.0, 1.0, 1.0).execute().unwrap(),
            "Water",
        ));
        tree.place(v, root, "Water_Tank", Transform::identity(), 0).unwrap();
        let mut buf = Vec::new();
        write_hierarchy(&tree, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "WorldVolume WorldVolume -\nWater_Tank TankVolume WorldVolume\n");
    }
}
