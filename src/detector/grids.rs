use tracing::info;

use crate::error::Result;
use crate::operations::creation::MakeTube;
use crate::placement::{PlacementId, Rgba, VisAttributes, VolumeDescriptor};

use super::{Assembly, XenonVolumes};

/// One electrode mesh, modelled as a thin homogeneous disc.
struct Mesh {
    placement: &'static str,
    volume: &'static str,
    diameter: &'static str,
    thickness: &'static str,
    parent: PlacementId,
    /// Height of the ring face the mesh is stretched on.
    face_z: f64,
    /// `+1` if the mesh lies above that face, `-1` below.
    side: f64,
}

/// Places the five wire meshes on their rings: top screening mesh and anode
/// in the gas, gate, cathode and bottom screening mesh in the liquid.
pub(super) fn build(asm: &mut Assembly<'_>, xenon: &XenonVolumes) -> Result<()> {
    let s = asm.stack;
    let meshes = [
        Mesh {
            placement: "GridMeshAluminium_TopMesh",
            volume: "TopMeshLogicalVolume",
            diameter: "TopMeshDiameter",
            thickness: "TopMeshThickness",
            parent: xenon.gxe,
            face_z: s.top_mesh_ring_z - 0.5 * asm.get("TopMeshRingHeight")?,
            side: 1.0,
        },
        Mesh {
            placement: "GridMeshAluminium_AnodeMesh",
            volume: "AnodeMeshLogicalVolume",
            diameter: "AnodeMeshDiameter",
            thickness: "AnodeMeshThickness",
            parent: xenon.gxe,
            face_z: s.anode_ring_z - 0.5 * asm.get("AnodeRingHeight")?,
            side: 1.0,
        },
        Mesh {
            placement: "GridMeshAluminium_GroundMesh",
            volume: "GroundMeshLogicalVolume",
            diameter: "GateMeshDiameter",
            thickness: "GateMeshThickness",
            parent: xenon.lxe,
            face_z: s.gate_ring_z + 0.5 * asm.get("GateRingTotalHeight")?,
            side: -1.0,
        },
        Mesh {
            placement: "GridMeshAluminium_CathodeMesh",
            volume: "CathodeMeshLogicalVolume",
            diameter: "CathodeMeshDiameter",
            thickness: "CathodeMeshThickness",
            parent: xenon.lxe,
            face_z: s.cathode_ring_z + 0.5 * asm.get("CathodeRingTubeHeight")?,
            side: -1.0,
        },
        Mesh {
            placement: "GridMeshAluminium_BottomMesh",
            volume: "BottomMeshLogicalVolume",
            diameter: "BottomMeshDiameter",
            thickness: "BottomMeshThickness",
            parent: xenon.lxe,
            face_z: s.bm_ring_z - 0.5 * asm.get("BMringTubeHeight")?,
            side: 1.0,
        },
    ];

    for mesh in &meshes {
        let thickness = asm.get(mesh.thickness)?;
        let disc = MakeTube::new(0.0, 0.5 * asm.get(mesh.diameter)?, 0.5 * thickness).execute()?;
        let v = asm.volume(
            "electrode meshes",
            VolumeDescriptor::new(mesh.volume, disc, "GridMesh").with_vis(VisAttributes::visible(Rgba::GRID)),
        )?;
        asm.place_at(v, mesh.parent, mesh.placement, mesh.face_z + mesh.side * 0.5 * thickness)?;
    }
    info!(meshes = meshes.len(), "electrode meshes constructed");
    Ok(())
}
