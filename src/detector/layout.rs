use crate::error::Result;
use crate::params::Parameters;

/// Axial centres of the TPC components in the liquid-xenon frame.
///
/// Every offset is chained from the bell plate downwards (and from the gate
/// ring upwards), so a component moves with the one it rests on. PTFE
/// heights and gaps are scaled by the cold shrinkage factor.
#[derive(Debug, Clone, PartialEq)]
pub struct TpcStack {
    /// `1 - PTFE_ShrinkageZ`.
    pub shrink_z: f64,
    /// `1 - PTFE_ShrinkageR`.
    pub shrink_r: f64,

    pub bell_plate_z: f64,
    pub bell_wall_z: f64,
    pub copper_ring_z: f64,
    pub ring_below_gate_z: f64,
    pub ring_below_gate_height: f64,
    pub gate_ring_z: f64,
    pub anode_ring_z: f64,
    pub top_mesh_ring_z: f64,
    /// Height of the liquid surface.
    pub liquid_level_z: f64,

    pub top_bases_z: f64,
    pub top_pmt_z: f64,
    pub top_holder_z: f64,
    pub top_copper_z: f64,
    pub top_reflector_z: f64,

    pub frame_z: f64,
    pub frame_height: f64,
    /// Part of the electrode frame below the liquid surface.
    pub frame_liquid_height: f64,

    pub tpc_z: f64,
    pub tpc_height: f64,
    pub fsr_top_z: f64,
    pub fsr_pitch: f64,
    pub guard_top_z: f64,
    pub guard_pitch: f64,
    pub pillar_z: f64,

    pub bottom_tpc_z: f64,
    pub bottom_tpc_height: f64,
    pub cathode_ring_z: f64,
    pub cathode_frame_z: f64,
    pub bm_ring_z: f64,
    pub ring_below_bm_z: f64,
    pub ring_below_bm_height: f64,

    pub bottom_reflector_z: f64,
    pub bottom_pmt_z: f64,
    pub bottom_bases_z: f64,
    pub bottom_copper_z: f64,
    pub bottom_holder_z: f64,
    pub lower_ring_z: f64,
}

impl TpcStack {
    /// Computes the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if a required parameter is undefined.
    #[allow(clippy::too_many_lines)]
    pub fn from_params(p: &Parameters) -> Result<Self> {
        let shrink_z = 1.0 - p.get("PTFE_ShrinkageZ")?;
        let shrink_r = 1.0 - p.get("PTFE_ShrinkageR")?;

        let bell_plate_h = p.get("BellPlateHeight")?;
        let bell_wall_h = p.get("BellWallHeight")?;
        let cu_ring_h = p.get("CopperRingHeight")?;
        let gate_h = p.get("GateRingTotalHeight")?;
        let anode_h = p.get("AnodeRingHeight")?;
        let top_mesh_ring_h = p.get("TopMeshRingHeight")?;

        let bell_plate_z = p.get("BellPlateOffsetZ")?;
        let bell_wall_z = bell_plate_z + 0.5 * bell_plate_h - 0.5 * bell_wall_h;
        let copper_ring_z = bell_wall_z - 0.5 * bell_wall_h - 0.5 * cu_ring_h;
        let ring_below_gate_height = shrink_z * p.get("RingBelowGateHeight")?;
        let ring_below_gate_z = copper_ring_z + 0.5 * cu_ring_h + 0.5 * ring_below_gate_height;
        let gate_ring_z = copper_ring_z + 0.5 * cu_ring_h + ring_below_gate_height + 0.5 * gate_h;
        let gate_top = gate_ring_z + 0.5 * gate_h;
        let anode_ring_z = gate_top + shrink_z * p.get("GateRingTopToAnodeRingBot")? + 0.5 * anode_h;
        let top_mesh_ring_z = anode_ring_z
            + 0.5 * anode_h
            + shrink_z * p.get("AnodeRingTopToTopMeshRingBot")?
            + 0.5 * top_mesh_ring_h;
        let interface = p.get("GateRingTopToGXeInterface")?;
        let liquid_level_z = gate_top + interface;

        let bases_h = p.get("PmtBasesHeight")?;
        let pmt_h = p.get("PMTheight")?;
        let holder_h = p.get("TopPTFEholderHeight")?;
        let copper_h = p.get("TopCopperPlateHeight")?;
        let reflector_h = p.get("TopReflectorHeight")?;
        let stem = p.get("TopPmtStemToBases")?;
        let top_bases_z =
            bell_plate_z - 0.5 * (bell_plate_h + bases_h) - p.get("TopBasesToBottomBellPlate")?;
        let top_pmt_z = top_bases_z - stem - 0.5 * (bases_h + pmt_h);
        let top_holder_z =
            top_bases_z - 0.5 * (bases_h + holder_h) - p.get("TopPTFEholderTopToPmtBaseBot")?;
        let top_copper_z =
            top_holder_z - 0.5 * (holder_h + copper_h) - p.get("TopCopperPlateTopToPTFEholderBot")?;
        let top_reflector_z =
            top_copper_z - 0.5 * (copper_h + reflector_h) - p.get("TopReflectorTopToCopperPlateBot")?;

        let frame_height =
            shrink_z * (p.get("ElectrodesFrameHeight")? + p.get("ThinElectrodesFrameHeight")?);
        let frame_bottom = gate_ring_z - 0.5 * gate_h + (1.0 - shrink_z) * gate_h;
        let frame_z = frame_bottom + 0.5 * frame_height;
        let frame_liquid_height = interface + gate_h - (1.0 - shrink_z) * gate_h;

        let tpc_height = shrink_z * p.get("TpcWallHeight")?;
        let tpc_z = gate_top - p.get("TopGateRingToTopTPC")? - 0.5 * tpc_height;
        let tpc_bottom = tpc_z - 0.5 * tpc_height;
        let wire_radius = 0.5 * p.get("FieldShaperWireDiameter")?;
        let fsr_top_z =
            tpc_z + 0.5 * tpc_height - shrink_z * p.get("FieldShaperWireTopToTpcTop")? - wire_radius;
        let fsr_pitch = shrink_z * p.get("FieldShaperWiresDistance")?;
        let guard_top_z = fsr_top_z + wire_radius
            - shrink_z * p.get("TopGuardToTopFieldShaperWire")?
            - 0.5 * p.get("FieldGuardsHeight")?;
        let guard_pitch = shrink_z * p.get("FieldGuardsDistance")?;
        let pillar_z = gate_ring_z
            - 0.5 * gate_h
            - shrink_z * p.get("TopBox_height")?
            - 0.5 * shrink_z * p.get("MiddleBox_height")?;

        let bottom_tpc_height = shrink_z * p.get("BottomTpcHeight")?;
        let bottom_tpc_z =
            tpc_bottom - shrink_z * p.get("BottomTpcTopToTpcBot")? - 0.5 * bottom_tpc_height;
        let cathode_tube_h = p.get("CathodeRingTubeHeight")?;
        let cathode_h = p.get("CathodeRingTotalHeight")?;
        let cathode_ring_z = tpc_bottom - shrink_z * p.get("TpcBotToCathodeRingTop")? - 0.5 * cathode_tube_h;
        let cathode_frame_z = cathode_ring_z + 0.5 * cathode_tube_h - p.get("PTFEAboveCathodeBotHeight")?
            + 0.5 * p.get("PTFEAboveCathodeHeight")?;
        let bm_tube_h = p.get("BMringTubeHeight")?;
        let bm_h = p.get("BMringTotalHeight")?;
        let bm_ring_z = cathode_ring_z
            - 0.5 * cathode_tube_h
            - (cathode_h - cathode_tube_h)
            - shrink_z * p.get("BMringTopToCathodeRingBot")?
            - (bm_h - bm_tube_h)
            - 0.5 * bm_tube_h;
        let bm_bottom = bm_ring_z - 0.5 * bm_tube_h;
        let ring_below_bm_height = shrink_z * p.get("BMringBotToPTFEReflectorTop")?;
        let ring_below_bm_z = bm_bottom - 0.5 * ring_below_bm_height;

        let bottom_reflector_z = bm_bottom - ring_below_bm_height - 0.5 * reflector_h;
        let bottom_pmt_z =
            bottom_reflector_z + 0.5 * reflector_h - p.get("BotReflectorTopToPMTtop")? - 0.5 * pmt_h;
        let bottom_bases_z = bottom_pmt_z - 0.5 * pmt_h - stem - 0.5 * bases_h;
        let bot_copper_h = p.get("BotCopperPlateHeight")?;
        let bottom_copper_z = bottom_reflector_z
            - 0.5 * reflector_h
            - p.get("BotPTFEReflectorToBotCopperPlateTop")?
            - 0.5 * bot_copper_h;
        let bottom_holder_z = bottom_copper_z
            - 0.5 * bot_copper_h
            - p.get("BotCopperPlateToTopPTFEholder")?
            - 0.5 * holder_h;
        let lower_ring_z = bottom_copper_z + 0.5 * bot_copper_h + 0.5 * p.get("CuBelowPillarsHeight")?;

        Ok(Self {
            shrink_z,
            shrink_r,
            bell_plate_z,
            bell_wall_z,
            copper_ring_z,
            ring_below_gate_z,
            ring_below_gate_height,
            gate_ring_z,
            anode_ring_z,
            top_mesh_ring_z,
            liquid_level_z,
            top_bases_z,
            top_pmt_z,
            top_holder_z,
            top_copper_z,
            top_reflector_z,
            frame_z,
            frame_height,
            frame_liquid_height,
            tpc_z,
            tpc_height,
            fsr_top_z,
            fsr_pitch,
            guard_top_z,
            guard_pitch,
            pillar_z,
            bottom_tpc_z,
            bottom_tpc_height,
            cathode_ring_z,
            cathode_frame_z,
            bm_ring_z,
            ring_below_bm_z,
            ring_below_bm_height,
            bottom_reflector_z,
            bottom_pmt_z,
            bottom_bases_z,
            bottom_copper_z,
            bottom_holder_z,
            lower_ring_z,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;
    use crate::params::{define_detector_parameters, ParameterStore};
    use approx::assert_relative_eq;

    fn stack() -> TpcStack {
        let mut store = ParameterStore::new();
        define_detector_parameters(&mut store, &DetectorConfig::default()).unwrap();
        TpcStack::from_params(&store.freeze()).unwrap()
    }

    #[test]
    fn bell_chain() {
        let s = stack();
        assert_relative_eq!(s.bell_plate_z, 948.819, epsilon = 1e-9);
        assert_relative_eq!(s.bell_wall_z, 819.319, epsilon = 1e-9);
        assert_relative_eq!(s.copper_ring_z, 682.319, epsilon = 1e-9);
        assert_relative_eq!(s.gate_ring_z, 682.319 + 5.0 + 0.986 * 5.0 + 10.0, epsilon = 1e-9);
    }

    #[test]
    fn liquid_surface_between_gate_and_anode() {
        let s = stack();
        assert!(s.liquid_level_z > s.gate_ring_z + 10.0);
        assert!(s.liquid_level_z < s.anode_ring_z - 9.0);
    }

    #[test]
    fn vertical_order() {
        let s = stack();
        let order = [
            s.bell_plate_z,
            s.top_bases_z,
            s.top_pmt_z,
            s.top_reflector_z,
            s.top_mesh_ring_z,
            s.anode_ring_z,
            s.gate_ring_z,
            s.copper_ring_z,
            s.tpc_z,
            s.cathode_ring_z,
            s.bm_ring_z,
            s.bottom_reflector_z,
            s.bottom_pmt_z,
            s.bottom_copper_z,
            s.bottom_holder_z,
            s.bottom_bases_z,
        ];
        assert!(order.windows(2).all(|w| w[0] > w[1]), "{order:?}");
    }

    #[test]
    fn top_pmt_window_sits_in_reflector() {
        let s = stack();
        let window = s.top_pmt_z - 57.0;
        assert!(window > s.top_reflector_z - 4.0);
        assert!(window < s.top_reflector_z + 4.0);
    }

    #[test]
    fn frame_splits_at_liquid_surface() {
        let s = stack();
        let bottom = s.frame_z - 0.5 * s.frame_height;
        assert_relative_eq!(bottom + s.frame_liquid_height, s.liquid_level_z, epsilon = 1e-9);
    }
}
