use crate::config::{DetectorConfig, PmtPattern};
use crate::error::Result;
use crate::math::{DEG, MM};

use super::ParameterStore;

/// Inserts a group of literal values in order.
fn define_all(store: &mut ParameterStore, values: &[(&str, f64)]) -> Result<()> {
    for &(name, value) in values {
        store.define(name, value)?;
    }
    Ok(())
}

/// Fills `store` with every value the detector assembly reads.
///
/// Lengths are room-temperature drawing values; the PTFE shrinkage
/// coefficients are applied by the builders, not here.
///
/// # Errors
///
/// Returns an error if a derived value references a name defined later or
/// evaluates to a non-finite number.
pub fn define_detector_parameters(store: &mut ParameterStore, config: &DetectorConfig) -> Result<()> {
    define_shielding(store)?;
    define_cryostats(store)?;
    define_tpc(store, config)?;
    tracing::debug!(count = store.len(), "detector parameters defined");
    Ok(())
}

fn define_shielding(store: &mut ParameterStore) -> Result<()> {
    define_all(
        store,
        &[
            ("WorldHalfLength", 6000.0 * MM),
            ("WaterTankOuterRadius", 4800.0 * MM),
            ("WaterTankHeight", 10200.0 * MM),
            ("WaterTankThickness", 5.0 * MM),
            // veto panels
            ("VetoPanelThickness", 10.0 * MM),
            ("VetoPanelWidth", 800.0 * MM),
            ("VetoPanelHeight", 1800.0 * MM),
            ("VetoRows", 4.0),
            ("VetoRowPitch", 2200.0 * MM),
            ("VetoBottomZ", -3895.0 * MM),
            ("VetoCylinderRadius", 4500.0 * MM),
            ("VetoCylinderPanelsPerRow", 24.0),
            ("VetoBoxHalfX", 4000.0 * MM),
            ("VetoBoxHalfY", 3200.0 * MM),
            ("VetoBoxColumns", 5.0),
            ("VetoOctagonApothem", 4200.0 * MM),
            ("VetoOctagonColumns", 3.0),
            ("VetoColumnPitch", 1000.0 * MM),
            // support lattice
            ("SupportLegs", 4.0),
            ("SupportLegRadius", 2000.0 * MM),
            ("SupportFloorLegLength", 3165.0 * MM),
            ("SupportTiltedLegLength", 1500.0 * MM),
            ("SupportTilt", 10.0 * DEG),
            ("SupportAzimuthOffset", 45.0 * DEG),
            ("SupportBeamHalfWidth", 75.0 * MM),
            ("SupportBeamWall", 6.0 * MM),
            ("SupportBraceHeight", 1500.0 * MM),
            ("SupportRingRadius", 1100.0 * MM),
            ("SupportRodRadius", 10.0 * MM),
            // calibration source capsule
            ("CalSourceRadius", 10.0 * MM),
            ("CalSourceHalfHeight", 15.0 * MM),
            ("CalSourceClearance", 100.0 * MM),
            ("CalSourceSideDistance", 150.0 * MM),
        ],
    )?;
    store.derive("WaterTankInnerRadius", |s| {
        Ok(s.get("WaterTankOuterRadius")? - s.get("WaterTankThickness")?)
    })?;
    store.derive("WaterHalfHeight", |s| {
        Ok(0.5 * s.get("WaterTankHeight")? - s.get("WaterTankThickness")?)
    })?;
    Ok(())
}

fn define_cryostats(store: &mut ParameterStore) -> Result<()> {
    define_all(
        store,
        &[
            ("OuterCryostatOuterDiameter", 1960.0 * MM),
            ("OuterCryostatCylinderHeight", 2600.0 * MM),
            ("OuterCryostatR0top", 1600.0 * MM),
            ("OuterCryostatR1top", 300.0 * MM),
            ("OuterCryostatR0bot", 1600.0 * MM),
            ("OuterCryostatR1bot", 300.0 * MM),
            ("OuterCryostatThickness", 5.0 * MM),
            ("OuterCryostatThicknessTop", 5.0 * MM),
            ("OuterCryostatThicknessBot", 5.0 * MM),
            ("OuterCryostatFlangeZ", 1100.0 * MM),
            ("OuterCryostatFlangeHeight", 60.0 * MM),
            ("OuterCryostatFlangeThickness", 45.0 * MM),
            ("OuterCryostatRingsZ1", -700.0 * MM),
            ("OuterCryostatRingsZ2", 300.0 * MM),
            ("OuterCryostatRingsHeight", 20.0 * MM),
            ("OuterCryostatRingsThickness", 30.0 * MM),
            ("OuterCryostatOffsetZ", 0.0 * MM),
            ("InnerCryostatOuterDiameter", 1630.0 * MM),
            ("InnerCryostatCylinderHeight", 2000.0 * MM),
            ("InnerCryostatR0top", 1309.0 * MM),
            ("InnerCryostatR1top", 256.0 * MM),
            ("InnerCryostatR0bot", 1309.0 * MM),
            ("InnerCryostatR1bot", 256.0 * MM),
            ("InnerCryostatThickness", 5.0 * MM),
            ("InnerCryostatThicknessTop", 5.0 * MM),
            ("InnerCryostatThicknessBot", 5.0 * MM),
            ("InnerCryostatFlangeZ", 800.0 * MM),
            ("InnerCryostatFlangeHeight", 60.0 * MM),
            ("InnerCryostatFlangeThickness", 40.0 * MM),
            ("InnerCryostatRingsZ", -500.0 * MM),
            ("InnerCryostatRingsHeight", 20.0 * MM),
            ("InnerCryostatRingsThickness", 25.0 * MM),
            ("InnerCryostatOffsetZ", -100.0 * MM),
        ],
    )
}

#[allow(clippy::too_many_lines)]
fn define_tpc(store: &mut ParameterStore, config: &DetectorConfig) -> Result<()> {
    define_all(
        store,
        &[
            ("PTFE_ShrinkageZ", 0.014),
            ("PTFE_ShrinkageR", 0.011),
            ("Torlon_ShrinkageZ", 0.0025),
            // bell
            ("BellPlateHeight", 5.0 * MM),
            ("BellPlateDiameter", 1415.0 * MM),
            ("BellPlateTopToIVcylinderTop", 48.681 * MM),
        ],
    )?;
    store.derive("BellPlateOffsetZ", |s| {
        Ok(0.5 * s.get("InnerCryostatCylinderHeight")?
            - s.get("BellPlateTopToIVcylinderTop")?
            - 0.5 * s.get("BellPlateHeight")?)
    })?;
    define_all(
        store,
        &[
            ("BellWallOuterDiameter", 1426.0 * MM),
            ("BellWallHeight", 264.0 * MM),
            ("BellWallThickness", 5.0 * MM),
            ("BellWallBotToGateRingBot", 5.0 * MM),
            ("CopperRingHeight", 10.0 * MM),
            ("CopperRingInnerDiameter", 1364.0 * MM),
        ],
    )?;

    // photosensors
    let top_pmts = match config.top_pmt_pattern {
        PmtPattern::Radial => 225.0,
        PmtPattern::Hexagonal => 253.0,
    };
    store.define("NbOfTopPMTs", top_pmts)?;
    store.define("NbOfBottomPMTs", 241.0)?;
    store.derive("NbOfPMTs", |s| Ok(s.get("NbOfTopPMTs")? + s.get("NbOfBottomPMTs")?))?;
    define_all(
        store,
        &[
            ("PMTheight", 114.0 * MM),
            ("PMTBodyDiameter", 76.0 * MM),
            ("PMTWindowDiameter", 62.0 * MM),
            ("PMTWindowHeight", 1.0 * MM),
            ("TopPmtStemToBases", 8.0 * MM),
            ("PmtBasesDiameter", 35.0 * MM),
            ("PmtBasesHeight", 1.55 * MM),
            ("TopBasesToBottomBellPlate", 37.39 * MM),
            ("TopPTFEholderDiameter", 1370.0 * MM),
            ("TopPTFEholderHeight", 5.1 * MM),
            ("TopPTFEholderTopToPmtBaseBot", 2.15 * MM),
            ("TopPTFEholderHoleDiameter", 39.0 * MM),
            ("TopCopperPlateDiameter", 1412.0 * MM),
            ("TopCopperPlateHeight", 20.0 * MM),
            ("TopCopperPlateTopToPTFEholderBot", 29.9 * MM),
            ("TopCopperPlateHoleDiameter", 79.0 * MM),
            ("TopReflectorDiameter", 1412.0 * MM),
            ("TopReflectorHeight", 8.0 * MM),
            ("TopReflectorTopToCopperPlateBot", 60.0 * MM),
            ("TopReflectorConeHoleDmax", 68.0 * MM),
            ("TopReflectorConeHoleDmin", 64.0 * MM),
            ("TopReflectorConeHoleHeight", 2.0 * MM),
            ("TopReflectorTube1Height", 0.9 * MM),
            ("TopReflectorTube2Diameter", 73.5 * MM),
            ("TopReflectorTube2Height", 0.85 * MM),
            ("TopReflectorTube3Diameter", 78.5 * MM),
            ("TopReflectorTube3Height", 4.25 * MM),
        ],
    )?;

    // electrode rings
    define_all(
        store,
        &[
            ("TopMeshRingHeight", 15.0 * MM),
            ("TopMeshRingWidth", 31.0 * MM),
            ("TopMeshRingInnerDiameter", 1334.0 * MM),
            ("AnodeRingTopToTopMeshRingBot", 10.0 * MM),
            ("TopMeshThickness", 0.216 * MM),
            ("TopMeshDiameter", 1334.0 * MM),
            ("AnodeRingHeight", 18.0 * MM),
            ("AnodeRingWidth", 31.0 * MM),
            ("AnodeRingInnerDiameter", 1334.0 * MM),
            ("GateRingTopToAnodeRingBot", 8.0 * MM),
            ("AnodeMeshDiameter", 1334.0 * MM),
            ("AnodeMeshThickness", 0.216 * MM),
            ("GateRingTotalHeight", 20.0 * MM),
            ("GateRingTotalWidth", 31.0 * MM),
            ("GateRingInnerDiameterMax", 1354.0 * MM),
            ("GateRingInnerDiameterMin", 1334.0 * MM),
            ("GateRingHeightSmallDiamRegion", 9.0 * MM),
            ("GateMeshDiameter", 1334.0 * MM),
            ("GateMeshThickness", 0.216 * MM),
            ("TpcBotToCathodeRingTop", 0.8 * MM),
            ("CathodeRingTubeWidth", 24.0 * MM),
            ("CathodeRingTubeHeight", 10.0 * MM),
            ("CathodeRingTotalHeight", 20.0 * MM),
            ("CathodeRingTorusRadius", 10.0 * MM),
            ("CathodeRingInnerDiameter", 1347.0 * MM),
            ("CathodeMeshDiameter", 1347.0 * MM),
            ("CathodeMeshThickness", 0.3 * MM),
            ("BMringTopToCathodeRingBot", 20.195 * MM),
            ("BMringTubeWidth", 25.0 * MM),
            ("BMringTubeHeight", 7.5 * MM),
            ("BMringTotalHeight", 15.0 * MM),
            ("BMringTorusRadius", 7.5 * MM),
            ("BMringInnerDiameter", 1345.0 * MM),
            ("BottomMeshDiameter", 1345.0 * MM),
            ("BottomMeshThickness", 0.216 * MM),
            ("RingBelowGateHeight", 5.0 * MM),
        ],
    )?;
    store.derive("RingBelowGateInnerDiameter", |s| s.get("CopperRingInnerDiameter"))?;
    store.define("RingBelowGateWidth", 25.5 * MM)?;

    // TPC body
    define_all(
        store,
        &[
            ("TpcWallDiameter", 1328.0 * MM),
            ("TpcWallHeight", 1500.8 * MM),
            ("TpcWallThickness", 3.0 * MM),
            ("TopGateRingToTopTPC", 0.8 * MM),
            ("ThinElectrodesFrameHeight", 14.9 * MM),
            ("ThinElectrodesFrameWidth", 3.0 * MM),
            ("ElectrodesFrameWidth", 36.255 * MM),
            ("FrameTopMeshHeight", 18.3 * MM),
            ("FrameTopMeshToAnodeHeight", 1.2 * MM),
            ("FrameAnodeHeight", 26.8 * MM),
            ("FrameAnodeToGateHeight", 1.2 * MM),
            ("FrameGateHeight", 27.5 * MM),
        ],
    )?;
    store.derive("ElectrodesFrameHeight", |s| {
        Ok(s.get("FrameTopMeshHeight")?
            + s.get("FrameTopMeshToAnodeHeight")?
            + s.get("FrameAnodeHeight")?
            + s.get("FrameAnodeToGateHeight")?
            + s.get("FrameGateHeight")?)
    })?;
    define_all(
        store,
        &[
            ("ElectrodesFrameHeightAboveTMRing", 4.0 * MM),
            ("ElectrodesFrameBetweenRingsInnerR", (664.0 + 11.154) * MM),
            ("ElectrodesFrameAboveGateRingsInnerR", (664.0 + 6.525) * MM),
            ("FrameInletAboveGateRingHeight", 0.5 * MM),
            ("FrameGasFeedthroughRadius", 5.08 * MM),
            ("FrameGasFeedthroughToTopFrame", 9.4 * MM),
            // field cage
            ("NumerOfFieldShaperWires", 72.0),
            ("FieldShaperWireDiameter", 2.0 * MM),
            ("FieldShaperWiresDistance", 22.0 * MM),
            ("FieldShaperWireTopToTpcTop", 10.2 * MM),
            ("NumerOfFieldGuards", 64.0),
            ("FieldGuardsHeight", 15.0 * MM),
            ("FieldGuardsTubeHeight", 10.0 * MM),
            ("FieldGuardsWidth", 5.0 * MM),
            ("FieldGuardsDistance", 22.0 * MM),
            ("TopGuardToTopFieldShaperWire", 59.5 * MM),
            ("GuardToFRSradialDistance", 9.16 * MM),
            // pillars
            ("NumberOfPillars", 24.0),
        ],
    )?;
    store.derive("PillarsDeltaTheta", |s| Ok(360.0 * DEG / s.get("NumberOfPillars")?))?;
    define_all(
        store,
        &[
            ("BottomBoxBase_x", 18.0 * MM),
            ("BottomBoxBase_y", 18.0 * MM),
            ("BottomBox_height", 130.875 * MM),
            ("Trapezoid_y1", 36.0 * MM),
            ("Trapezoid_y2", 49.0 * MM),
            ("Trapezoid_height", 13.0 * MM),
            ("MiddleBoxBase_y", 36.0 * MM),
            ("MiddleBox_height", 1466.91 * MM),
            ("MiddleBox_height_UpToTrapezoid", 1436.63 * MM),
            ("TopBoxBase_y", (682.0 - 664.0 - 3.0) * MM),
            ("TopBox_height", 15.0 * MM),
            ("CuBelowPillarsInnerDiameter", 1400.0 * MM),
            ("CuBelowPillarsWidth", 10.0 * MM),
            ("CuBelowPillarsHeight", 10.0 * MM),
            // below the drift region
            ("BottomTpcTopToTpcBot", 1.507 * MM),
            ("BottomTpcHeight", 53.78 * MM),
            ("BottomTpcWidth", 3.0 * MM),
            ("PTFEAboveCathodeHeight", 15.0 * MM),
            ("PTFEAboveCathodeTopInnerR", 685.5 * MM),
            ("PTFEAboveCathodeTopWidth", 2.0 * MM),
            ("PTFEAboveCathodeBotInnerR", 697.5 * MM),
            ("PTFEAboveCathodeBotWidth", 2.0 * MM),
            ("PTFEAboveCathodeMiddleHeight", 3.0 * MM),
            ("PTFEAboveCathodeBotHeight", 5.0 * MM),
            ("PTFECathodeAngularSeparation", 0.02793),
            ("TeflonBMringWidth", 2.0 * MM),
            ("TeflonBMringInnerD", 1380.5 * MM),
            ("BMringBotToPTFEReflectorTop", 3.905 * MM),
            ("BotReflectorTopToPMTtop", 3.15 * MM),
            ("BotReflectorDiameter", 1395.0 * MM),
            ("BotCopperPlateDiameter", 1420.0 * MM),
            ("BotCopperPlateHeight", 25.0 * MM),
            ("BotPTFEReflectorToBotCopperPlateTop", 56.0 * MM),
            ("BotCopperPlateHoleDiameter", 79.0 * MM),
            ("BotCopperPlateToTopPTFEholder", 28.9 * MM),
        ],
    )?;
    store.derive("GateRingTopToGXeInterface", |s| {
        Ok(0.5 * (1.0 - s.get("PTFE_ShrinkageZ")?) * s.get("GateRingTopToAnodeRingBot")?)
    })?;
    Ok(())
}
