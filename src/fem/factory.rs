//! Builds the structural model for one segment in one support condition

use super::beam_chain::{BeamChainModel, BeamSection};
use super::{FemModel, JointId};
use crate::error::AnalysisResult;
use crate::loads::LoadCaseId;
use crate::poi::PoiId;
use log::debug;
use std::collections::HashMap;

/// Base of the reserved negative ID range for unit-load influence channels.
/// Each registered point of interest takes the next two IDs below the base.
const UNIT_LOAD_BASE: i64 = -1000;

/// Everything the factory needs to build one model. The manager assembles
/// this from the collaborator traits so the factory stays purely structural.
#[derive(Debug, Clone)]
pub struct SegmentModelBlueprint {
    pub segment_length: f64,
    /// Distance from the left segment end to the left support.
    pub left_support: f64,
    /// Distance from the right segment end to the right support.
    pub right_support: f64,
    /// Concrete modulus during the modeled interval.
    pub e: f64,
    pub area: f64,
    pub ixx: f64,
    /// Self weight per unit length, positive magnitude.
    pub self_weight: f64,
    /// On-segment points of interest to register as joints.
    pub pois: Vec<(PoiId, f64)>,
}

/// A freshly built model plus the joint and influence-channel bookkeeping
/// the manager keeps alongside it.
pub struct BuiltModel {
    pub model: BeamChainModel,
    pub poi_joints: HashMap<PoiId, JointId>,
    pub unit_load_cases: HashMap<PoiId, LoadCaseId>,
    pub unit_moment_cases: HashMap<PoiId, LoadCaseId>,
}

pub struct SegmentModelFactory;

impl SegmentModelFactory {
    /// Build the beam chain: supports per the blueprint, a joint at every
    /// point of interest, girder self weight applied over the full length,
    /// and a pair of unit-load influence channels per point of interest.
    pub fn build(
        blueprint: &SegmentModelBlueprint,
        girder_case: LoadCaseId,
    ) -> AnalysisResult<BuiltModel> {
        let length = blueprint.segment_length;
        debug!(
            "Building segment model: length {length}, supports at {} and {}",
            blueprint.left_support,
            length - blueprint.right_support
        );

        let section = BeamSection {
            e: blueprint.e,
            a: blueprint.area,
            i: blueprint.ixx,
        };
        let supports = [blueprint.left_support, length - blueprint.right_support];
        let mut model = BeamChainModel::new(length, section, &supports)?;

        let mut poi_joints = HashMap::new();
        for (id, x) in &blueprint.pois {
            poi_joints.insert(*id, model.add_joint(*x));
        }

        model.create_loading(girder_case);
        let w = blueprint.self_weight;
        model.add_linear_load(girder_case, 0.0, length, -w, -w);

        let mut unit_load_cases = HashMap::new();
        let mut unit_moment_cases = HashMap::new();
        for (index, (id, x)) in blueprint.pois.iter().enumerate() {
            let force_case = LoadCaseId(UNIT_LOAD_BASE - 2 * index as i64);
            let moment_case = LoadCaseId(UNIT_LOAD_BASE - 2 * index as i64 - 1);
            model.create_loading(force_case);
            model.add_point_load(force_case, *x, 0.0, 1.0, 0.0);
            model.create_loading(moment_case);
            model.add_point_load(moment_case, *x, 0.0, 0.0, 1.0);
            unit_load_cases.insert(*id, force_case);
            unit_moment_cases.insert(*id, moment_case);
        }

        Ok(BuiltModel {
            model,
            poi_joints,
            unit_load_cases,
            unit_moment_cases,
        })
    }
}
