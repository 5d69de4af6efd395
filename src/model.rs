//! Per-segment cached model record

use crate::fem::factory::BuiltModel;
use crate::fem::{FemModel, JointId};
use crate::keys::{ConstructionStage, IntervalIndex};
use crate::loads::LoadCaseId;
use crate::poi::{PoiId, PointOfInterest};
use log::trace;
use std::collections::{HashMap, HashSet};

/// One cached structural model: the engine plus the bookkeeping that makes
/// lazy load application idempotent.
pub struct SegmentModel {
    pub(crate) stage: ConstructionStage,
    /// Interval the model was built for; fixes the concrete modulus.
    pub(crate) interval: IntervalIndex,
    pub(crate) fem: Box<dyn FemModel>,
    poi_joints: HashMap<PoiId, JointId>,
    /// Lazily applied load cases (strand cases, post-tensioning).
    pub(crate) applied: HashSet<LoadCaseId>,
    /// Indices of the named-load definitions currently in each channel.
    pub(crate) named_applied: HashMap<LoadCaseId, Vec<usize>>,
    unit_load_cases: HashMap<PoiId, LoadCaseId>,
    unit_moment_cases: HashMap<PoiId, LoadCaseId>,
}

impl SegmentModel {
    pub(crate) fn new(stage: ConstructionStage, interval: IntervalIndex, built: BuiltModel) -> Self {
        Self {
            stage,
            interval,
            fem: Box::new(built.model),
            poi_joints: built.poi_joints,
            applied: HashSet::new(),
            named_applied: HashMap::new(),
            unit_load_cases: built.unit_load_cases,
            unit_moment_cases: built.unit_moment_cases,
        }
    }

    /// Joint for a point of interest, adding one to the model the first
    /// time the point is seen.
    pub(crate) fn joint_for(&mut self, poi: &PointOfInterest) -> JointId {
        if let Some(joint) = self.poi_joints.get(&poi.id) {
            return *joint;
        }
        trace!("Adding POI {} at {}", poi.id, poi.dist_from_start);
        let joint = self.fem.add_joint(poi.dist_from_start);
        self.poi_joints.insert(poi.id, joint);
        joint
    }

    /// Unit vertical-force influence channel for a point, if the point was
    /// registered when the model was built.
    pub(crate) fn unit_load_case(&self, poi: PoiId) -> Option<LoadCaseId> {
        self.unit_load_cases.get(&poi).copied()
    }

    /// Unit moment influence channel for a point, if registered.
    pub(crate) fn unit_moment_case(&self, poi: PoiId) -> Option<LoadCaseId> {
        self.unit_moment_cases.get(&poi).copied()
    }
}
