//! Planar structural engine for segment models
//!
//! The manager talks to the engine through the narrow [`FemModel`] trait:
//! loading channels keyed by [`LoadCaseId`], concentrated / linearly varying
//! / initial-strain loads positioned by distance along the chain, and raw
//! member-end results on both sides of a joint. Solutions are computed
//! lazily per loading channel and cached until that channel changes.

pub mod beam_chain;
pub mod factory;
pub mod math;

pub use beam_chain::{BeamChainModel, BeamSection};
pub use factory::{SegmentModelBlueprint, SegmentModelFactory};

use crate::error::AnalysisResult;
use crate::loads::LoadCaseId;

/// Stable joint identifier within one model. Ids survive later joint
/// insertions.
pub type JointId = usize;

/// Raw member-end forces on the two faces of a joint, exactly as the
/// elements report them: `[fx, fy, mz]` acting on the member at the end
/// touching the joint. A face is all zeros when no member exists on that
/// side. Converting to the conventional beam sign convention is the
/// caller's business.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceForces {
    pub left: [f64; 3],
    pub right: [f64; 3],
}

impl FaceForces {
    pub const ZERO: FaceForces = FaceForces {
        left: [0.0; 3],
        right: [0.0; 3],
    };
}

/// The structural engine surface the manager depends on.
pub trait FemModel {
    /// Register an empty loading channel. Fatal if the channel exists.
    fn create_loading(&mut self, case: LoadCaseId);

    /// Drop all loads and any cached solution for a channel, leaving the
    /// channel registered. Fatal if the channel was never created.
    fn clear_loading(&mut self, case: LoadCaseId);

    fn has_loading(&self, case: LoadCaseId) -> bool;

    /// Concentrated force/moment at a distance along the chain.
    fn add_point_load(&mut self, case: LoadCaseId, x: f64, fx: f64, fy: f64, mz: f64);

    /// Linearly varying transverse load from `w1` at `x1` to `w2` at `x2`.
    fn add_linear_load(&mut self, case: LoadCaseId, x1: f64, x2: f64, w1: f64, w2: f64);

    /// Imposed axial strain `e` and curvature `r` over `[x1, x2]`.
    fn add_strain_load(&mut self, case: LoadCaseId, x1: f64, x2: f64, e: f64, r: f64);

    /// Joint at a position, inserting one if none is close enough.
    /// Insertion invalidates cached solutions.
    fn add_joint(&mut self, x: f64) -> JointId;

    /// Existing joint near a position, if any.
    fn joint_at(&self, x: f64) -> Option<JointId>;

    fn joint_position(&self, joint: JointId) -> f64;

    /// Support joints ordered by position along the chain.
    fn support_joints(&self) -> Vec<JointId>;

    fn face_forces(&mut self, case: LoadCaseId, joint: JointId) -> AnalysisResult<FaceForces>;

    /// Joint displacement `[dx, dy, rz]`.
    fn displacement(&mut self, case: LoadCaseId, joint: JointId) -> AnalysisResult<[f64; 3]>;

    /// Support reaction `[fx, fy, mz]` at a joint.
    fn reaction(&mut self, case: LoadCaseId, joint: JointId) -> AnalysisResult<[f64; 3]>;
}
