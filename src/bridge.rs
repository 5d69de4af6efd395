//! Collaborator capability traits
//!
//! The manager never computes geometry, timeline, material, or tendon data
//! itself; it asks these collaborators. Applications implement them over
//! their own bridge description; tests implement them over fixtures.

use crate::datum::SupportTopology;
use crate::keys::{ConstructionStage, IntervalIndex, SegmentKey};
use crate::loads::{BendingAxis, EquivTendonLoad, StrandType};
use crate::poi::PointOfInterest;
use crate::results::StressLocation;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Prestress loss method governing which overlay case DW picks up and
/// whether time-dependent categories carry loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossMethod {
    TimeStep,
    Elastic,
}

/// Project-level switches that influence combination membership.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub loss_method: LossMethod,
    /// Overlay is planned but not present at open-to-traffic.
    pub has_future_overlay: bool,
    pub ignore_creep: bool,
    pub ignore_shrinkage: bool,
    pub ignore_relaxation: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            loss_method: LossMethod::Elastic,
            has_future_overlay: false,
            ignore_creep: false,
            ignore_shrinkage: false,
            ignore_relaxation: false,
        }
    }
}

/// Segment layout and support geometry.
pub trait BridgeGeometry {
    /// Length of the precast segment between its end faces.
    fn segment_length(&self, key: &SegmentKey) -> f64;

    /// Girder line index the segment belongs to. Named load groups are
    /// scoped per girder line.
    fn girder_line(&self, key: &SegmentKey) -> usize;

    /// Distances from the (left, right) segment ends to the storage
    /// supports.
    fn storage_support_points(&self, key: &SegmentKey) -> (f64, f64);

    /// Distances from the (left, right) segment ends to the lifting loops.
    fn lift_points(&self, key: &SegmentKey) -> (f64, f64);

    /// Distances from the (left, right) segment ends to the truck bunks.
    fn haul_points(&self, key: &SegmentKey) -> (f64, f64);

    /// Self weight of the segment per unit length, positive magnitude.
    fn self_weight_intensity(&self, key: &SegmentKey) -> f64;

    fn config(&self) -> BridgeConfig;
}

/// Maps each segment onto the construction timeline.
///
/// For a given segment: release <= lifting <= storage <= hauling < erection.
pub trait ConstructionTimeline {
    fn release_interval(&self, key: &SegmentKey) -> IntervalIndex;
    fn lifting_interval(&self, key: &SegmentKey) -> IntervalIndex;
    fn storage_interval(&self, key: &SegmentKey) -> IntervalIndex;
    fn hauling_interval(&self, key: &SegmentKey) -> IntervalIndex;
    fn erection_interval(&self, key: &SegmentKey) -> IntervalIndex;
}

/// Material data.
pub trait Materials {
    /// Modulus of elasticity of the segment concrete during an interval.
    fn segment_ec(&self, key: &SegmentKey, interval: IntervalIndex) -> f64;
}

/// Owns the points of interest and erected-support layout.
pub trait PoiRepository {
    /// All points of interest on a segment, ordered by distance from the
    /// start face.
    fn pois_on_segment(&self, key: &SegmentKey) -> Vec<PointOfInterest>;

    /// Points of interest at the support locations of a pre-erection stage,
    /// ordered by distance from the start face.
    fn support_pois(&self, key: &SegmentKey, stage: ConstructionStage) -> Vec<PointOfInterest>;

    /// Erected-state support arrangement of the segment, used to pick the
    /// deflection datum.
    fn support_topology(&self, key: &SegmentKey) -> SupportTopology;
}

/// Cross-section properties at points of interest.
pub trait SectionProperties {
    /// Cross-sectional area during an interval.
    fn area(&self, interval: IntervalIndex, poi: &PointOfInterest) -> f64;

    /// Signed section modulus for the fiber location during an interval.
    fn section_modulus(
        &self,
        interval: IntervalIndex,
        poi: &PointOfInterest,
        location: StressLocation,
    ) -> f64;

    /// Moments of inertia used for the biaxial prestress-deflection
    /// correction.
    fn stress_coefficients(
        &self,
        interval: IntervalIndex,
        poi: &PointOfInterest,
    ) -> StressCoefficients;
}

/// Moments of inertia about the section centroid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StressCoefficients {
    pub ixx: f64,
    pub iyy: f64,
    pub ixy: f64,
}

/// Supplies tendon and strand data as equivalent load sets.
pub trait TendonLoader {
    /// Equivalent load set for one strand type bending about one axis.
    /// Includes end moments, harp-point forces, and debond-section moments.
    fn equiv_pretension_loads(
        &self,
        key: &SegmentKey,
        strand: StrandType,
        axis: BendingAxis,
    ) -> Vec<EquivTendonLoad>;

    /// Equivalent load set for post-tensioning tendons stressed before
    /// erection. Empty when the segment has none.
    fn equiv_post_tension_loads(&self, key: &SegmentKey) -> Vec<EquivTendonLoad>;

    /// Effective prestress force for a strand type during an interval,
    /// positive in compression on the section.
    fn pretension_force(
        &self,
        key: &SegmentKey,
        strand: StrandType,
        interval: IntervalIndex,
    ) -> f64;

    /// Eccentricity of the strand group, positive below the centroid.
    fn eccentricity(
        &self,
        interval: IntervalIndex,
        poi: &PointOfInterest,
        strand: StrandType,
    ) -> f64;
}

/// Limit states exposed by the factored-results queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitState {
    ServiceI,
    ServiceIII,
    StrengthI,
}

/// Min/max DC load factors for one limit state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoadFactors {
    pub dc_min: f64,
    pub dc_max: f64,
}

/// Supplies load factors per limit state.
pub trait LoadFactorProvider {
    fn dc_factors(&self, limit_state: LimitState) -> LoadFactors;
}

/// Bundle of collaborators handed to the manager at construction.
#[derive(Clone)]
pub struct AnalysisEnv {
    pub geometry: Rc<dyn BridgeGeometry>,
    pub timeline: Rc<dyn ConstructionTimeline>,
    pub materials: Rc<dyn Materials>,
    pub pois: Rc<dyn PoiRepository>,
    pub sections: Rc<dyn SectionProperties>,
    pub tendons: Rc<dyn TendonLoader>,
    pub load_factors: Rc<dyn LoadFactorProvider>,
}
