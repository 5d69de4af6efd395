//! Segment Analysis - precast girder segment models and result queries
//!
//! This library analyzes precast bridge girder segments during the handling
//! stages before erection (release, lifting, storage, hauling), supporting:
//! - Cached per-segment beam models, one per support condition
//! - Product loads, load combinations, and DC-factored limit states
//! - Pretension and post-tensioning as equivalent load sets
//! - Named external load groups scoped per girder line
//! - Incremental and cumulative results along the construction timeline
//!
//! The high-level entry point is [`manager::SegmentModelManager`], driven by
//! the collaborator traits in [`bridge`]. The underlying beam engine can
//! also be used directly:
//!
//! ## Example
//! ```rust
//! use segment_analysis::fem::{BeamChainModel, BeamSection, FemModel};
//! use segment_analysis::loads::LoadCaseId;
//!
//! // 30 m segment resting on its ends.
//! let section = BeamSection { e: 30.0e9, a: 0.5, i: 0.08 };
//! let mut model = BeamChainModel::new(30.0, section, &[0.0, 30.0]).unwrap();
//!
//! // Self weight of 12 kN/m acting downward.
//! let girder = LoadCaseId(0);
//! model.create_loading(girder);
//! model.add_linear_load(girder, 0.0, 30.0, -12.0e3, -12.0e3);
//!
//! // Midspan moment: w l^2 / 8.
//! let mid = model.add_joint(15.0);
//! let faces = model.face_forces(girder, mid).unwrap();
//! assert!((faces.left[2] - 12.0e3 * 30.0_f64.powi(2) / 8.0).abs() < 1.0);
//! ```

pub mod bridge;
pub mod datum;
pub mod error;
pub mod fem;
pub mod keys;
pub mod loads;
pub mod manager;
pub mod model;
pub mod poi;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::bridge::{
        AnalysisEnv, BridgeConfig, BridgeGeometry, ConstructionTimeline, LimitState,
        LoadFactorProvider, LoadFactors, LossMethod, Materials, PoiRepository,
        SectionProperties, StressCoefficients, TendonLoader,
    };
    pub use crate::datum::{DatumRule, DatumSelection, SupportTopology};
    pub use crate::error::{AnalysisError, AnalysisResult};
    pub use crate::keys::{ConstructionStage, IntervalIndex, ResultsType, SegmentKey};
    pub use crate::loads::{
        BendingAxis, EquivTendonLoad, LoadCaseId, LoadDirection, LoadingCombination,
        ProductForceType, ProductLoadMap, StrandType,
    };
    pub use crate::manager::SegmentModelManager;
    pub use crate::poi::{PoiId, PointOfInterest};
    pub use crate::results::{SectionResults, SectionValue, StressLocation};
}
