//! Product-load taxonomy and load-case ID partition

use super::{BendingAxis, StrandType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one loading channel in a structural model.
///
/// Non-negative IDs are reserved by [`ProductLoadMap`]; negative IDs are
/// used internally for unit-load influence channels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LoadCaseId(pub i64);

impl fmt::Display for LoadCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every kind of externally applied or internally generated product load.
///
/// `Pretension` and `PostTensioning` are queryable force types but are not
/// categories in the registry: pretension results sum the per-strand load
/// cases and post-tensioning has its own reserved ID outside the category
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductForceType {
    Girder,
    Diaphragm,
    Construction,
    Slab,
    SlabPad,
    SlabPanel,
    Overlay,
    OverlayRating,
    Sidewalk,
    TrafficBarrier,
    UserDc,
    UserDw,
    UserLlim,
    ShearKey,
    LongitudinalJoint,
    SecondaryEffects,
    Creep,
    Shrinkage,
    Relaxation,
    Pretension,
    PostTensioning,
}

/// Registered categories in fixed order. Load-case IDs are assigned from
/// position in this table, so the order is part of the ID contract.
const REGISTRY: [(ProductForceType, &str); 19] = [
    (ProductForceType::Girder, "Girder"),
    (ProductForceType::Diaphragm, "Diaphragm"),
    (ProductForceType::Construction, "Construction"),
    (ProductForceType::Slab, "Slab"),
    (ProductForceType::SlabPad, "Haunch"),
    (ProductForceType::SlabPanel, "Slab Panel"),
    (ProductForceType::Overlay, "Overlay"),
    (ProductForceType::OverlayRating, "Overlay Rating"),
    (ProductForceType::Sidewalk, "Sidewalk"),
    (ProductForceType::TrafficBarrier, "Traffic Barrier"),
    (ProductForceType::UserDc, "UserDC"),
    (ProductForceType::UserDw, "UserDW"),
    (ProductForceType::UserLlim, "UserLLIM"),
    (ProductForceType::ShearKey, "Shear Key"),
    (ProductForceType::LongitudinalJoint, "Longitudinal Joint"),
    (ProductForceType::SecondaryEffects, "Secondary Effects"),
    (ProductForceType::Creep, "Creep"),
    (ProductForceType::Shrinkage, "Shrinkage"),
    (ProductForceType::Relaxation, "Relaxation"),
];

/// Bijective registry between product-load categories, display names, and
/// reserved load-case IDs.
///
/// The ID space is partitioned from the registry size alone:
/// `0..category_count` for the categories, `category_count` for
/// post-tensioning, six IDs after that for the per-strand bending cases
/// (three strand types, vertical then lateral), and everything from
/// [`ProductLoadMap::first_external_id`] up for named external load groups.
#[derive(Debug, Clone, Default)]
pub struct ProductLoadMap;

impl ProductLoadMap {
    pub fn new() -> Self {
        Self
    }

    /// Number of registered categories.
    pub fn category_count(&self) -> usize {
        REGISTRY.len()
    }

    /// Reserved load-case ID of a registered category.
    ///
    /// Panics for `Pretension` and `PostTensioning`, which have no single
    /// category channel.
    pub fn load_case_id(&self, force_type: ProductForceType) -> LoadCaseId {
        let index = REGISTRY
            .iter()
            .position(|(ft, _)| *ft == force_type)
            .unwrap_or_else(|| {
                panic!("product force type {force_type:?} is not a registered load category")
            });
        LoadCaseId(index as i64)
    }

    /// Display name of a registered category.
    pub fn name(&self, force_type: ProductForceType) -> &'static str {
        REGISTRY
            .iter()
            .find(|(ft, _)| *ft == force_type)
            .map(|(_, name)| *name)
            .unwrap_or_else(|| {
                panic!("product force type {force_type:?} is not a registered load category")
            })
    }

    /// Category registered under a display name. Fatal for unknown names.
    pub fn force_type(&self, name: &str) -> ProductForceType {
        REGISTRY
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(ft, _)| *ft)
            .unwrap_or_else(|| panic!("'{name}' is not a registered load category"))
    }

    /// All registered categories in ID order.
    pub fn categories(&self) -> impl Iterator<Item = ProductForceType> {
        REGISTRY.iter().map(|(ft, _)| *ft)
    }

    /// Reserved ID for the post-tensioning load case.
    pub fn post_tension_id(&self) -> LoadCaseId {
        LoadCaseId(REGISTRY.len() as i64)
    }

    /// Reserved ID for one strand type bending about one axis.
    pub fn strand_case_id(&self, strand: StrandType, axis: BendingAxis) -> LoadCaseId {
        let base = REGISTRY.len() as i64 + 1;
        LoadCaseId(base + 2 * strand.index() as i64 + axis.index() as i64)
    }

    /// First ID available for named external load groups. IDs at or above
    /// this value never collide with a reserved channel.
    pub fn first_external_id(&self) -> LoadCaseId {
        LoadCaseId(REGISTRY.len() as i64 + 7)
    }
}
