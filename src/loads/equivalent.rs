//! Equivalent tendon loads and external load definitions

use crate::keys::{IntervalIndex, SegmentKey};
use serde::{Deserialize, Serialize};

/// Permanent strand families in a precast segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrandType {
    Straight,
    Harped,
    Temporary,
}

impl StrandType {
    pub const ALL: [StrandType; 3] = [StrandType::Straight, StrandType::Harped, StrandType::Temporary];

    pub(crate) fn index(self) -> usize {
        match self {
            StrandType::Straight => 0,
            StrandType::Harped => 1,
            StrandType::Temporary => 2,
        }
    }
}

/// Bending plane of an equivalent pretension load set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BendingAxis {
    /// Bending in the vertical plane (moments about the horizontal axis).
    Vertical,
    /// Bending in the horizontal plane (moments about the vertical axis).
    Lateral,
}

impl BendingAxis {
    pub(crate) fn index(self) -> usize {
        match self {
            BendingAxis::Vertical => 0,
            BendingAxis::Lateral => 1,
        }
    }
}

/// One concentrated action in an equivalent tendon load set: a transverse
/// force and/or moment at a location along the segment. End moments, harp
/// point forces, and debond-section moments all take this shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquivTendonLoad {
    /// Distance from the start face of the segment.
    pub x: f64,
    /// Transverse force, positive in the positive axis direction.
    pub p: f64,
    /// Concentrated moment, positive counterclockwise.
    pub m: f64,
}

impl EquivTendonLoad {
    pub fn force(x: f64, p: f64) -> Self {
        Self { x, p, m: 0.0 }
    }

    pub fn moment(x: f64, m: f64) -> Self {
        Self { x, p: 0.0, m }
    }
}

/// Direction of a concentrated named load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadDirection {
    /// Axial force along the member.
    Fx,
    /// Transverse force.
    Fy,
    /// Concentrated moment.
    Mz,
}

/// Geometry and magnitude of one named external load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExternalLoadKind {
    Concentrated {
        x: f64,
        direction: LoadDirection,
        magnitude: f64,
    },
    /// Uniform transverse load over [x1, x2].
    Uniform { x1: f64, x2: f64, w: f64 },
    /// Imposed axial strain and curvature over [x1, x2].
    InitialStrain { x1: f64, x2: f64, e: f64, r: f64 },
}

/// One load added to a named load group. Definitions are append-only; the
/// interval says when the load first acts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLoadDef {
    pub group_id: super::LoadCaseId,
    pub segment: SegmentKey,
    pub interval: IntervalIndex,
    pub kind: ExternalLoadKind,
}
