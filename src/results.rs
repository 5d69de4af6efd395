//! Result types for section queries

use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

/// A force effect reported on both faces of a section cut.
///
/// The two values differ wherever a concentrated effect (point load, support
/// reaction, equivalent tendon moment) acts exactly at the cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionValue {
    /// Value just before the cut (left face).
    pub left: f64,
    /// Value just after the cut (right face).
    pub right: f64,
}

impl SectionValue {
    pub const ZERO: SectionValue = SectionValue {
        left: 0.0,
        right: 0.0,
    };

    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn scale(self, factor: f64) -> Self {
        Self {
            left: self.left * factor,
            right: self.right * factor,
        }
    }
}

impl Add for SectionValue {
    type Output = SectionValue;

    fn add(self, rhs: SectionValue) -> SectionValue {
        SectionValue {
            left: self.left + rhs.left,
            right: self.right + rhs.right,
        }
    }
}

impl Sub for SectionValue {
    type Output = SectionValue;

    fn sub(self, rhs: SectionValue) -> SectionValue {
        SectionValue {
            left: self.left - rhs.left,
            right: self.right - rhs.right,
        }
    }
}

impl Neg for SectionValue {
    type Output = SectionValue;

    fn neg(self) -> SectionValue {
        SectionValue {
            left: -self.left,
            right: -self.right,
        }
    }
}

/// Complete set of section results at one point of interest.
///
/// Forces follow the conventional beam sign convention: axial positive in
/// tension, shear positive for a clockwise couple, moment positive sagging.
/// Deflections are positive upward, rotations positive counterclockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionResults {
    /// Axial force.
    pub fx: SectionValue,
    /// Shear force.
    pub fy: SectionValue,
    /// Bending moment.
    pub mz: SectionValue,
    /// Horizontal deflection.
    pub dx: f64,
    /// Vertical deflection.
    pub dy: f64,
    /// Rotation.
    pub rz: f64,
}

impl SectionResults {
    pub const ZERO: SectionResults = SectionResults {
        fx: SectionValue::ZERO,
        fy: SectionValue::ZERO,
        mz: SectionValue::ZERO,
        dx: 0.0,
        dy: 0.0,
        rz: 0.0,
    };

    pub fn scale(self, factor: f64) -> Self {
        Self {
            fx: self.fx.scale(factor),
            fy: self.fy.scale(factor),
            mz: self.mz.scale(factor),
            dx: self.dx * factor,
            dy: self.dy * factor,
            rz: self.rz * factor,
        }
    }
}

impl Add for SectionResults {
    type Output = SectionResults;

    fn add(self, rhs: SectionResults) -> SectionResults {
        SectionResults {
            fx: self.fx + rhs.fx,
            fy: self.fy + rhs.fy,
            mz: self.mz + rhs.mz,
            dx: self.dx + rhs.dx,
            dy: self.dy + rhs.dy,
            rz: self.rz + rhs.rz,
        }
    }
}

impl Sub for SectionResults {
    type Output = SectionResults;

    fn sub(self, rhs: SectionResults) -> SectionResults {
        SectionResults {
            fx: self.fx - rhs.fx,
            fy: self.fy - rhs.fy,
            mz: self.mz - rhs.mz,
            dx: self.dx - rhs.dx,
            dy: self.dy - rhs.dy,
            rz: self.rz - rhs.rz,
        }
    }
}

/// Fiber location for stress queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressLocation {
    TopGirder,
    BottomGirder,
}
