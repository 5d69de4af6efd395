//! Points of interest along a segment

use crate::keys::SegmentKey;
use serde::{Deserialize, Serialize};

/// Stable identifier for a point of interest, assigned by the POI repository.
pub type PoiId = u64;

/// Attribute flags carried by a point of interest.
pub mod attributes {
    /// Mid-span of the segment.
    pub const MIDSPAN: u32 = 1 << 0;
    /// One of the tenth points of the span.
    pub const TENTH_POINT: u32 = 1 << 1;
    /// Located in a cast-in-place closure joint, not on precast concrete.
    pub const CLOSURE: u32 = 1 << 2;
    /// Located at a permanent pier boundary between groups.
    pub const BOUNDARY_PIER: u32 = 1 << 3;
    /// Storage support (dunnage) location.
    pub const STORAGE_SUPPORT: u32 = 1 << 4;
    /// Lifting loop location.
    pub const LIFT_SUPPORT: u32 = 1 << 5;
    /// Truck bunk location during hauling.
    pub const HAUL_SUPPORT: u32 = 1 << 6;
    /// Erected-state support (pier, erection tower, or strongback).
    pub const ERECTION_SUPPORT: u32 = 1 << 7;
}

/// A location along a segment where results are reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: PoiId,
    pub segment: SegmentKey,
    /// Distance from the start face of the segment.
    pub dist_from_start: f64,
    pub attributes: u32,
}

impl PointOfInterest {
    pub fn new(id: PoiId, segment: SegmentKey, dist_from_start: f64) -> Self {
        Self {
            id,
            segment,
            dist_from_start,
            attributes: 0,
        }
    }

    pub fn with_attributes(mut self, attributes: u32) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn has_attribute(&self, attribute: u32) -> bool {
        self.attributes & attribute != 0
    }

    /// True when this point lies off the precast segment itself (closure
    /// joint or boundary pier). Such points always report zero.
    pub fn is_off_segment(&self) -> bool {
        self.has_attribute(attributes::CLOSURE) || self.has_attribute(attributes::BOUNDARY_PIER)
    }

    /// True when this point is at the start face of the segment.
    pub fn is_at_start(&self) -> bool {
        self.dist_from_start.abs() < 1.0e-6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes() {
        let key = SegmentKey::new(0, 0, 0);
        let poi = PointOfInterest::new(1, key, 15.0)
            .with_attributes(attributes::MIDSPAN | attributes::TENTH_POINT);
        assert!(poi.has_attribute(attributes::MIDSPAN));
        assert!(poi.has_attribute(attributes::TENTH_POINT));
        assert!(!poi.has_attribute(attributes::CLOSURE));
        assert!(!poi.is_off_segment());
    }

    #[test]
    fn test_off_segment() {
        let key = SegmentKey::new(0, 0, 0);
        let poi = PointOfInterest::new(2, key, 30.5).with_attributes(attributes::CLOSURE);
        assert!(poi.is_off_segment());
    }

    #[test]
    fn test_at_start() {
        let key = SegmentKey::new(0, 0, 0);
        assert!(PointOfInterest::new(3, key, 0.0).is_at_start());
        assert!(!PointOfInterest::new(4, key, 0.5).is_at_start());
    }
}
