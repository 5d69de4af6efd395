//! Identity types for segments and the construction timeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index into the construction timeline. Interval 0 is the start of
/// construction; higher indices are later activities.
pub type IntervalIndex = usize;

/// Identifies one precast segment: group (span range), girder line within the
/// group, and segment position along the girder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentKey {
    pub group: usize,
    pub girder: usize,
    pub segment: usize,
}

impl SegmentKey {
    pub fn new(group: usize, girder: usize, segment: usize) -> Self {
        Self {
            group,
            girder,
            segment,
        }
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Group {} Girder {} Segment {}",
            self.group, self.girder, self.segment
        )
    }
}

/// Support condition a segment is analyzed under before erection.
///
/// Each stage gets its own cached model because the support locations differ:
/// release sits on the casting bed ends, lifting hangs from loop points,
/// storage rests on dunnage, hauling rests on truck bunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstructionStage {
    Release,
    Lifting,
    Storage,
    Hauling,
}

impl fmt::Display for ConstructionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstructionStage::Release => "release",
            ConstructionStage::Lifting => "lifting",
            ConstructionStage::Storage => "storage",
            ConstructionStage::Hauling => "hauling",
        };
        write!(f, "{name}")
    }
}

/// Whether a query wants the change during one interval or the running total
/// through that interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultsType {
    Incremental,
    Cumulative,
}
