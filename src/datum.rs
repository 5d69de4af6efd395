//! Deflection datum selection for erected segments
//!
//! After a segment is erected its deflections are reported relative to the
//! points that actually hold it up. The support arrangement varies (permanent
//! piers, temporary erection towers, strongbacks hung from neighboring
//! segments), so the datum is picked by a priority-ordered rule table over
//! the support topology.

use crate::poi::PoiId;
use serde::{Deserialize, Serialize};

/// How the ends of a segment are held before its closure joints cure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropInCondition {
    /// Both ends framed rigidly to adjacent structure.
    FixedBothEnds,
    /// Start end hangs free (drop-in at the start).
    FreeStartEnd,
    /// End end hangs free (drop-in at the end).
    FreeEndEnd,
    /// Fully suspended drop-in segment.
    FreeBothEnds,
}

/// An erection tower under the segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TowerSupport {
    pub poi: PoiId,
    /// Distance from the start face of the segment.
    pub x: f64,
    /// Tower stands in a cast-in-place closure joint rather than under the
    /// precast segment; such towers do not qualify as datum points.
    pub at_closure: bool,
}

/// A strongback carrying one end of the segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrongbackSupport {
    pub poi: PoiId,
    /// Distance from the start face of the segment.
    pub x: f64,
    /// The strongback hangs a laterally free (drop-in) end. A strongback
    /// that is not laterally free restrains the end like framed adjacent
    /// structure and contributes no datum point.
    pub laterally_free: bool,
}

/// Erected-state support arrangement of one segment. Piers, towers, and
/// strongbacks are each ordered by distance from the start face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportTopology {
    pub piers: Vec<(PoiId, f64)>,
    pub towers: Vec<TowerSupport>,
    pub strongbacks: Vec<StrongbackSupport>,
    pub drop_in: DropInCondition,
}

/// Which rule of the table fired. Rules are tried in numeric order; the
/// sub-case letters distinguish configurations within a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatumRule {
    /// 1: two or more permanent piers.
    TwoOrMorePiers,
    /// 2a: one pier with towers on both sides.
    PierBetweenTowers,
    /// 2b: one pier with towers on one side only.
    PierWithTowersOneSide,
    /// 3a: one pier, no towers, a strongback at the free end.
    PierWithStrongback,
    /// 3b: one pier, no towers, ends framed to adjacent structure.
    PierOnly,
    /// 4a: no piers, two or more towers.
    TwoOrMoreTowers,
    /// 4b: no piers, one tower plus a strongback.
    TowerWithStrongback,
    /// 4c: no piers, a single tower.
    TowerOnly,
    /// 5a: strongbacks at both ends.
    StrongbackBothEnds,
    /// 5b: a single laterally free strongback.
    SingleStrongback,
    /// No datum point exists on the segment: nothing holds it up, or every
    /// end is framed rigidly to adjacent structure.
    Unsupported,
}

/// The selected datum: the rule that fired and the one or two support
/// points deflections are measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatumSelection {
    pub rule: DatumRule,
    /// Zero, one, or two points of interest, ordered by position.
    pub pois: Vec<PoiId>,
}

/// Pick the deflection datum for an erected segment.
pub fn select_datum(topology: &SupportTopology) -> DatumSelection {
    let piers = &topology.piers;
    // Towers in a closure joint hold the closure pour, not the segment.
    let towers: Vec<TowerSupport> = topology
        .towers
        .iter()
        .copied()
        .filter(|t| !t.at_closure)
        .collect();
    // Only strongbacks hanging a laterally free end count as datum points;
    // the rest act as framed ends.
    let strongbacks: Vec<StrongbackSupport> = topology
        .strongbacks
        .iter()
        .copied()
        .filter(|s| s.laterally_free)
        .collect();

    // Rule 1: the outermost piers govern.
    if piers.len() >= 2 {
        return DatumSelection {
            rule: DatumRule::TwoOrMorePiers,
            pois: vec![piers[0].0, piers[piers.len() - 1].0],
        };
    }

    if let Some(&(pier, pier_x)) = piers.first() {
        // Rule 2: one pier, defer to the tower configuration.
        if !towers.is_empty() {
            let below: Vec<&TowerSupport> = towers.iter().filter(|t| t.x < pier_x).collect();
            let above: Vec<&TowerSupport> = towers.iter().filter(|t| t.x >= pier_x).collect();
            if !below.is_empty() && !above.is_empty() {
                // 2a: straddling towers; the outermost on each side.
                return DatumSelection {
                    rule: DatumRule::PierBetweenTowers,
                    pois: vec![below[0].poi, above[above.len() - 1].poi],
                };
            }
            // 2b: towers on one side only; pier plus the outermost tower.
            let outer = if below.is_empty() {
                above[above.len() - 1]
            } else {
                below[0]
            };
            let mut pois = vec![pier, outer.poi];
            if outer.x < pier_x {
                pois.reverse();
            }
            return DatumSelection {
                rule: DatumRule::PierWithTowersOneSide,
                pois,
            };
        }

        // Rule 3: one pier, no towers.
        if let Some(strongback) = pick_free_end_strongback(topology) {
            let mut pois = vec![pier, strongback.poi];
            if strongback.x < pier_x {
                pois.reverse();
            }
            return DatumSelection {
                rule: DatumRule::PierWithStrongback,
                pois,
            };
        }
        return DatumSelection {
            rule: DatumRule::PierOnly,
            pois: vec![pier],
        };
    }

    // Rule 4: no piers, towers present.
    if towers.len() >= 2 {
        return DatumSelection {
            rule: DatumRule::TwoOrMoreTowers,
            pois: vec![towers[0].poi, towers[towers.len() - 1].poi],
        };
    }
    if let Some(tower) = towers.first() {
        if let Some(strongback) = strongbacks.iter().max_by(|a, b| {
            (a.x - tower.x).abs().total_cmp(&(b.x - tower.x).abs())
        }) {
            let mut pois = vec![tower.poi, strongback.poi];
            if strongback.x < tower.x {
                pois.reverse();
            }
            return DatumSelection {
                rule: DatumRule::TowerWithStrongback,
                pois,
            };
        }
        return DatumSelection {
            rule: DatumRule::TowerOnly,
            pois: vec![tower.poi],
        };
    }

    // Rule 5: strongbacks only.
    match strongbacks.len() {
        0 => DatumSelection {
            rule: DatumRule::Unsupported,
            pois: Vec::new(),
        },
        1 => DatumSelection {
            rule: DatumRule::SingleStrongback,
            pois: vec![strongbacks[0].poi],
        },
        n => DatumSelection {
            rule: DatumRule::StrongbackBothEnds,
            pois: vec![strongbacks[0].poi, strongbacks[n - 1].poi],
        },
    }
}

/// Strongback at a laterally free end of the segment, preferring the free
/// side named by the drop-in condition.
fn pick_free_end_strongback(topology: &SupportTopology) -> Option<StrongbackSupport> {
    let free: Vec<StrongbackSupport> = topology
        .strongbacks
        .iter()
        .copied()
        .filter(|s| s.laterally_free)
        .collect();
    if free.is_empty() {
        return None;
    }
    match topology.drop_in {
        DropInCondition::FreeStartEnd => free.first().copied(),
        DropInCondition::FreeEndEnd | DropInCondition::FreeBothEnds => free.last().copied(),
        DropInCondition::FixedBothEnds => free.last().copied(),
    }
}
