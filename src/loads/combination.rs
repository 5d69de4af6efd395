//! Load combination membership

use super::{ProductForceType, ProductLoadMap};
use crate::bridge::{BridgeConfig, LossMethod};
use serde::{Deserialize, Serialize};

/// Combinations built from product-load categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadingCombination {
    /// Dead load of structural components and attachments.
    Dc,
    /// Dead load of wearing surfaces and utilities.
    Dw,
    /// DW for load rating, always the rating overlay.
    DwRating,
    Creep,
    Shrinkage,
    Relaxation,
    /// Secondary effects of post-tensioning.
    PrestressSecondary,
}

impl LoadingCombination {
    pub const ALL: [LoadingCombination; 7] = [
        LoadingCombination::Dc,
        LoadingCombination::Dw,
        LoadingCombination::DwRating,
        LoadingCombination::Creep,
        LoadingCombination::Shrinkage,
        LoadingCombination::Relaxation,
        LoadingCombination::PrestressSecondary,
    ];
}

impl ProductLoadMap {
    /// Categories that participate in a combination, in registry order.
    ///
    /// DW membership depends on the loss method: with time-step losses the
    /// real overlay is modeled when it is placed, otherwise the rating
    /// overlay stands in unless a future overlay is specified. The
    /// time-dependent combinations are empty whenever the loss method is
    /// not time-step or the corresponding effect is suppressed.
    pub fn combination_members(
        &self,
        combination: LoadingCombination,
        config: &BridgeConfig,
    ) -> Vec<ProductForceType> {
        let time_step = config.loss_method == LossMethod::TimeStep;
        match combination {
            LoadingCombination::Dc => vec![
                ProductForceType::Girder,
                ProductForceType::Diaphragm,
                ProductForceType::Construction,
                ProductForceType::Slab,
                ProductForceType::SlabPad,
                ProductForceType::SlabPanel,
                ProductForceType::Sidewalk,
                ProductForceType::TrafficBarrier,
                ProductForceType::UserDc,
                ProductForceType::ShearKey,
                ProductForceType::LongitudinalJoint,
            ],
            LoadingCombination::Dw => {
                let overlay = if time_step || config.has_future_overlay {
                    ProductForceType::Overlay
                } else {
                    ProductForceType::OverlayRating
                };
                vec![overlay, ProductForceType::UserDw]
            }
            LoadingCombination::DwRating => {
                vec![ProductForceType::OverlayRating, ProductForceType::UserDw]
            }
            LoadingCombination::Creep => {
                if time_step && !config.ignore_creep {
                    vec![ProductForceType::Creep]
                } else {
                    Vec::new()
                }
            }
            LoadingCombination::Shrinkage => {
                if time_step && !config.ignore_shrinkage {
                    vec![ProductForceType::Shrinkage]
                } else {
                    Vec::new()
                }
            }
            LoadingCombination::Relaxation => {
                if time_step && !config.ignore_relaxation {
                    vec![ProductForceType::Relaxation]
                } else {
                    Vec::new()
                }
            }
            LoadingCombination::PrestressSecondary => {
                vec![ProductForceType::SecondaryEffects]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_step_config() -> BridgeConfig {
        BridgeConfig {
            loss_method: LossMethod::TimeStep,
            ..BridgeConfig::default()
        }
    }

    #[test]
    fn test_dc_membership() {
        let map = ProductLoadMap::new();
        let members = map.combination_members(LoadingCombination::Dc, &BridgeConfig::default());
        assert!(members.contains(&ProductForceType::Girder));
        assert!(members.contains(&ProductForceType::TrafficBarrier));
        assert!(!members.contains(&ProductForceType::Overlay));
        assert!(!members.contains(&ProductForceType::UserDw));
        assert!(!members.contains(&ProductForceType::SecondaryEffects));
    }

    #[test]
    fn test_dw_overlay_selection() {
        let map = ProductLoadMap::new();

        let elastic = BridgeConfig::default();
        let members = map.combination_members(LoadingCombination::Dw, &elastic);
        assert!(members.contains(&ProductForceType::OverlayRating));

        let members = map.combination_members(LoadingCombination::Dw, &time_step_config());
        assert!(members.contains(&ProductForceType::Overlay));

        let future = BridgeConfig {
            has_future_overlay: true,
            ..BridgeConfig::default()
        };
        let members = map.combination_members(LoadingCombination::Dw, &future);
        assert!(members.contains(&ProductForceType::Overlay));
    }

    #[test]
    fn test_time_dependent_combinations() {
        let map = ProductLoadMap::new();

        let members = map.combination_members(LoadingCombination::Creep, &BridgeConfig::default());
        assert!(members.is_empty());

        let members = map.combination_members(LoadingCombination::Creep, &time_step_config());
        assert_eq!(members, vec![ProductForceType::Creep]);

        let suppressed = BridgeConfig {
            ignore_creep: true,
            ..time_step_config()
        };
        let members = map.combination_members(LoadingCombination::Creep, &suppressed);
        assert!(members.is_empty());
    }

    #[test]
    fn test_membership_is_deterministic() {
        let map = ProductLoadMap::new();
        let config = time_step_config();
        for combination in LoadingCombination::ALL {
            let a = map.combination_members(combination, &config);
            let b = map.combination_members(combination, &config);
            assert_eq!(a, b);
        }
    }
}
