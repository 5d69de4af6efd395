//! End-to-end checks of the manager against closed-form beam results.

use approx::assert_relative_eq;
use segment_analysis::datum::{DropInCondition, SupportTopology};
use segment_analysis::poi::attributes;
use segment_analysis::prelude::*;
use std::rc::Rc;

const LENGTH: f64 = 30.0;
const E_MOD: f64 = 30.0e9;
const AREA: f64 = 0.5;
const IXX: f64 = 0.08;
const IYY: f64 = 0.4;
const SELF_WEIGHT: f64 = 12.0e3;
const STRAND_FORCE: f64 = 2.0e6;
const ECCENTRICITY: f64 = 0.3;
const S_TOP: f64 = -0.12;
const S_BOTTOM: f64 = 0.10;

const RELEASE: IntervalIndex = 2;
const LIFTING: IntervalIndex = 3;
const STORAGE: IntervalIndex = 4;
const HAULING: IntervalIndex = 6;
const ERECTION: IntervalIndex = 8;

/// One girder line of identical simple segments. Tenth-point POIs, straight
/// strands modeled as an end-moment pair, supports per stage at fixed
/// offsets from the segment ends.
struct TestBridge {
    ixy: f64,
}

fn poi_base(key: &SegmentKey) -> PoiId {
    ((key.group * 100 + key.girder * 10 + key.segment) as PoiId) * 1000
}

fn tenth_point(key: &SegmentKey, i: usize) -> PointOfInterest {
    let mut attr = attributes::TENTH_POINT;
    if i == 5 {
        attr |= attributes::MIDSPAN;
    }
    PointOfInterest::new(poi_base(key) + i as PoiId, *key, LENGTH * i as f64 / 10.0)
        .with_attributes(attr)
}

impl BridgeGeometry for TestBridge {
    fn segment_length(&self, _key: &SegmentKey) -> f64 {
        LENGTH
    }

    fn girder_line(&self, key: &SegmentKey) -> usize {
        key.girder
    }

    fn storage_support_points(&self, _key: &SegmentKey) -> (f64, f64) {
        (2.0, 2.0)
    }

    fn lift_points(&self, _key: &SegmentKey) -> (f64, f64) {
        (3.0, 3.0)
    }

    fn haul_points(&self, _key: &SegmentKey) -> (f64, f64) {
        (4.0, 4.0)
    }

    fn self_weight_intensity(&self, _key: &SegmentKey) -> f64 {
        SELF_WEIGHT
    }

    fn config(&self) -> BridgeConfig {
        BridgeConfig::default()
    }
}

impl ConstructionTimeline for TestBridge {
    fn release_interval(&self, _key: &SegmentKey) -> IntervalIndex {
        RELEASE
    }

    fn lifting_interval(&self, _key: &SegmentKey) -> IntervalIndex {
        LIFTING
    }

    fn storage_interval(&self, _key: &SegmentKey) -> IntervalIndex {
        STORAGE
    }

    fn hauling_interval(&self, _key: &SegmentKey) -> IntervalIndex {
        HAULING
    }

    fn erection_interval(&self, _key: &SegmentKey) -> IntervalIndex {
        ERECTION
    }
}

impl Materials for TestBridge {
    fn segment_ec(&self, _key: &SegmentKey, _interval: IntervalIndex) -> f64 {
        E_MOD
    }
}

impl PoiRepository for TestBridge {
    fn pois_on_segment(&self, key: &SegmentKey) -> Vec<PointOfInterest> {
        (0..=10).map(|i| tenth_point(key, i)).collect()
    }

    fn support_pois(&self, key: &SegmentKey, stage: ConstructionStage) -> Vec<PointOfInterest> {
        let (x, attr, id) = match stage {
            ConstructionStage::Release => (0.0, attributes::TENTH_POINT, 91),
            ConstructionStage::Lifting => (3.0, attributes::LIFT_SUPPORT, 93),
            ConstructionStage::Storage => (2.0, attributes::STORAGE_SUPPORT, 95),
            ConstructionStage::Hauling => (4.0, attributes::HAUL_SUPPORT, 97),
        };
        let base = poi_base(key);
        vec![
            PointOfInterest::new(base + id, *key, x).with_attributes(attr),
            PointOfInterest::new(base + id + 1, *key, LENGTH - x).with_attributes(attr),
        ]
    }

    fn support_topology(&self, key: &SegmentKey) -> SupportTopology {
        let base = poi_base(key);
        SupportTopology {
            piers: vec![(base + 99, 0.0), (base + 100, LENGTH)],
            towers: Vec::new(),
            strongbacks: Vec::new(),
            drop_in: DropInCondition::FixedBothEnds,
        }
    }
}

impl SectionProperties for TestBridge {
    fn area(&self, _interval: IntervalIndex, _poi: &PointOfInterest) -> f64 {
        AREA
    }

    fn section_modulus(
        &self,
        _interval: IntervalIndex,
        _poi: &PointOfInterest,
        location: StressLocation,
    ) -> f64 {
        match location {
            StressLocation::TopGirder => S_TOP,
            StressLocation::BottomGirder => S_BOTTOM,
        }
    }

    fn stress_coefficients(
        &self,
        _interval: IntervalIndex,
        _poi: &PointOfInterest,
    ) -> StressCoefficients {
        StressCoefficients {
            ixx: IXX,
            iyy: IYY,
            ixy: self.ixy,
        }
    }
}

impl TendonLoader for TestBridge {
    fn equiv_pretension_loads(
        &self,
        _key: &SegmentKey,
        strand: StrandType,
        _axis: BendingAxis,
    ) -> Vec<EquivTendonLoad> {
        if strand != StrandType::Straight {
            return Vec::new();
        }
        // End couples producing a constant hogging moment of P e.
        let m = STRAND_FORCE * ECCENTRICITY;
        vec![
            EquivTendonLoad::moment(0.0, m),
            EquivTendonLoad::moment(LENGTH, -m),
        ]
    }

    fn equiv_post_tension_loads(&self, _key: &SegmentKey) -> Vec<EquivTendonLoad> {
        Vec::new()
    }

    fn pretension_force(
        &self,
        _key: &SegmentKey,
        strand: StrandType,
        _interval: IntervalIndex,
    ) -> f64 {
        if strand == StrandType::Straight {
            STRAND_FORCE
        } else {
            0.0
        }
    }

    fn eccentricity(
        &self,
        _interval: IntervalIndex,
        _poi: &PointOfInterest,
        strand: StrandType,
    ) -> f64 {
        if strand == StrandType::Straight {
            ECCENTRICITY
        } else {
            0.0
        }
    }
}

impl LoadFactorProvider for TestBridge {
    fn dc_factors(&self, limit_state: LimitState) -> LoadFactors {
        match limit_state {
            LimitState::StrengthI => LoadFactors {
                dc_min: 0.9,
                dc_max: 1.25,
            },
            _ => LoadFactors {
                dc_min: 1.0,
                dc_max: 1.0,
            },
        }
    }
}

fn env(ixy: f64) -> AnalysisEnv {
    let bridge = Rc::new(TestBridge { ixy });
    AnalysisEnv {
        geometry: bridge.clone(),
        timeline: bridge.clone(),
        materials: bridge.clone(),
        pois: bridge.clone(),
        sections: bridge.clone(),
        tendons: bridge.clone(),
        load_factors: bridge,
    }
}

fn manager() -> SegmentModelManager {
    let _ = env_logger::builder().is_test(true).try_init();
    SegmentModelManager::new(env(0.0))
}

fn segment() -> SegmentKey {
    SegmentKey::new(0, 0, 0)
}

fn midspan() -> PointOfInterest {
    tenth_point(&segment(), 5)
}

/// Release camber at midspan from the constant hogging moment P e.
fn release_camber() -> f64 {
    STRAND_FORCE * ECCENTRICITY * LENGTH.powi(2) / (8.0 * E_MOD * IXX)
}

/// Release camber at a distance x from the start.
fn release_camber_at(x: f64) -> f64 {
    STRAND_FORCE * ECCENTRICITY * x * (LENGTH - x) / (2.0 * E_MOD * IXX)
}

#[test]
fn test_zero_before_release() {
    let mgr = manager();
    let vpoi = vec![midspan()];
    for interval in 0..RELEASE {
        let moments =
            mgr.product_moments(interval, ProductForceType::Girder, &vpoi, ResultsType::Cumulative);
        assert_eq!(moments, vec![0.0]);
        let deflections = mgr.product_deflections(
            interval,
            ProductForceType::Pretension,
            &vpoi,
            ResultsType::Cumulative,
        );
        assert_eq!(deflections, vec![0.0]);
    }
}

#[test]
fn test_girder_moment_at_release() {
    let mgr = manager();
    let moments = mgr.product_moments(
        RELEASE,
        ProductForceType::Girder,
        &[midspan()],
        ResultsType::Cumulative,
    );
    let expected = SELF_WEIGHT * LENGTH.powi(2) / 8.0;
    assert_relative_eq!(moments[0], expected, epsilon = 1.0);
}

#[test]
fn test_girder_reactions_at_release() {
    let mgr = manager();
    let (left, right) = mgr.product_reactions(
        &segment(),
        RELEASE,
        ProductForceType::Girder,
        ResultsType::Cumulative,
    );
    let expected = SELF_WEIGHT * LENGTH / 2.0;
    assert_relative_eq!(left, expected, epsilon = 1.0);
    assert_relative_eq!(right, expected, epsilon = 1.0);

    // Only self weight produces reactions in these models.
    let (left, right) = mgr.product_reactions(
        &segment(),
        RELEASE,
        ProductForceType::Slab,
        ResultsType::Cumulative,
    );
    assert_eq!((left, right), (0.0, 0.0));
}

#[test]
fn test_unloaded_category_is_zero() {
    let mgr = manager();
    let moments = mgr.product_moments(
        RELEASE,
        ProductForceType::Diaphragm,
        &[midspan()],
        ResultsType::Cumulative,
    );
    assert_eq!(moments, vec![0.0]);
}

#[test]
fn test_lifting_overhang_moment() {
    let mgr = manager();
    let lift_point = tenth_point(&segment(), 1);
    let moments = mgr.product_moments(
        LIFTING,
        ProductForceType::Girder,
        &[lift_point],
        ResultsType::Cumulative,
    );
    // Cantilevered overhang of self weight behind the lift point.
    let a: f64 = 3.0;
    assert_relative_eq!(moments[0], -SELF_WEIGHT * a.powi(2) / 2.0, epsilon = 1.0);
}

#[test]
fn test_hauling_moment_between_bunks() {
    let mgr = manager();
    let moments = mgr.product_moments(
        HAULING,
        ProductForceType::Girder,
        &[midspan()],
        ResultsType::Cumulative,
    );
    // Equal overhangs of 4 m beyond the bunks, 22 m between them.
    let (span, a): (f64, f64) = (22.0, 4.0);
    let expected = SELF_WEIGHT * (span.powi(2) / 8.0 - a.powi(2) / 2.0);
    assert_relative_eq!(moments[0], expected, epsilon = 1.0);
}

#[test]
fn test_incremental_is_difference_of_cumulatives() {
    let mgr = manager();
    let vpoi: Vec<PointOfInterest> = (0..=10).map(|i| tenth_point(&segment(), i)).collect();
    // Crossing from the lifting stage into storage rearranges the supports.
    let now = mgr.product_moments(
        STORAGE,
        ProductForceType::Girder,
        &vpoi,
        ResultsType::Cumulative,
    );
    let before = mgr.product_moments(
        STORAGE - 1,
        ProductForceType::Girder,
        &vpoi,
        ResultsType::Cumulative,
    );
    let incremental = mgr.product_moments(
        STORAGE,
        ProductForceType::Girder,
        &vpoi,
        ResultsType::Incremental,
    );
    for ((inc, now), before) in incremental.iter().zip(&now).zip(&before) {
        assert_relative_eq!(*inc, now - before, epsilon = 1.0e-6);
    }
}

#[test]
fn test_incremental_reactions() {
    let mgr = manager();
    let key = segment();
    // At the first loaded interval the baseline is the unreleased zero
    // state, so incremental equals cumulative.
    let cum = mgr.product_reactions(&key, RELEASE, ProductForceType::Girder, ResultsType::Cumulative);
    let inc = mgr.product_reactions(&key, RELEASE, ProductForceType::Girder, ResultsType::Incremental);
    assert_relative_eq!(inc.0, cum.0, epsilon = 1.0e-6);
    assert_relative_eq!(inc.1, cum.1, epsilon = 1.0e-6);

    // Crossing from lifting into storage.
    let now =
        mgr.product_reactions(&key, STORAGE, ProductForceType::Girder, ResultsType::Cumulative);
    let before = mgr.product_reactions(
        &key,
        STORAGE - 1,
        ProductForceType::Girder,
        ResultsType::Cumulative,
    );
    let inc =
        mgr.product_reactions(&key, STORAGE, ProductForceType::Girder, ResultsType::Incremental);
    assert_relative_eq!(inc.0, now.0 - before.0, epsilon = 1.0e-6);
    assert_relative_eq!(inc.1, now.1 - before.1, epsilon = 1.0e-6);
}

#[test]
fn test_incremental_pretension_deflections() {
    let mgr = manager();
    let vpoi = vec![midspan()];
    // First loaded interval: the full release camber appears at once.
    let inc = mgr.product_deflections(
        RELEASE,
        ProductForceType::Pretension,
        &vpoi,
        ResultsType::Incremental,
    );
    assert_relative_eq!(inc[0], release_camber(), epsilon = 1.0e-9);

    // Moving from the lift points (3 m) to the dunnage (2 m) only shifts
    // the datum line the shape is measured against.
    let inc = mgr.product_deflections(
        STORAGE,
        ProductForceType::Pretension,
        &vpoi,
        ResultsType::Incremental,
    );
    let expected = release_camber_at(3.0) - release_camber_at(2.0);
    assert_relative_eq!(inc[0], expected, epsilon = 1.0e-9);
}

#[test]
fn test_incremental_pretension_stresses() {
    let mgr = manager();
    let vpoi = vec![midspan()];
    let (cum_top, cum_bottom) = mgr.product_stresses(
        RELEASE,
        ProductForceType::Pretension,
        &vpoi,
        ResultsType::Cumulative,
        StressLocation::TopGirder,
        StressLocation::BottomGirder,
    );
    let (inc_top, inc_bottom) = mgr.product_stresses(
        RELEASE,
        ProductForceType::Pretension,
        &vpoi,
        ResultsType::Incremental,
        StressLocation::TopGirder,
        StressLocation::BottomGirder,
    );
    assert_relative_eq!(inc_top[0], cum_top[0], epsilon = 1.0e-6);
    assert_relative_eq!(inc_bottom[0], cum_bottom[0], epsilon = 1.0e-6);

    // The prestress force is constant, so later intervals add nothing.
    let (inc_top, inc_bottom) = mgr.product_stresses(
        LIFTING,
        ProductForceType::Pretension,
        &vpoi,
        ResultsType::Incremental,
        StressLocation::TopGirder,
        StressLocation::BottomGirder,
    );
    assert_relative_eq!(inc_top[0], 0.0, epsilon = 1.0e-6);
    assert_relative_eq!(inc_bottom[0], 0.0, epsilon = 1.0e-6);
}

#[test]
fn test_off_segment_poi_is_zero() {
    let mgr = manager();
    let closure = PointOfInterest::new(555, segment(), LENGTH + 0.5)
        .with_attributes(attributes::CLOSURE);
    let moments = mgr.product_moments(
        RELEASE,
        ProductForceType::Girder,
        &[closure],
        ResultsType::Cumulative,
    );
    assert_eq!(moments, vec![0.0]);
}

#[test]
#[should_panic(expected = "at or after erection")]
fn test_erected_interval_is_fatal() {
    let mgr = manager();
    mgr.product_moments(
        ERECTION,
        ProductForceType::Girder,
        &[midspan()],
        ResultsType::Cumulative,
    );
}

#[test]
fn test_pretension_camber_at_release() {
    let mgr = manager();
    let deflections = mgr.product_deflections(
        RELEASE,
        ProductForceType::Pretension,
        &[midspan()],
        ResultsType::Cumulative,
    );
    assert_relative_eq!(deflections[0], release_camber(), epsilon = 1.0e-9);
}

#[test]
fn test_pretension_camber_rereferenced_in_storage() {
    let mgr = manager();
    let key = segment();
    let support = PointOfInterest::new(poi_base(&key) + 95, key, 2.0)
        .with_attributes(attributes::STORAGE_SUPPORT);
    let deflections = mgr.product_deflections(
        STORAGE,
        ProductForceType::Pretension,
        &[midspan(), support],
        ResultsType::Cumulative,
    );
    // The shape is set at release; storage only shifts the datum to the
    // dunnage, so the supports read zero.
    let expected_mid = release_camber() - release_camber_at(2.0);
    assert_relative_eq!(deflections[0], expected_mid, epsilon = 1.0e-9);
    assert_relative_eq!(deflections[1], 0.0, epsilon = 1.0e-9);
}

#[test]
fn test_biaxial_pretension_correction() {
    // Equal lateral and vertical load sets with Ixy / Iyy = 0.1 fold a
    // tenth of the lateral response into the vertical plane.
    let mgr = SegmentModelManager::new(env(0.04));
    let deflections = mgr.product_deflections(
        RELEASE,
        ProductForceType::Pretension,
        &[midspan()],
        ResultsType::Cumulative,
    );
    assert_relative_eq!(deflections[0], 0.9 * release_camber(), epsilon = 1.0e-9);
}

#[test]
fn test_pretension_stresses() {
    let mgr = manager();
    let (top, bottom) = mgr.product_stresses(
        RELEASE,
        ProductForceType::Pretension,
        &[midspan()],
        ResultsType::Cumulative,
        StressLocation::TopGirder,
        StressLocation::BottomGirder,
    );
    let p = STRAND_FORCE;
    let m = -p * ECCENTRICITY;
    assert_relative_eq!(top[0], -p / AREA + m / S_TOP, epsilon = 1.0e-6);
    assert_relative_eq!(bottom[0], -p / AREA + m / S_BOTTOM, epsilon = 1.0e-6);
}

#[test]
fn test_post_tensioning_without_tendons_is_zero() {
    let mgr = manager();
    let moments = mgr.product_moments(
        RELEASE,
        ProductForceType::PostTensioning,
        &[midspan()],
        ResultsType::Cumulative,
    );
    assert_eq!(moments, vec![0.0]);
}

#[test]
fn test_dc_combination_matches_girder() {
    let mgr = manager();
    let vpoi = vec![midspan()];
    let combo = mgr.combination_moments(
        RELEASE,
        LoadingCombination::Dc,
        &vpoi,
        ResultsType::Cumulative,
    );
    let girder =
        mgr.product_moments(RELEASE, ProductForceType::Girder, &vpoi, ResultsType::Cumulative);
    assert_relative_eq!(combo[0], girder[0], epsilon = 1.0e-6);
}

#[test]
fn test_named_load_in_combination() {
    let mgr = manager();
    mgr.create_load_group(0, "utility").unwrap();
    mgr.add_load_group_to_combination("utility", LoadingCombination::Dc);
    let q = 50.0e3;
    mgr.create_concentrated_load(RELEASE, "utility", &midspan(), LoadDirection::Fy, -q);

    let vpoi = vec![midspan()];
    let named = mgr.named_moments(RELEASE, "utility", &vpoi, ResultsType::Cumulative);
    assert_relative_eq!(named[0], q * LENGTH / 4.0, epsilon = 1.0);

    let combo = mgr.combination_moments(
        RELEASE,
        LoadingCombination::Dc,
        &vpoi,
        ResultsType::Cumulative,
    );
    let expected = SELF_WEIGHT * LENGTH.powi(2) / 8.0 + q * LENGTH / 4.0;
    assert_relative_eq!(combo[0], expected, epsilon = 1.0);
}

#[test]
fn test_named_load_not_active_before_its_interval() {
    let mgr = manager();
    mgr.create_load_group(0, "utility").unwrap();
    mgr.create_concentrated_load(STORAGE, "utility", &midspan(), LoadDirection::Fy, -50.0e3);
    let named = mgr.named_moments(RELEASE, "utility", &[midspan()], ResultsType::Cumulative);
    assert_eq!(named, vec![0.0]);
}

#[test]
fn test_named_axial_load() {
    let mgr = manager();
    mgr.create_load_group(0, "jacking").unwrap();
    let f = 100.0e3;
    mgr.create_concentrated_load(RELEASE, "jacking", &midspan(), LoadDirection::Fx, f);
    let vpoi = vec![tenth_point(&segment(), 0), tenth_point(&segment(), 2)];
    let axials = mgr.named_axials(RELEASE, "jacking", &vpoi, ResultsType::Cumulative);
    // Tension between the axially restrained support and the load point.
    assert_relative_eq!(axials[0], f, epsilon = 1.0e-6);
    assert_relative_eq!(axials[1], f, epsilon = 1.0e-6);
}

#[test]
fn test_named_load_scoped_to_girder_line() {
    let mgr = manager();
    mgr.create_load_group(0, "utility").unwrap();
    mgr.add_load_group_to_combination("utility", LoadingCombination::Dc);
    mgr.create_concentrated_load(RELEASE, "utility", &midspan(), LoadDirection::Fy, -50.0e3);

    // The neighboring girder line never sees the group.
    let other = SegmentKey::new(0, 1, 0);
    let vpoi = vec![tenth_point(&other, 5)];
    let combo = mgr.combination_moments(
        RELEASE,
        LoadingCombination::Dc,
        &vpoi,
        ResultsType::Cumulative,
    );
    let girder =
        mgr.product_moments(RELEASE, ProductForceType::Girder, &vpoi, ResultsType::Cumulative);
    assert_relative_eq!(combo[0], girder[0], epsilon = 1.0e-6);
}

#[test]
#[should_panic(expected = "was never created for girder line")]
fn test_unknown_load_group_is_fatal() {
    let mgr = manager();
    mgr.named_moments(RELEASE, "phantom", &[midspan()], ResultsType::Cumulative);
}

#[test]
fn test_duplicate_load_group_rejected() {
    let mgr = manager();
    mgr.create_load_group(0, "utility").unwrap();
    assert!(matches!(
        mgr.create_load_group(0, "utility"),
        Err(AnalysisError::DuplicateLoadGroup(_))
    ));
    // Same name on another girder line is a different group.
    assert!(mgr.create_load_group(1, "utility").is_ok());
}

#[test]
fn test_limit_state_moment_envelope() {
    let mgr = manager();
    let envelope = mgr.limit_state_moments(RELEASE, LimitState::StrengthI, &[midspan()]);
    let m = SELF_WEIGHT * LENGTH.powi(2) / 8.0;
    assert_relative_eq!(envelope[0].0, 0.9 * m, epsilon = 1.0);
    assert_relative_eq!(envelope[0].1, 1.25 * m, epsilon = 1.0);
}

#[test]
fn test_limit_state_deflection_with_prestress() {
    let mgr = manager();
    let vpoi = vec![midspan()];
    let base = mgr.combination_deflections(
        RELEASE,
        LoadingCombination::Dc,
        &vpoi,
        ResultsType::Cumulative,
    );
    let envelope = mgr.limit_state_deflections(RELEASE, LimitState::StrengthI, &vpoi, true);
    let (a, b) = (0.9 * base[0], 1.25 * base[0]);
    assert_relative_eq!(envelope[0].0, a.min(b) + release_camber(), epsilon = 1.0e-9);
    assert_relative_eq!(envelope[0].1, a.max(b) + release_camber(), epsilon = 1.0e-9);
}

#[test]
fn test_unit_load_influence_ordinate() {
    let mgr = manager();
    let poi = tenth_point(&segment(), 3);
    let moments = mgr.unit_load_moments(RELEASE, std::slice::from_ref(&poi), &poi);
    // Unit upward force: the moment ordinate at the load point is -a b / l.
    let a = poi.dist_from_start;
    assert_relative_eq!(moments[0], -a * (LENGTH - a) / LENGTH, epsilon = 1.0e-9);

    // A point on another segment is out of the influence line's reach.
    let other = tenth_point(&SegmentKey::new(0, 1, 0), 3);
    let moments = mgr.unit_load_moments(RELEASE, std::slice::from_ref(&other), &poi);
    assert_eq!(moments, vec![0.0]);
}

#[test]
fn test_unit_couple_influence_preserves_jump() {
    let mgr = manager();
    let poi = tenth_point(&segment(), 3);
    let moments = mgr.unit_couple_moments(RELEASE, std::slice::from_ref(&poi), &poi);
    // A unit couple at a puts a step in the moment diagram: a/l just
    // before the couple, -(l - a)/l just after it.
    let a = poi.dist_from_start;
    assert_relative_eq!(moments[0].left, a / LENGTH, epsilon = 1.0e-9);
    assert_relative_eq!(moments[0].right, -(LENGTH - a) / LENGTH, epsilon = 1.0e-9);
}

#[test]
fn test_erected_deflection_datum_uses_piers() {
    let mgr = manager();
    let key = segment();
    let datum = mgr.erected_deflection_datum(&key);
    assert_eq!(datum.rule, DatumRule::TwoOrMorePiers);
    assert_eq!(datum.pois, vec![poi_base(&key) + 99, poi_base(&key) + 100]);
}

#[test]
fn test_clear_resets_registrations() {
    let mgr = manager();
    mgr.create_load_group(0, "utility").unwrap();
    let before = mgr.product_moments(
        RELEASE,
        ProductForceType::Girder,
        &[midspan()],
        ResultsType::Cumulative,
    );
    mgr.clear();
    assert!(mgr.create_load_group(0, "utility").is_ok());
    let after = mgr.product_moments(
        RELEASE,
        ProductForceType::Girder,
        &[midspan()],
        ResultsType::Cumulative,
    );
    assert_relative_eq!(before[0], after[0], epsilon = 1.0e-9);
}
