//! Cached pre-erection segment models and the result query surface
//!
//! One manager owns four caches of structural models per segment, one per
//! support condition (release, lifting, storage, hauling). Models are built
//! on first use; prestress and named external loads are applied lazily the
//! first time a query needs them. All queries are logically const: caches
//! live behind interior mutability.
//!
//! Failure policy: queries for intervals before release return zeros,
//! queries at or after erection panic, and structural singularities panic,
//! since a chain with two supports cannot legitimately go singular.

use crate::bridge::{AnalysisEnv, LimitState};
use crate::datum::{select_datum, DatumSelection};
use crate::error::{AnalysisError, AnalysisResult};
use crate::fem::{SegmentModelBlueprint, SegmentModelFactory};
use crate::keys::{ConstructionStage, IntervalIndex, ResultsType, SegmentKey};
use crate::loads::{
    BendingAxis, ExternalLoadKind, LoadCaseId, LoadDirection, LoadingCombination, NamedLoadDef,
    ProductForceType, ProductLoadMap, StrandType,
};
use crate::model::SegmentModel;
use crate::poi::{attributes, PointOfInterest};
use crate::results::{SectionResults, SectionValue, StressLocation};
use log::{debug, trace};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

/// Which lazy load application a query needs before reading a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApplyLoads {
    /// Channel was filled when the model was built, or is a pre-created
    /// product channel.
    None,
    /// All six per-strand equivalent load cases.
    Pretension,
    PostTension,
    /// Named external load channel; synced against the definition list.
    Named,
}

pub struct SegmentModelManager {
    env: AnalysisEnv,
    load_map: ProductLoadMap,

    release_models: RefCell<BTreeMap<SegmentKey, SegmentModel>>,
    lifting_models: RefCell<BTreeMap<SegmentKey, SegmentModel>>,
    storage_models: RefCell<BTreeMap<SegmentKey, SegmentModel>>,
    hauling_models: RefCell<BTreeMap<SegmentKey, SegmentModel>>,

    /// (girder line, group name) -> reserved channel id.
    load_groups: RefCell<HashMap<(usize, String), LoadCaseId>>,
    /// Group names aggregated into each combination.
    group_combinations: RefCell<HashMap<LoadingCombination, Vec<String>>>,
    /// Append-only named-load definitions.
    load_defs: RefCell<Vec<NamedLoadDef>>,
    next_external_id: Cell<i64>,
}

impl SegmentModelManager {
    pub fn new(env: AnalysisEnv) -> Self {
        let load_map = ProductLoadMap::new();
        let first_external = load_map.first_external_id().0;
        Self {
            env,
            load_map,
            release_models: RefCell::new(BTreeMap::new()),
            lifting_models: RefCell::new(BTreeMap::new()),
            storage_models: RefCell::new(BTreeMap::new()),
            hauling_models: RefCell::new(BTreeMap::new()),
            load_groups: RefCell::new(HashMap::new()),
            group_combinations: RefCell::new(HashMap::new()),
            load_defs: RefCell::new(Vec::new()),
            next_external_id: Cell::new(first_external),
        }
    }

    pub fn load_map(&self) -> &ProductLoadMap {
        &self.load_map
    }

    /// Drop every cached model and every named-load registration.
    pub fn clear(&self) {
        self.release_models.borrow_mut().clear();
        self.lifting_models.borrow_mut().clear();
        self.storage_models.borrow_mut().clear();
        self.hauling_models.borrow_mut().clear();
        self.load_groups.borrow_mut().clear();
        self.group_combinations.borrow_mut().clear();
        self.load_defs.borrow_mut().clear();
        self.next_external_id.set(self.load_map.first_external_id().0);
    }

    // ------------------------------------------------------------------
    // Stage resolution and model caching

    /// Support condition in effect during an interval, or `None` before
    /// release. Intervals at or after erection are outside this manager's
    /// contract.
    fn stage_for(&self, key: &SegmentKey, interval: IntervalIndex) -> Option<ConstructionStage> {
        let timeline = &self.env.timeline;
        let release = timeline.release_interval(key);
        if interval < release {
            return None;
        }
        let erection = timeline.erection_interval(key);
        assert!(
            interval < erection,
            "interval {interval} is at or after erection of {key}; only pre-erection intervals are supported"
        );
        let stage = if interval < timeline.lifting_interval(key) {
            ConstructionStage::Release
        } else if interval < timeline.storage_interval(key) {
            ConstructionStage::Lifting
        } else if interval < timeline.hauling_interval(key) {
            ConstructionStage::Storage
        } else {
            ConstructionStage::Hauling
        };
        Some(stage)
    }

    fn cache_for(&self, stage: ConstructionStage) -> &RefCell<BTreeMap<SegmentKey, SegmentModel>> {
        match stage {
            ConstructionStage::Release => &self.release_models,
            ConstructionStage::Lifting => &self.lifting_models,
            ConstructionStage::Storage => &self.storage_models,
            ConstructionStage::Hauling => &self.hauling_models,
        }
    }

    /// Run `f` against the cached model for a stage, building it first if
    /// needed. `f` must not re-enter the caches; recursive queries
    /// (incremental differencing, datum adjustment) happen between calls.
    fn with_model<R>(
        &self,
        key: &SegmentKey,
        stage: ConstructionStage,
        f: impl FnOnce(&mut SegmentModel) -> R,
    ) -> R {
        let mut models = self.cache_for(stage).borrow_mut();
        let model = models
            .entry(*key)
            .or_insert_with(|| self.build_model(key, stage));
        trace!(
            "Using {} model of {key} (interval {})",
            model.stage,
            model.interval
        );
        f(model)
    }

    fn build_model(&self, key: &SegmentKey, stage: ConstructionStage) -> SegmentModel {
        let timeline = &self.env.timeline;
        let geometry = &self.env.geometry;
        let interval = match stage {
            ConstructionStage::Release => timeline.release_interval(key),
            ConstructionStage::Lifting => timeline.lifting_interval(key),
            ConstructionStage::Storage => timeline.storage_interval(key),
            ConstructionStage::Hauling => timeline.hauling_interval(key),
        };
        let (left_support, right_support) = match stage {
            ConstructionStage::Release => (0.0, 0.0),
            ConstructionStage::Lifting => geometry.lift_points(key),
            ConstructionStage::Storage => geometry.storage_support_points(key),
            ConstructionStage::Hauling => geometry.haul_points(key),
        };

        debug!("Building {stage} model for {key} (interval {interval})");

        let length = geometry.segment_length(key);
        let pois: Vec<PointOfInterest> = self
            .env
            .pois
            .pois_on_segment(key)
            .into_iter()
            .filter(|poi| {
                !poi.is_off_segment()
                    && poi.dist_from_start >= 0.0
                    && poi.dist_from_start <= length
            })
            .collect();
        let mid = self.midspan_poi(key, &pois);
        let coefficients = self.env.sections.stress_coefficients(interval, &mid);

        let blueprint = SegmentModelBlueprint {
            segment_length: length,
            left_support,
            right_support,
            e: self.env.materials.segment_ec(key, interval),
            area: self.env.sections.area(interval, &mid),
            ixx: coefficients.ixx,
            self_weight: geometry.self_weight_intensity(key),
            pois: pois.iter().map(|poi| (poi.id, poi.dist_from_start)).collect(),
        };

        let girder_case = self.load_map.load_case_id(ProductForceType::Girder);
        let built = SegmentModelFactory::build(&blueprint, girder_case)
            .unwrap_or_else(|e| panic!("cannot build {stage} model for {key}: {e}"));
        let mut model = SegmentModel::new(stage, interval, built);

        // Product channels other than girder self-weight start registered
        // but empty, so unloaded categories answer zero instead of failing.
        for category in self.load_map.categories() {
            if category != ProductForceType::Girder {
                model.fem.create_loading(self.load_map.load_case_id(category));
            }
        }

        model
    }

    fn midspan_poi(&self, key: &SegmentKey, pois: &[PointOfInterest]) -> PointOfInterest {
        let length = self.env.geometry.segment_length(key);
        pois.iter()
            .find(|poi| poi.has_attribute(attributes::MIDSPAN))
            .or_else(|| {
                pois.iter().min_by(|a, b| {
                    (a.dist_from_start - length / 2.0)
                        .abs()
                        .total_cmp(&(b.dist_from_start - length / 2.0).abs())
                })
            })
            .cloned()
            .unwrap_or_else(|| panic!("{key} has no points of interest"))
    }

    // ------------------------------------------------------------------
    // Lazy load application

    fn ensure_pretension(&self, model: &mut SegmentModel, key: &SegmentKey) {
        for strand in StrandType::ALL {
            for axis in [BendingAxis::Vertical, BendingAxis::Lateral] {
                let case = self.load_map.strand_case_id(strand, axis);
                if model.applied.contains(&case) {
                    continue;
                }
                debug!("Applying {strand:?}/{axis:?} pretension loads to {key}");
                model.fem.create_loading(case);
                for load in self.env.tendons.equiv_pretension_loads(key, strand, axis) {
                    model.fem.add_point_load(case, load.x, 0.0, load.p, load.m);
                }
                model.applied.insert(case);
            }
        }
    }

    fn ensure_post_tension(&self, model: &mut SegmentModel, key: &SegmentKey) {
        let case = self.load_map.post_tension_id();
        if model.applied.contains(&case) {
            return;
        }
        debug!("Applying post-tension loads to {key}");
        model.fem.create_loading(case);
        for load in self.env.tendons.equiv_post_tension_loads(key) {
            model.fem.add_point_load(case, load.x, 0.0, load.p, load.m);
        }
        model.applied.insert(case);
    }

    /// Bring a named-load channel in sync with the definitions that exist
    /// for this segment at or before the interval.
    fn ensure_named(
        &self,
        model: &mut SegmentModel,
        key: &SegmentKey,
        case: LoadCaseId,
        interval: IntervalIndex,
    ) {
        let defs = self.load_defs.borrow();
        let wanted: Vec<usize> = defs
            .iter()
            .enumerate()
            .filter(|(_, def)| {
                def.group_id == case && def.segment == *key && def.interval <= interval
            })
            .map(|(index, _)| index)
            .collect();

        if model.named_applied.get(&case) == Some(&wanted) {
            return;
        }

        if model.fem.has_loading(case) {
            model.fem.clear_loading(case);
        } else {
            model.fem.create_loading(case);
        }
        for index in &wanted {
            match defs[*index].kind {
                ExternalLoadKind::Concentrated {
                    x,
                    direction,
                    magnitude,
                } => {
                    let (fx, fy, mz) = match direction {
                        LoadDirection::Fx => (magnitude, 0.0, 0.0),
                        LoadDirection::Fy => (0.0, magnitude, 0.0),
                        LoadDirection::Mz => (0.0, 0.0, magnitude),
                    };
                    model.fem.add_point_load(case, x, fx, fy, mz);
                }
                ExternalLoadKind::Uniform { x1, x2, w } => {
                    model.fem.add_linear_load(case, x1, x2, w, w);
                }
                ExternalLoadKind::InitialStrain { x1, x2, e, r } => {
                    model.fem.add_strain_load(case, x1, x2, e, r);
                }
            }
        }
        model.named_applied.insert(case, wanted);
    }

    // ------------------------------------------------------------------
    // Result primitive

    /// Cumulative section results for one loading channel at each point.
    fn cumulative_case_results(
        &self,
        interval: IntervalIndex,
        case: LoadCaseId,
        apply: ApplyLoads,
        vpoi: &[PointOfInterest],
    ) -> Vec<SectionResults> {
        vpoi.iter()
            .map(|poi| self.cumulative_case_result(interval, case, apply, poi))
            .collect()
    }

    fn cumulative_case_result(
        &self,
        interval: IntervalIndex,
        case: LoadCaseId,
        apply: ApplyLoads,
        poi: &PointOfInterest,
    ) -> SectionResults {
        if poi.is_off_segment() {
            return SectionResults::ZERO;
        }
        let key = poi.segment;
        let Some(stage) = self.stage_for(&key, interval) else {
            // Not released yet; the segment carries no load.
            return SectionResults::ZERO;
        };
        self.with_model(&key, stage, |model| {
            match apply {
                ApplyLoads::None => {}
                ApplyLoads::Pretension => self.ensure_pretension(model, &key),
                ApplyLoads::PostTension => self.ensure_post_tension(model, &key),
                ApplyLoads::Named => self.ensure_named(model, &key, case, interval),
            }
            let joint = model.joint_for(poi);
            let faces = solved(model.fem.face_forces(case, joint), case);
            let d = solved(model.fem.displacement(case, joint), case);
            SectionResults {
                fx: SectionValue::new(faces.left[0], faces.right[0]),
                // The raw left-face transverse force is the negated
                // conventional shear.
                fy: SectionValue::new(-faces.left[1], faces.right[1]),
                mz: SectionValue::new(faces.left[2], faces.right[2]),
                dx: d[0],
                dy: d[1],
                rz: d[2],
            }
        })
    }

    /// Section results for one channel with the incremental/cumulative rule
    /// applied: incremental(i) = cumulative(i) - cumulative(i - 1), with a
    /// zero baseline at interval 0.
    fn case_results(
        &self,
        interval: IntervalIndex,
        case: LoadCaseId,
        apply: ApplyLoads,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<SectionResults> {
        let current = self.cumulative_case_results(interval, case, apply, vpoi);
        match results_type {
            ResultsType::Cumulative => current,
            ResultsType::Incremental => {
                if interval == 0 {
                    return current;
                }
                let previous = self.cumulative_case_results(interval - 1, case, apply, vpoi);
                current
                    .into_iter()
                    .zip(previous)
                    .map(|(now, before)| now - before)
                    .collect()
            }
        }
    }

    // ------------------------------------------------------------------
    // Product-load queries

    /// Full section results for one product-load category.
    pub fn product_section_results(
        &self,
        interval: IntervalIndex,
        force_type: ProductForceType,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<SectionResults> {
        match force_type {
            ProductForceType::Pretension => {
                let mut totals = vec![SectionResults::ZERO; vpoi.len()];
                for strand in StrandType::ALL {
                    let case = self.load_map.strand_case_id(strand, BendingAxis::Vertical);
                    let results =
                        self.case_results(interval, case, ApplyLoads::Pretension, vpoi, results_type);
                    accumulate(&mut totals, &results);
                }
                totals
            }
            ProductForceType::PostTensioning => self.case_results(
                interval,
                self.load_map.post_tension_id(),
                ApplyLoads::PostTension,
                vpoi,
                results_type,
            ),
            _ => self.case_results(
                interval,
                self.load_map.load_case_id(force_type),
                ApplyLoads::None,
                vpoi,
                results_type,
            ),
        }
    }

    pub fn product_axials(
        &self,
        interval: IntervalIndex,
        force_type: ProductForceType,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<f64> {
        let results = self.product_section_results(interval, force_type, vpoi, results_type);
        extract_axials(&results, vpoi)
    }

    pub fn product_shears(
        &self,
        interval: IntervalIndex,
        force_type: ProductForceType,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<SectionValue> {
        self.product_section_results(interval, force_type, vpoi, results_type)
            .iter()
            .map(|r| r.fy)
            .collect()
    }

    pub fn product_moments(
        &self,
        interval: IntervalIndex,
        force_type: ProductForceType,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<f64> {
        let results = self.product_section_results(interval, force_type, vpoi, results_type);
        extract_moments(&results, vpoi)
    }

    pub fn product_deflections(
        &self,
        interval: IntervalIndex,
        force_type: ProductForceType,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<f64> {
        if force_type == ProductForceType::Pretension {
            return self
                .pretension_deformations(interval, vpoi, results_type)
                .into_iter()
                .map(|(dy, _)| dy)
                .collect();
        }
        self.product_section_results(interval, force_type, vpoi, results_type)
            .iter()
            .map(|r| r.dy)
            .collect()
    }

    pub fn product_rotations(
        &self,
        interval: IntervalIndex,
        force_type: ProductForceType,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<f64> {
        if force_type == ProductForceType::Pretension {
            return self
                .pretension_deformations(interval, vpoi, results_type)
                .into_iter()
                .map(|(_, rz)| rz)
                .collect();
        }
        self.product_section_results(interval, force_type, vpoi, results_type)
            .iter()
            .map(|r| r.rz)
            .collect()
    }

    /// Top and bottom fiber stresses for one product-load category.
    pub fn product_stresses(
        &self,
        interval: IntervalIndex,
        force_type: ProductForceType,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
        top: StressLocation,
        bottom: StressLocation,
    ) -> (Vec<f64>, Vec<f64>) {
        if force_type == ProductForceType::Pretension {
            return self.pretension_stresses(interval, vpoi, results_type, top, bottom);
        }
        let results = self.product_section_results(interval, force_type, vpoi, results_type);
        self.stresses_from_results(interval, &results, vpoi, top, bottom)
    }

    /// (left, right) support reactions of a segment. Only girder self
    /// weight produces reactions in these models.
    pub fn product_reactions(
        &self,
        key: &SegmentKey,
        interval: IntervalIndex,
        force_type: ProductForceType,
        results_type: ResultsType,
    ) -> (f64, f64) {
        if force_type != ProductForceType::Girder {
            return (0.0, 0.0);
        }
        match results_type {
            ResultsType::Cumulative => self.cumulative_girder_reactions(key, interval),
            ResultsType::Incremental => {
                let (left, right) = self.cumulative_girder_reactions(key, interval);
                if interval == 0 {
                    return (left, right);
                }
                let (prev_left, prev_right) =
                    self.cumulative_girder_reactions(key, interval - 1);
                (left - prev_left, right - prev_right)
            }
        }
    }

    fn cumulative_girder_reactions(&self, key: &SegmentKey, interval: IntervalIndex) -> (f64, f64) {
        let Some(stage) = self.stage_for(key, interval) else {
            return (0.0, 0.0);
        };
        let case = self.load_map.load_case_id(ProductForceType::Girder);
        self.with_model(key, stage, |model| {
            let joints = model.fem.support_joints();
            let left = solved(model.fem.reaction(case, joints[0]), case);
            let right = solved(model.fem.reaction(case, joints[joints.len() - 1]), case);
            (left[1], right[1])
        })
    }

    // ------------------------------------------------------------------
    // Pretension deflections and stresses

    /// (deflection, rotation) per point for the pretension force group.
    ///
    /// The deformation shape is set at release; the biaxial correction
    /// folds the lateral strand cases into the vertical plane. From
    /// lifting on, the shape is re-referenced to the supports of the
    /// current stage by removing a straight line fitted through the
    /// support deflections.
    fn pretension_deformations(
        &self,
        interval: IntervalIndex,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<(f64, f64)> {
        let current = self.cumulative_pretension_deformations(interval, vpoi);
        match results_type {
            ResultsType::Cumulative => current,
            ResultsType::Incremental => {
                if interval == 0 {
                    return current;
                }
                let previous = self.cumulative_pretension_deformations(interval - 1, vpoi);
                current
                    .into_iter()
                    .zip(previous)
                    .map(|((dy, rz), (pdy, prz))| (dy - pdy, rz - prz))
                    .collect()
            }
        }
    }

    fn cumulative_pretension_deformations(
        &self,
        interval: IntervalIndex,
        vpoi: &[PointOfInterest],
    ) -> Vec<(f64, f64)> {
        vpoi.iter()
            .map(|poi| {
                let key = poi.segment;
                let Some(stage) = self.stage_for(&key, interval) else {
                    return (0.0, 0.0);
                };
                let (dy, rz) = self.release_deformation(poi);
                if stage == ConstructionStage::Release {
                    return (dy, rz);
                }

                let supports = self.env.pois.support_pois(&key, stage);
                assert!(
                    !supports.is_empty(),
                    "{key} has no support POIs for the {stage} stage"
                );
                let first = &supports[0];
                let last = &supports[supports.len() - 1];
                let (y1, _) = self.release_deformation(first);
                if supports.len() == 1 || (last.dist_from_start - first.dist_from_start).abs() < 1e-9
                {
                    return (dy - y1, rz);
                }
                let (y2, _) = self.release_deformation(last);
                let slope = (y2 - y1) / (last.dist_from_start - first.dist_from_start);
                let line = y1 + slope * (poi.dist_from_start - first.dist_from_start);
                (dy - line, rz - slope)
            })
            .collect()
    }

    /// Biaxially corrected pretension deformation on the release model.
    fn release_deformation(&self, poi: &PointOfInterest) -> (f64, f64) {
        let key = poi.segment;
        let release = self.env.timeline.release_interval(&key);
        let pois = self.env.pois.pois_on_segment(&key);
        let mid = self.midspan_poi(&key, &pois);
        let coefficients = self.env.sections.stress_coefficients(release, &mid);
        let lateral_factor = if coefficients.iyy.abs() > 0.0 {
            -coefficients.ixy / coefficients.iyy
        } else {
            0.0
        };

        let slice = std::slice::from_ref(poi);
        let mut dy = 0.0;
        let mut rz = 0.0;
        for strand in StrandType::ALL {
            let vertical = self.load_map.strand_case_id(strand, BendingAxis::Vertical);
            let result =
                self.cumulative_case_results(release, vertical, ApplyLoads::Pretension, slice);
            dy += result[0].dy;
            rz += result[0].rz;

            if lateral_factor != 0.0 {
                let lateral = self.load_map.strand_case_id(strand, BendingAxis::Lateral);
                let result =
                    self.cumulative_case_results(release, lateral, ApplyLoads::Pretension, slice);
                dy += lateral_factor * result[0].dy;
                rz += lateral_factor * result[0].rz;
            }
        }
        (dy, rz)
    }

    /// Pretension stresses from axial force and eccentricity rather than
    /// the equivalent-load models.
    fn pretension_stresses(
        &self,
        interval: IntervalIndex,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
        top: StressLocation,
        bottom: StressLocation,
    ) -> (Vec<f64>, Vec<f64>) {
        let current = self.cumulative_pretension_stresses(interval, vpoi, top, bottom);
        match results_type {
            ResultsType::Cumulative => current,
            ResultsType::Incremental => {
                if interval == 0 {
                    return current;
                }
                let previous =
                    self.cumulative_pretension_stresses(interval - 1, vpoi, top, bottom);
                let diff = |now: Vec<f64>, before: Vec<f64>| {
                    now.into_iter()
                        .zip(before)
                        .map(|(n, b)| n - b)
                        .collect::<Vec<f64>>()
                };
                (diff(current.0, previous.0), diff(current.1, previous.1))
            }
        }
    }

    fn cumulative_pretension_stresses(
        &self,
        interval: IntervalIndex,
        vpoi: &[PointOfInterest],
        top: StressLocation,
        bottom: StressLocation,
    ) -> (Vec<f64>, Vec<f64>) {
        let mut f_top = Vec::with_capacity(vpoi.len());
        let mut f_bottom = Vec::with_capacity(vpoi.len());
        for poi in vpoi {
            let key = poi.segment;
            if poi.is_off_segment() || self.stage_for(&key, interval).is_none() {
                f_top.push(0.0);
                f_bottom.push(0.0);
                continue;
            }
            let area = self.env.sections.area(interval, poi);
            let s_top = self.env.sections.section_modulus(interval, poi, top);
            let s_bottom = self.env.sections.section_modulus(interval, poi, bottom);
            let mut ft = 0.0;
            let mut fb = 0.0;
            for strand in StrandType::ALL {
                let p = self.env.tendons.pretension_force(&key, strand, interval);
                if p == 0.0 {
                    continue;
                }
                let e = self.env.tendons.eccentricity(interval, poi, strand);
                ft += fiber_stress(-p, -p * e, area, s_top);
                fb += fiber_stress(-p, -p * e, area, s_bottom);
            }
            f_top.push(ft);
            f_bottom.push(fb);
        }
        (f_top, f_bottom)
    }

    fn stresses_from_results(
        &self,
        interval: IntervalIndex,
        results: &[SectionResults],
        vpoi: &[PointOfInterest],
        top: StressLocation,
        bottom: StressLocation,
    ) -> (Vec<f64>, Vec<f64>) {
        let mut f_top = Vec::with_capacity(vpoi.len());
        let mut f_bottom = Vec::with_capacity(vpoi.len());
        for (result, poi) in results.iter().zip(vpoi) {
            // At the start face the left member does not exist; read the
            // negated right face instead.
            let (n, m) = if poi.is_at_start() {
                (-result.fx.right, -result.mz.right)
            } else {
                (result.fx.left, result.mz.left)
            };
            let area = self.env.sections.area(interval, poi);
            let s_top = self.env.sections.section_modulus(interval, poi, top);
            let s_bottom = self.env.sections.section_modulus(interval, poi, bottom);
            f_top.push(fiber_stress(n, m, area, s_top));
            f_bottom.push(fiber_stress(n, m, area, s_bottom));
        }
        (f_top, f_bottom)
    }

    // ------------------------------------------------------------------
    // Combination queries

    fn combination_groups(&self, combination: LoadingCombination) -> Vec<String> {
        self.group_combinations
            .borrow()
            .get(&combination)
            .cloned()
            .unwrap_or_default()
    }

    /// Full section results for a combination: the sum of its product-load
    /// members plus every named load group registered to it.
    pub fn combination_section_results(
        &self,
        interval: IntervalIndex,
        combination: LoadingCombination,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<SectionResults> {
        let config = self.env.geometry.config();
        let mut totals = vec![SectionResults::ZERO; vpoi.len()];
        for member in self.load_map.combination_members(combination, &config) {
            let results = self.product_section_results(interval, member, vpoi, results_type);
            accumulate(&mut totals, &results);
        }
        for name in self.combination_groups(combination) {
            let results = self.named_case_results(interval, &name, vpoi, results_type, true);
            accumulate(&mut totals, &results);
        }
        totals
    }

    pub fn combination_axials(
        &self,
        interval: IntervalIndex,
        combination: LoadingCombination,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<f64> {
        let results =
            self.combination_section_results(interval, combination, vpoi, results_type);
        extract_axials(&results, vpoi)
    }

    pub fn combination_shears(
        &self,
        interval: IntervalIndex,
        combination: LoadingCombination,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<SectionValue> {
        self.combination_section_results(interval, combination, vpoi, results_type)
            .iter()
            .map(|r| r.fy)
            .collect()
    }

    pub fn combination_moments(
        &self,
        interval: IntervalIndex,
        combination: LoadingCombination,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<f64> {
        let results =
            self.combination_section_results(interval, combination, vpoi, results_type);
        extract_moments(&results, vpoi)
    }

    pub fn combination_deflections(
        &self,
        interval: IntervalIndex,
        combination: LoadingCombination,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<f64> {
        self.combination_section_results(interval, combination, vpoi, results_type)
            .iter()
            .map(|r| r.dy)
            .collect()
    }

    pub fn combination_rotations(
        &self,
        interval: IntervalIndex,
        combination: LoadingCombination,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<f64> {
        self.combination_section_results(interval, combination, vpoi, results_type)
            .iter()
            .map(|r| r.rz)
            .collect()
    }

    pub fn combination_stresses(
        &self,
        interval: IntervalIndex,
        combination: LoadingCombination,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
        top: StressLocation,
        bottom: StressLocation,
    ) -> (Vec<f64>, Vec<f64>) {
        let results =
            self.combination_section_results(interval, combination, vpoi, results_type);
        self.stresses_from_results(interval, &results, vpoi, top, bottom)
    }

    pub fn combination_reactions(
        &self,
        key: &SegmentKey,
        interval: IntervalIndex,
        combination: LoadingCombination,
        results_type: ResultsType,
    ) -> (f64, f64) {
        let config = self.env.geometry.config();
        let mut left = 0.0;
        let mut right = 0.0;
        for member in self.load_map.combination_members(combination, &config) {
            let (l, r) = self.product_reactions(key, interval, member, results_type);
            left += l;
            right += r;
        }
        (left, right)
    }

    // ------------------------------------------------------------------
    // Limit-state queries

    /// DC-factored (min, max) moments. Values are ordered, so a hogging
    /// moment has min = gamma_max * M.
    pub fn limit_state_moments(
        &self,
        interval: IntervalIndex,
        limit_state: LimitState,
        vpoi: &[PointOfInterest],
    ) -> Vec<(f64, f64)> {
        let base =
            self.combination_moments(interval, LoadingCombination::Dc, vpoi, ResultsType::Cumulative);
        self.factored(&base, limit_state)
    }

    pub fn limit_state_shears(
        &self,
        interval: IntervalIndex,
        limit_state: LimitState,
        vpoi: &[PointOfInterest],
    ) -> Vec<(SectionValue, SectionValue)> {
        let factors = self.env.load_factors.dc_factors(limit_state);
        self.combination_shears(interval, LoadingCombination::Dc, vpoi, ResultsType::Cumulative)
            .into_iter()
            .map(|v| {
                let a = v.scale(factors.dc_min);
                let b = v.scale(factors.dc_max);
                (
                    SectionValue::new(a.left.min(b.left), a.right.min(b.right)),
                    SectionValue::new(a.left.max(b.left), a.right.max(b.right)),
                )
            })
            .collect()
    }

    pub fn limit_state_deflections(
        &self,
        interval: IntervalIndex,
        limit_state: LimitState,
        vpoi: &[PointOfInterest],
        include_prestress: bool,
    ) -> Vec<(f64, f64)> {
        let base = self.combination_deflections(
            interval,
            LoadingCombination::Dc,
            vpoi,
            ResultsType::Cumulative,
        );
        let mut envelope = self.factored(&base, limit_state);
        if include_prestress {
            let prestress = self.product_deflections(
                interval,
                ProductForceType::Pretension,
                vpoi,
                ResultsType::Cumulative,
            );
            add_offsets(&mut envelope, &prestress);
        }
        envelope
    }

    pub fn limit_state_rotations(
        &self,
        interval: IntervalIndex,
        limit_state: LimitState,
        vpoi: &[PointOfInterest],
        include_prestress: bool,
    ) -> Vec<(f64, f64)> {
        let base = self.combination_rotations(
            interval,
            LoadingCombination::Dc,
            vpoi,
            ResultsType::Cumulative,
        );
        let mut envelope = self.factored(&base, limit_state);
        if include_prestress {
            let prestress = self.product_rotations(
                interval,
                ProductForceType::Pretension,
                vpoi,
                ResultsType::Cumulative,
            );
            add_offsets(&mut envelope, &prestress);
        }
        envelope
    }

    pub fn limit_state_stresses(
        &self,
        interval: IntervalIndex,
        limit_state: LimitState,
        vpoi: &[PointOfInterest],
        include_prestress: bool,
        top: StressLocation,
        bottom: StressLocation,
    ) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
        let (base_top, base_bottom) = self.combination_stresses(
            interval,
            LoadingCombination::Dc,
            vpoi,
            ResultsType::Cumulative,
            top,
            bottom,
        );
        let mut top_envelope = self.factored(&base_top, limit_state);
        let mut bottom_envelope = self.factored(&base_bottom, limit_state);
        if include_prestress {
            let (ps_top, ps_bottom) = self.pretension_stresses(
                interval,
                vpoi,
                ResultsType::Cumulative,
                top,
                bottom,
            );
            add_offsets(&mut top_envelope, &ps_top);
            add_offsets(&mut bottom_envelope, &ps_bottom);
        }
        (top_envelope, bottom_envelope)
    }

    pub fn limit_state_reactions(
        &self,
        key: &SegmentKey,
        interval: IntervalIndex,
        limit_state: LimitState,
    ) -> ((f64, f64), (f64, f64)) {
        let factors = self.env.load_factors.dc_factors(limit_state);
        let (left, right) = self.combination_reactions(
            key,
            interval,
            LoadingCombination::Dc,
            ResultsType::Cumulative,
        );
        let order = |v: f64| {
            let a = factors.dc_min * v;
            let b = factors.dc_max * v;
            (a.min(b), a.max(b))
        };
        (order(left), order(right))
    }

    fn factored(&self, base: &[f64], limit_state: LimitState) -> Vec<(f64, f64)> {
        let factors = self.env.load_factors.dc_factors(limit_state);
        base.iter()
            .map(|v| {
                let a = factors.dc_min * v;
                let b = factors.dc_max * v;
                (a.min(b), a.max(b))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Named external load groups

    /// Register a named load group on one girder line. The group gets the
    /// next channel ID from the external range.
    pub fn create_load_group(&self, girder_line: usize, name: &str) -> AnalysisResult<()> {
        let mut groups = self.load_groups.borrow_mut();
        let group_key = (girder_line, name.to_string());
        if groups.contains_key(&group_key) {
            return Err(AnalysisError::DuplicateLoadGroup(name.to_string()));
        }
        let id = self.next_external_id.get();
        self.next_external_id.set(id + 1);
        debug!("Created load group '{name}' on girder line {girder_line} (case {id})");
        groups.insert(group_key, LoadCaseId(id));
        Ok(())
    }

    /// Aggregate a load group into a combination. Queries for the
    /// combination will include the group on segments of its girder line.
    pub fn add_load_group_to_combination(&self, name: &str, combination: LoadingCombination) {
        let mut map = self.group_combinations.borrow_mut();
        let names = map.entry(combination).or_default();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    /// Add a concentrated load at a point of interest, first acting during
    /// the given interval.
    pub fn create_concentrated_load(
        &self,
        interval: IntervalIndex,
        group: &str,
        poi: &PointOfInterest,
        direction: LoadDirection,
        magnitude: f64,
    ) {
        let case = self.group_case(group, &poi.segment);
        self.load_defs.borrow_mut().push(NamedLoadDef {
            group_id: case,
            segment: poi.segment,
            interval,
            kind: ExternalLoadKind::Concentrated {
                x: poi.dist_from_start,
                direction,
                magnitude,
            },
        });
    }

    /// Add a uniform transverse load between two points of the same
    /// segment.
    pub fn create_uniform_load(
        &self,
        interval: IntervalIndex,
        group: &str,
        poi1: &PointOfInterest,
        poi2: &PointOfInterest,
        w: f64,
    ) {
        assert_eq!(
            poi1.segment, poi2.segment,
            "uniform load endpoints must be on the same segment"
        );
        let case = self.group_case(group, &poi1.segment);
        let (x1, x2) = ordered(poi1.dist_from_start, poi2.dist_from_start);
        self.load_defs.borrow_mut().push(NamedLoadDef {
            group_id: case,
            segment: poi1.segment,
            interval,
            kind: ExternalLoadKind::Uniform { x1, x2, w },
        });
    }

    /// Add an imposed axial strain and curvature between two points of the
    /// same segment.
    pub fn create_initial_strain_load(
        &self,
        interval: IntervalIndex,
        group: &str,
        poi1: &PointOfInterest,
        poi2: &PointOfInterest,
        e: f64,
        r: f64,
    ) {
        assert_eq!(
            poi1.segment, poi2.segment,
            "initial strain load endpoints must be on the same segment"
        );
        let case = self.group_case(group, &poi1.segment);
        let (x1, x2) = ordered(poi1.dist_from_start, poi2.dist_from_start);
        self.load_defs.borrow_mut().push(NamedLoadDef {
            group_id: case,
            segment: poi1.segment,
            interval,
            kind: ExternalLoadKind::InitialStrain { x1, x2, e, r },
        });
    }

    fn group_case(&self, name: &str, key: &SegmentKey) -> LoadCaseId {
        let line = self.env.geometry.girder_line(key);
        self.try_group_case(name, key).unwrap_or_else(|| {
            panic!("load group '{name}' was never created for girder line {line}")
        })
    }

    fn try_group_case(&self, name: &str, key: &SegmentKey) -> Option<LoadCaseId> {
        let line = self.env.geometry.girder_line(key);
        self.load_groups
            .borrow()
            .get(&(line, name.to_string()))
            .copied()
    }

    fn named_case_results(
        &self,
        interval: IntervalIndex,
        name: &str,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
        missing_is_zero: bool,
    ) -> Vec<SectionResults> {
        vpoi.iter()
            .map(|poi| {
                let case = if missing_is_zero {
                    match self.try_group_case(name, &poi.segment) {
                        Some(case) => case,
                        None => return SectionResults::ZERO,
                    }
                } else {
                    self.group_case(name, &poi.segment)
                };
                self.case_results(
                    interval,
                    case,
                    ApplyLoads::Named,
                    std::slice::from_ref(poi),
                    results_type,
                )[0]
            })
            .collect()
    }

    /// Full section results for a named load group. Fatal if the group was
    /// never created on a queried segment's girder line.
    pub fn named_section_results(
        &self,
        interval: IntervalIndex,
        name: &str,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<SectionResults> {
        self.named_case_results(interval, name, vpoi, results_type, false)
    }

    pub fn named_axials(
        &self,
        interval: IntervalIndex,
        name: &str,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<f64> {
        let results = self.named_section_results(interval, name, vpoi, results_type);
        extract_axials(&results, vpoi)
    }

    pub fn named_shears(
        &self,
        interval: IntervalIndex,
        name: &str,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<SectionValue> {
        self.named_section_results(interval, name, vpoi, results_type)
            .iter()
            .map(|r| r.fy)
            .collect()
    }

    pub fn named_moments(
        &self,
        interval: IntervalIndex,
        name: &str,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<f64> {
        let results = self.named_section_results(interval, name, vpoi, results_type);
        extract_moments(&results, vpoi)
    }

    pub fn named_deflections(
        &self,
        interval: IntervalIndex,
        name: &str,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<f64> {
        self.named_section_results(interval, name, vpoi, results_type)
            .iter()
            .map(|r| r.dy)
            .collect()
    }

    pub fn named_rotations(
        &self,
        interval: IntervalIndex,
        name: &str,
        vpoi: &[PointOfInterest],
        results_type: ResultsType,
    ) -> Vec<f64> {
        self.named_section_results(interval, name, vpoi, results_type)
            .iter()
            .map(|r| r.rz)
            .collect()
    }

    // ------------------------------------------------------------------
    // Influence channels

    /// Moments at each point due to a unit transverse force at
    /// `unit_load_poi`. Zero wherever the load point is on another segment
    /// or was not registered when the model was built.
    pub fn unit_load_moments(
        &self,
        interval: IntervalIndex,
        vpoi: &[PointOfInterest],
        unit_load_poi: &PointOfInterest,
    ) -> Vec<f64> {
        self.influence_face_moments(interval, vpoi, unit_load_poi, false)
            .into_iter()
            .zip(vpoi)
            .map(|(raw, poi)| {
                if poi.is_at_start() {
                    -raw.right
                } else {
                    raw.left
                }
            })
            .collect()
    }

    /// Moments at each point due to a unit couple at `unit_couple_poi`.
    ///
    /// The couple puts a jump in the moment diagram at the load point, so
    /// both faces are reported. The right face is negated to the
    /// conventional sign, making `left` the ordinate just before the jump
    /// and `right` the ordinate just after it.
    pub fn unit_couple_moments(
        &self,
        interval: IntervalIndex,
        vpoi: &[PointOfInterest],
        unit_couple_poi: &PointOfInterest,
    ) -> Vec<SectionValue> {
        self.influence_face_moments(interval, vpoi, unit_couple_poi, true)
            .into_iter()
            .map(|raw| SectionValue::new(raw.left, -raw.right))
            .collect()
    }

    /// Raw (left, right) face moments for an influence channel.
    fn influence_face_moments(
        &self,
        interval: IntervalIndex,
        vpoi: &[PointOfInterest],
        unit_poi: &PointOfInterest,
        couple: bool,
    ) -> Vec<SectionValue> {
        vpoi.iter()
            .map(|poi| {
                if poi.is_off_segment() || poi.segment != unit_poi.segment {
                    return SectionValue::ZERO;
                }
                let key = poi.segment;
                let Some(stage) = self.stage_for(&key, interval) else {
                    return SectionValue::ZERO;
                };
                self.with_model(&key, stage, |model| {
                    let case = if couple {
                        model.unit_moment_case(unit_poi.id)
                    } else {
                        model.unit_load_case(unit_poi.id)
                    };
                    let Some(case) = case else {
                        return SectionValue::ZERO;
                    };
                    let joint = model.joint_for(poi);
                    let faces = solved(model.fem.face_forces(case, joint), case);
                    SectionValue::new(faces.left[2], faces.right[2])
                })
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Erected deflection datum

    /// Support points an erected segment's deflections should be measured
    /// against, chosen from the erected support topology.
    pub fn erected_deflection_datum(&self, key: &SegmentKey) -> DatumSelection {
        select_datum(&self.env.pois.support_topology(key))
    }
}

/// Panic wrapper for engine results. These models always carry two
/// supports, so a singular system means a programming error upstream.
fn solved<T>(result: AnalysisResult<T>, case: LoadCaseId) -> T {
    result.unwrap_or_else(|e| panic!("structural solution failed for load case {case}: {e}"))
}

fn fiber_stress(n: f64, m: f64, area: f64, modulus: f64) -> f64 {
    let mut f = 0.0;
    if area.abs() > 0.0 {
        f += n / area;
    }
    if modulus.abs() > 0.0 {
        f += m / modulus;
    }
    f
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Element-wise sum of a result list into a running total. The lists must
/// line up one-to-one with the queried points.
fn accumulate(totals: &mut [SectionResults], results: &[SectionResults]) {
    assert_eq!(
        totals.len(),
        results.len(),
        "result lists must be the same length"
    );
    for (total, r) in totals.iter_mut().zip(results) {
        *total = *total + *r;
    }
}

/// Shift every (min, max) pair of an envelope by the matching offset.
fn add_offsets(envelope: &mut [(f64, f64)], offsets: &[f64]) {
    assert_eq!(
        envelope.len(),
        offsets.len(),
        "result lists must be the same length"
    );
    for (pair, offset) in envelope.iter_mut().zip(offsets) {
        pair.0 += offset;
        pair.1 += offset;
    }
}

/// Conventional axial force per point: the left face, except at the start
/// of the segment where only the right face exists.
fn extract_axials(results: &[SectionResults], vpoi: &[PointOfInterest]) -> Vec<f64> {
    results
        .iter()
        .zip(vpoi)
        .map(|(r, poi)| {
            if poi.is_at_start() {
                -r.fx.right
            } else {
                r.fx.left
            }
        })
        .collect()
}

/// Conventional bending moment per point, same face rule as axial.
fn extract_moments(results: &[SectionResults], vpoi: &[PointOfInterest]) -> Vec<f64> {
    results
        .iter()
        .zip(vpoi)
        .map(|(r, poi)| {
            if poi.is_at_start() {
                -r.mz.right
            } else {
                r.mz.left
            }
        })
        .collect()
}
