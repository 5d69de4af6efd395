//! Collinear beam-chain implementation of the structural engine

use super::math::{
    beam_local_stiffness, fer_linear_load, fer_point_force, fer_point_moment,
    solve_linear_system, Mat, Vec6,
};
use super::{FaceForces, FemModel, JointId};
use crate::error::{AnalysisError, AnalysisResult};
use crate::loads::LoadCaseId;
use log::{debug, trace};
use nalgebra::DVector;
use std::collections::HashMap;

/// Positions closer than this are the same joint.
const POSITION_TOL: f64 = 1.0e-6;

/// Uniform section of the chain.
#[derive(Debug, Clone, Copy)]
pub struct BeamSection {
    /// Modulus of elasticity
    pub e: f64,
    /// Cross-sectional area
    pub a: f64,
    /// Moment of inertia about the bending axis
    pub i: f64,
}

#[derive(Debug, Clone, Copy)]
struct PointLoad {
    x: f64,
    fx: f64,
    fy: f64,
    mz: f64,
}

#[derive(Debug, Clone, Copy)]
struct LinearLoad {
    x1: f64,
    x2: f64,
    w1: f64,
    w2: f64,
}

#[derive(Debug, Clone, Copy)]
struct StrainLoad {
    x1: f64,
    x2: f64,
    e: f64,
    r: f64,
}

#[derive(Debug, Clone, Default)]
struct Loading {
    points: Vec<PointLoad>,
    linears: Vec<LinearLoad>,
    strains: Vec<StrainLoad>,
}

impl Loading {
    fn is_empty(&self) -> bool {
        self.points.is_empty() && self.linears.is_empty() && self.strains.is_empty()
    }
}

/// Solved state for one loading channel. Indexed by slot (position in the
/// sorted joint order), not by joint id.
#[derive(Debug, Clone)]
struct Solution {
    /// [dx, dy, rz] per slot.
    displacements: Vec<[f64; 3]>,
    /// Member end forces [i; j] per span between consecutive slots.
    member_forces: Vec<Vec6>,
    /// Loads applied directly to a joint, per slot.
    nodal_applied: Vec<[f64; 3]>,
}

/// A single-span chain of collinear beam members with two or more rigid
/// vertical supports. Joints carry stable ids; inserting a joint later
/// splits the span it lands in and invalidates cached solutions.
pub struct BeamChainModel {
    length: f64,
    section: BeamSection,
    /// Joint position by id.
    xs: Vec<f64>,
    /// Joint ids sorted by position.
    order: Vec<JointId>,
    /// Slot in `order` by joint id.
    slots: Vec<usize>,
    /// Support positions, ascending.
    support_xs: Vec<f64>,
    loadings: HashMap<LoadCaseId, Loading>,
    solutions: HashMap<LoadCaseId, Solution>,
}

impl BeamChainModel {
    /// Create a chain over `[0, length]` with supports at the given
    /// positions. The end joints and one joint per support are created.
    pub fn new(length: f64, section: BeamSection, support_xs: &[f64]) -> AnalysisResult<Self> {
        if !(length > 0.0) {
            return Err(AnalysisError::InvalidGeometry(format!(
                "segment length {length} must be positive"
            )));
        }
        let mut supports: Vec<f64> = support_xs.to_vec();
        supports.sort_by(|a, b| a.total_cmp(b));
        supports.dedup_by(|a, b| (*a - *b).abs() < POSITION_TOL);
        if supports.len() < 2 {
            return Err(AnalysisError::Unstable(
                "a beam chain needs at least two distinct supports".into(),
            ));
        }
        if supports[0] < -POSITION_TOL || supports[supports.len() - 1] > length + POSITION_TOL {
            return Err(AnalysisError::InvalidGeometry(
                "support outside the segment".into(),
            ));
        }

        let mut model = Self {
            length,
            section,
            xs: Vec::new(),
            order: Vec::new(),
            slots: Vec::new(),
            support_xs: supports.clone(),
            loadings: HashMap::new(),
            solutions: HashMap::new(),
        };
        model.add_joint(0.0);
        model.add_joint(length);
        for x in supports {
            model.add_joint(x);
        }
        Ok(model)
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    fn resort(&mut self) {
        self.order = (0..self.xs.len()).collect();
        self.order.sort_by(|a, b| self.xs[*a].total_cmp(&self.xs[*b]));
        self.slots = vec![0; self.xs.len()];
        for (slot, id) in self.order.iter().enumerate() {
            self.slots[*id] = slot;
        }
    }

    fn loading(&self, case: LoadCaseId) -> &Loading {
        self.loadings
            .get(&case)
            .unwrap_or_else(|| panic!("load case {case} was never created"))
    }

    fn loading_mut(&mut self, case: LoadCaseId) -> &mut Loading {
        self.loadings
            .get_mut(&case)
            .unwrap_or_else(|| panic!("load case {case} was never created"))
    }

    /// Span index containing `x`, with `x` clamped to the chain.
    fn span_containing(&self, x: f64) -> (usize, f64) {
        let last = self.order.len() - 1;
        let mut span = 0;
        for slot in 0..last {
            let hi = self.xs[self.order[slot + 1]];
            span = slot;
            if x <= hi + POSITION_TOL {
                break;
            }
        }
        let lo = self.xs[self.order[span]];
        (span, (x - lo).max(0.0))
    }

    fn span_length(&self, span: usize) -> f64 {
        self.xs[self.order[span + 1]] - self.xs[self.order[span]]
    }

    fn ensure_solved(&mut self, case: LoadCaseId) -> AnalysisResult<()> {
        if self.solutions.contains_key(&case) {
            return Ok(());
        }
        let solution = self.solve(case)?;
        self.solutions.insert(case, solution);
        Ok(())
    }

    fn solve(&self, case: LoadCaseId) -> AnalysisResult<Solution> {
        let loading = self.loading(case);
        let n = self.order.len();
        let spans = n - 1;

        if loading.is_empty() {
            return Ok(Solution {
                displacements: vec![[0.0; 3]; n],
                member_forces: vec![Vec6::zeros(); spans],
                nodal_applied: vec![[0.0; 3]; n],
            });
        }

        debug!("Solving load case {case}: {n} joints, {spans} members");

        let ndof = 3 * n;
        let mut k = Mat::zeros(ndof, ndof);
        let mut p = DVector::zeros(ndof);
        let mut member_fers = vec![Vec6::zeros(); spans];
        let mut nodal_applied = vec![[0.0; 3]; n];

        // Element stiffness
        let mut member_ks = Vec::with_capacity(spans);
        for span in 0..spans {
            let l = self.span_length(span);
            let k6 = beam_local_stiffness(self.section.e, self.section.a, self.section.i, l);
            for row in 0..6 {
                let gr = 3 * span + row;
                for col in 0..6 {
                    k[(gr, 3 * span + col)] += k6[(row, col)];
                }
            }
            member_ks.push(k6);
        }

        // Point loads, including the strain-load equivalents
        let mut points = loading.points.clone();
        for strain in &loading.strains {
            let ea = self.section.e * self.section.a;
            let ei = self.section.e * self.section.i;
            points.push(PointLoad {
                x: strain.x1,
                fx: -ea * strain.e,
                fy: 0.0,
                mz: -ei * strain.r,
            });
            points.push(PointLoad {
                x: strain.x2,
                fx: ea * strain.e,
                fy: 0.0,
                mz: ei * strain.r,
            });
        }

        for load in &points {
            if let Some(slot) = self.slot_near(load.x) {
                let base = 3 * slot;
                p[base] += load.fx;
                p[base + 1] += load.fy;
                p[base + 2] += load.mz;
                nodal_applied[slot][0] += load.fx;
                nodal_applied[slot][1] += load.fy;
                nodal_applied[slot][2] += load.mz;
            } else {
                let (span, a) = self.span_containing(load.x);
                let l = self.span_length(span);
                let fer =
                    fer_point_force(load.fx, load.fy, a, l) + fer_point_moment(load.mz, a, l);
                member_fers[span] += fer;
                for dof in 0..6 {
                    p[3 * span + dof] -= fer[dof];
                }
            }
        }

        // Distributed loads, clipped span by span
        for load in &loading.linears {
            for span in 0..spans {
                let lo = self.xs[self.order[span]];
                let hi = self.xs[self.order[span + 1]];
                let x1 = load.x1.max(lo);
                let x2 = load.x2.min(hi);
                if x2 - x1 < POSITION_TOL {
                    continue;
                }
                let interp = |x: f64| {
                    load.w1 + (load.w2 - load.w1) * (x - load.x1) / (load.x2 - load.x1)
                };
                let l = hi - lo;
                let fer = fer_linear_load(interp(x1), interp(x2), x1 - lo, x2 - lo, l);
                member_fers[span] += fer;
                for dof in 0..6 {
                    p[3 * span + dof] -= fer[dof];
                }
            }
        }

        // Partition out restrained DOFs: uy at every support, ux at the
        // first support only.
        let mut restrained = vec![false; ndof];
        for (index, x) in self.support_xs.iter().enumerate() {
            let slot = self
                .slot_near(*x)
                .unwrap_or_else(|| panic!("no joint at support position {x}"));
            restrained[3 * slot + 1] = true;
            if index == 0 {
                restrained[3 * slot] = true;
            }
        }
        let free: Vec<usize> = (0..ndof).filter(|dof| !restrained[*dof]).collect();

        let nf = free.len();
        let mut kff = Mat::zeros(nf, nf);
        let mut pf = DVector::zeros(nf);
        for (i, &gi) in free.iter().enumerate() {
            pf[i] = p[gi];
            for (j, &gj) in free.iter().enumerate() {
                kff[(i, j)] = k[(gi, gj)];
            }
        }

        let df = solve_linear_system(&kff, &pf).ok_or(AnalysisError::SingularMatrix)?;

        let mut d = DVector::zeros(ndof);
        for (i, &gi) in free.iter().enumerate() {
            d[gi] = df[i];
        }

        let mut displacements = vec![[0.0; 3]; n];
        for slot in 0..n {
            displacements[slot] = [d[3 * slot], d[3 * slot + 1], d[3 * slot + 2]];
        }

        let mut member_forces = Vec::with_capacity(spans);
        for span in 0..spans {
            let mut d6 = Vec6::zeros();
            for dof in 0..6 {
                d6[dof] = d[3 * span + dof];
            }
            member_forces.push(member_ks[span] * d6 + member_fers[span]);
        }

        trace!("Load case {case} solved");

        Ok(Solution {
            displacements,
            member_forces,
            nodal_applied,
        })
    }

    fn slot_near(&self, x: f64) -> Option<usize> {
        self.order
            .iter()
            .position(|id| (self.xs[*id] - x).abs() < POSITION_TOL)
    }
}

impl FemModel for BeamChainModel {
    fn create_loading(&mut self, case: LoadCaseId) {
        let previous = self.loadings.insert(case, Loading::default());
        assert!(previous.is_none(), "load case {case} already exists");
    }

    fn clear_loading(&mut self, case: LoadCaseId) {
        *self.loading_mut(case) = Loading::default();
        self.solutions.remove(&case);
    }

    fn has_loading(&self, case: LoadCaseId) -> bool {
        self.loadings.contains_key(&case)
    }

    fn add_point_load(&mut self, case: LoadCaseId, x: f64, fx: f64, fy: f64, mz: f64) {
        self.loading_mut(case).points.push(PointLoad { x, fx, fy, mz });
        self.solutions.remove(&case);
    }

    fn add_linear_load(&mut self, case: LoadCaseId, x1: f64, x2: f64, w1: f64, w2: f64) {
        self.loading_mut(case).linears.push(LinearLoad { x1, x2, w1, w2 });
        self.solutions.remove(&case);
    }

    fn add_strain_load(&mut self, case: LoadCaseId, x1: f64, x2: f64, e: f64, r: f64) {
        self.loading_mut(case).strains.push(StrainLoad { x1, x2, e, r });
        self.solutions.remove(&case);
    }

    fn add_joint(&mut self, x: f64) -> JointId {
        if let Some(slot) = self.slot_near(x) {
            return self.order[slot];
        }
        assert!(
            (-POSITION_TOL..=self.length + POSITION_TOL).contains(&x),
            "joint position {x} outside the segment"
        );
        trace!("Adding joint at {x}");
        let id = self.xs.len();
        self.xs.push(x.clamp(0.0, self.length));
        self.resort();
        self.solutions.clear();
        id
    }

    fn joint_at(&self, x: f64) -> Option<JointId> {
        self.slot_near(x).map(|slot| self.order[slot])
    }

    fn joint_position(&self, joint: JointId) -> f64 {
        self.xs[joint]
    }

    fn support_joints(&self) -> Vec<JointId> {
        self.support_xs
            .iter()
            .map(|x| {
                self.slot_near(*x)
                    .map(|slot| self.order[slot])
                    .unwrap_or_else(|| panic!("no joint at support position {x}"))
            })
            .collect()
    }

    fn face_forces(&mut self, case: LoadCaseId, joint: JointId) -> AnalysisResult<FaceForces> {
        self.ensure_solved(case)?;
        let slot = self.slots[joint];
        let solution = &self.solutions[&case];
        let mut faces = FaceForces::ZERO;
        if slot > 0 {
            let f = solution.member_forces[slot - 1];
            faces.left = [f[3], f[4], f[5]];
        }
        if slot < solution.member_forces.len() {
            let f = solution.member_forces[slot];
            faces.right = [f[0], f[1], f[2]];
        }
        Ok(faces)
    }

    fn displacement(&mut self, case: LoadCaseId, joint: JointId) -> AnalysisResult<[f64; 3]> {
        self.ensure_solved(case)?;
        let slot = self.slots[joint];
        Ok(self.solutions[&case].displacements[slot])
    }

    fn reaction(&mut self, case: LoadCaseId, joint: JointId) -> AnalysisResult<[f64; 3]> {
        self.ensure_solved(case)?;
        let slot = self.slots[joint];
        let solution = &self.solutions[&case];
        let mut r = [0.0; 3];
        if slot > 0 {
            let f = solution.member_forces[slot - 1];
            for c in 0..3 {
                r[c] += f[3 + c];
            }
        }
        if slot < solution.member_forces.len() {
            let f = solution.member_forces[slot];
            for c in 0..3 {
                r[c] += f[c];
            }
        }
        for c in 0..3 {
            r[c] -= solution.nodal_applied[slot][c];
        }
        Ok(r)
    }
}
