//! Element math for the planar beam chain
//!
//! Every member is a 2-node Euler-Bernoulli beam with 3 DOF per node
//! (axial, transverse, rotation), local axes aligned with global since the
//! chain is collinear.

use nalgebra::{DMatrix, DVector, SMatrix, SVector};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;

/// 6x6 matrix for beam member stiffness
pub type Mat6 = SMatrix<f64, 6, 6>;
/// 6-element vector for member end forces/displacements
pub type Vec6 = SVector<f64, 6>;

/// Gauss-Legendre abscissae and weights, 4 points on [-1, 1]. Exact through
/// degree 7, more than the quartic Hermite kernels need.
const GAUSS_POINTS: [(f64, f64); 4] = [
    (-0.861_136_311_594_052_6, 0.347_854_845_137_453_9),
    (-0.339_981_043_584_856_3, 0.652_145_154_862_546_1),
    (0.339_981_043_584_856_3, 0.652_145_154_862_546_1),
    (0.861_136_311_594_052_6, 0.347_854_845_137_453_9),
];

/// Compute the local stiffness matrix for a planar beam element
///
/// DOF order is [ux_i, uy_i, rz_i, ux_j, uy_j, rz_j].
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `a` - Cross-sectional area
/// * `i` - Moment of inertia about the bending axis
/// * `length` - Member length
pub fn beam_local_stiffness(e: f64, a: f64, i: f64, length: f64) -> Mat6 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea_l = e * a / l;
    let ei_l3 = e * i / l3;
    let ei_l2 = e * i / l2;
    let ei_l = e * i / l;

    #[rustfmt::skip]
    let data = [
        // Row 0: axial at i
        ea_l,   0.0,           0.0,          -ea_l,  0.0,           0.0,
        // Row 1: shear at i
        0.0,    12.0*ei_l3,    6.0*ei_l2,    0.0,    -12.0*ei_l3,   6.0*ei_l2,
        // Row 2: moment at i
        0.0,    6.0*ei_l2,     4.0*ei_l,     0.0,    -6.0*ei_l2,    2.0*ei_l,
        // Row 3: axial at j
        -ea_l,  0.0,           0.0,          ea_l,   0.0,           0.0,
        // Row 4: shear at j
        0.0,    -12.0*ei_l3,   -6.0*ei_l2,   0.0,    12.0*ei_l3,    -6.0*ei_l2,
        // Row 5: moment at j
        0.0,    6.0*ei_l2,     2.0*ei_l,     0.0,    -6.0*ei_l2,    4.0*ei_l,
    ];

    Mat6::from_row_slice(&data)
}

/// Compute fixed end reactions for a concentrated force
///
/// # Arguments
/// * `px` - Axial component
/// * `py` - Transverse component
/// * `a` - Distance from the i-node to the load
/// * `length` - Member length
pub fn fer_point_force(px: f64, py: f64, a: f64, length: f64) -> Vec6 {
    let l = length;
    let b = l - a;
    let l2 = l * l;
    let l3 = l2 * l;

    let mut fer = Vec6::zeros();

    fer[0] = -px * b / l;
    fer[3] = -px * a / l;

    fer[1] = -py * b * b * (3.0 * a + b) / l3;
    fer[2] = -py * a * b * b / l2;
    fer[4] = -py * a * a * (a + 3.0 * b) / l3;
    fer[5] = py * a * a * b / l2;

    fer
}

/// Compute fixed end reactions for a concentrated moment
///
/// # Arguments
/// * `m` - Moment magnitude, positive counterclockwise
/// * `a` - Distance from the i-node to the moment
/// * `length` - Member length
pub fn fer_point_moment(m: f64, a: f64, length: f64) -> Vec6 {
    let l = length;
    let xi = a / l;

    let mut fer = Vec6::zeros();

    fer[1] = 6.0 * m * xi * (1.0 - xi) / l;
    fer[2] = -m * (1.0 - xi) * (1.0 - 3.0 * xi);
    fer[4] = -6.0 * m * xi * (1.0 - xi) / l;
    fer[5] = -m * xi * (3.0 * xi - 2.0);

    fer
}

/// Compute fixed end reactions for a linearly varying transverse load over
/// part of the member
///
/// The load runs from `w1` at `x1` to `w2` at `x2`, both measured from the
/// i-node. Integrated against the Hermite shape functions by Gauss
/// quadrature, which is exact for this kernel.
pub fn fer_linear_load(w1: f64, w2: f64, x1: f64, x2: f64, length: f64) -> Vec6 {
    let mut fer = Vec6::zeros();
    let span = x2 - x1;
    if span.abs() < 1.0e-12 {
        return fer;
    }

    let half = span / 2.0;
    let mid = (x1 + x2) / 2.0;
    for (t, weight) in GAUSS_POINTS {
        let x = mid + half * t;
        let w = w1 + (w2 - w1) * (x - x1) / span;
        let n = hermite_shape(x, length);
        let scale = weight * half * w;
        fer[1] -= scale * n[0];
        fer[2] -= scale * n[1];
        fer[4] -= scale * n[2];
        fer[5] -= scale * n[3];
    }

    fer
}

/// Hermite shape functions [N1, N2, N3, N4] at a point along the member.
fn hermite_shape(x: f64, length: f64) -> [f64; 4] {
    let xi = x / length;
    let xi2 = xi * xi;
    let xi3 = xi2 * xi;
    [
        1.0 - 3.0 * xi2 + 2.0 * xi3,
        length * (xi - 2.0 * xi2 + xi3),
        3.0 * xi2 - 2.0 * xi3,
        length * (xi3 - xi2),
    ]
}

/// Solve a linear system using LU decomposition
pub fn solve_linear_system(a: &Mat, b: &Vec) -> Option<Vec> {
    a.clone().lu().solve(b)
}
