//! Linear algebra helpers for the approximators.
//!
//! ## Purpose
//!
//! This module wraps the nalgebra operations that training needs (regularized
//! solves, ridge regression, weighted least squares) and provides the
//! allocation-free helpers that prediction needs (row copies, dot products).
//!
//! ## Design notes
//!
//! * Uses QR decomposition (Householder reflections) first for numerical
//!   stability with ill-conditioned systems.
//! * Falls back to SVD for rank-deficient matrices.
//! * `dot` uses `wide::f64x2` lanes with a scalar tail.

use nalgebra::DMatrix;
use wide::f64x2;

/// Singular values below this (relative to machine epsilon) are treated as zero.
const SVD_EPS_FACTOR: f64 = 100.0;

// ============================================================================
// Solvers
// ============================================================================

/// Solve `(A + ridge * I) X = B`.
///
/// Tries QR first and falls back to an SVD least-squares solution when QR
/// reports a singular system.
pub fn solve_regularized(
    mut a: DMatrix<f64>,
    b: &DMatrix<f64>,
    ridge: f64,
) -> Option<DMatrix<f64>> {
    debug_assert!(a.is_square());
    if ridge != 0.0 {
        for i in 0..a.nrows() {
            a[(i, i)] += ridge;
        }
    }

    let qr = a.clone().qr();
    if let Some(solution) = qr.solve(b) {
        if solution.iter().all(|v| v.is_finite()) {
            return Some(solution);
        }
    }

    a.svd(true, true)
        .solve(b, f64::EPSILON * SVD_EPS_FACTOR)
        .ok()
        .filter(|s: &DMatrix<f64>| s.iter().all(|v| v.is_finite()))
}

/// Ridge regression: `(ΦᵀΦ + λI)⁻¹ ΦᵀY`.
///
/// `features` is samples × features, `targets` is samples × outputs; the result
/// is features × outputs.
pub fn ridge_regression(
    features: &DMatrix<f64>,
    targets: &DMatrix<f64>,
    ridge: f64,
) -> Option<DMatrix<f64>> {
    let gram = features.transpose() * features;
    let rhs = features.transpose() * targets;
    solve_regularized(gram, &rhs, ridge)
}

/// Weighted least squares: `(XᵀWX + λI)⁻¹ XᵀWY` with `W = diag(weights)`.
pub fn weighted_least_squares(
    design: &DMatrix<f64>,
    weights: &[f64],
    targets: &DMatrix<f64>,
    ridge: f64,
) -> Option<DMatrix<f64>> {
    debug_assert_eq!(design.nrows(), weights.len());
    let mut weighted = design.clone();
    for (i, mut row) in weighted.row_iter_mut().enumerate() {
        row *= weights[i];
    }
    let normal = design.transpose() * &weighted;
    let rhs = weighted.transpose() * targets;
    solve_regularized(normal, &rhs, ridge)
}

/// Append a column of ones to `inputs` (design matrix for an affine model).
pub fn with_bias_column(inputs: &DMatrix<f64>) -> DMatrix<f64> {
    let n_cols = inputs.ncols();
    inputs.clone().insert_column(n_cols, 1.0)
}

// ============================================================================
// Allocation-free Helpers
// ============================================================================

/// Copy row `row` of `m` into `out`.
#[inline]
pub fn copy_row(m: &DMatrix<f64>, row: usize, out: &mut [f64]) {
    debug_assert_eq!(out.len(), m.ncols());
    for (c, v) in out.iter_mut().enumerate() {
        *v = m[(row, c)];
    }
}

/// Dot product of two equally long slices.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = f64x2::splat(0.0);
    let mut chunks_a = a.chunks_exact(2);
    let mut chunks_b = b.chunks_exact(2);
    for (ca, cb) in (&mut chunks_a).zip(&mut chunks_b) {
        acc += f64x2::new([ca[0], ca[1]]) * f64x2::new([cb[0], cb[1]]);
    }
    let mut sum = acc.reduce_add();
    for (&x, &y) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        sum += x * y;
    }
    sum
}

/// Dot product of a slice with column `col` of `m`.
#[inline]
pub fn dot_column(a: &[f64], m: &DMatrix<f64>, col: usize) -> f64 {
    debug_assert_eq!(a.len(), m.nrows());
    let n = m.nrows();
    dot(a, &m.as_slice()[col * n..(col + 1) * n])
}
