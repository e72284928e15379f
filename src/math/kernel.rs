//! Gaussian kernels for basis-function approximators.
//!
//! ## Purpose
//!
//! This module provides the Gaussian kernel used by LWR, RBFN and LWPR, and the
//! `KernelGrid` that places kernels on a regular grid spanning the training data.
//!
//! ## Design notes
//!
//! * **Scaled distance**: A kernel evaluates `exp(-0.5 * u²)` where `u` is the
//!   distance from the center measured in kernel widths (per dimension).
//! * **Intersection**: Widths are chosen so that neighbouring kernels intersect at
//!   a given height, which makes the grid density the only tuning knob.
//! * **Normalization**: Activations can be normalized to sum to one, turning the
//!   grid into a partition of unity.
//!
//! ## Invariants
//!
//! * Kernels are non-negative and equal to one at their center.
//! * Normalized activations sum to one unless all raw activations underflow.
//!
//! ## Non-goals
//!
//! * This module does not fit any weights; it only computes activations.

use nalgebra::DMatrix;
use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::math::linalg;

// ============================================================================
// Scalar Kernels
// ============================================================================

/// Gaussian kernel of a squared scaled distance: `exp(-0.5 * sq_dist)`.
#[inline]
pub fn gaussian<T: Float>(sq_dist: T) -> T {
    let half = T::from(0.5).unwrap_or_else(T::one);
    (-half * sq_dist).exp()
}

/// Width of a Gaussian such that two kernels `spacing` apart intersect at
/// height `intersection`.
///
/// Solves `exp(-0.5 * (spacing / 2)² / w²) = intersection` for `w`.
#[inline]
pub fn width_for_intersection<T: Float>(spacing: T, intersection: T) -> T {
    let two = T::one() + T::one();
    let half_spacing = spacing / two;
    (-(half_spacing * half_spacing) / (two * intersection.ln())).sqrt()
}

/// Scale values in place so they sum to one.
///
/// Leaves the values untouched when the sum is not positive.
#[inline]
pub fn normalize_in_place<T: Float>(values: &mut [T]) {
    let sum = values.iter().fold(T::zero(), |acc, &v| acc + v);
    if sum > T::zero() {
        for v in values.iter_mut() {
            *v = *v / sum;
        }
    }
}

// ============================================================================
// Kernel Grid
// ============================================================================

/// Gaussian kernels placed on a regular grid.
///
/// Row `b` of `centers` and `widths` describes kernel `b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelGrid {
    centers: DMatrix<f64>,
    widths: DMatrix<f64>,
}

impl KernelGrid {
    /// Place `per_dim[d]` kernels along each dimension `d`, spanning `[mins[d], maxs[d]]`.
    ///
    /// Kernels are ordered with the first dimension varying slowest. A dimension
    /// with a single kernel gets a center at the midpoint and a width equal to
    /// the range of that dimension (or one when the range is zero).
    pub fn spanning(mins: &[f64], maxs: &[f64], per_dim: &[usize], intersection: f64) -> Self {
        let n_dims = per_dim.len();
        let n_kernels: usize = per_dim.iter().product();

        let mut axis_centers = Vec::with_capacity(n_dims);
        let mut axis_widths = Vec::with_capacity(n_dims);
        for d in 0..n_dims {
            let (lo, hi, n) = (mins[d], maxs[d], per_dim[d]);
            if n <= 1 {
                let range = hi - lo;
                axis_centers.push(vec![0.5 * (lo + hi)]);
                axis_widths.push(if range > 0.0 { range } else { 1.0 });
            } else {
                let spacing = (hi - lo) / (n - 1) as f64;
                axis_centers.push((0..n).map(|i| lo + spacing * i as f64).collect::<Vec<_>>());
                let width = width_for_intersection(spacing, intersection);
                axis_widths.push(if width > 0.0 { width } else { 1.0 });
            }
        }

        let mut centers = DMatrix::zeros(n_kernels, n_dims);
        let mut widths = DMatrix::zeros(n_kernels, n_dims);
        for b in 0..n_kernels {
            let mut rest = b;
            for d in (0..n_dims).rev() {
                let idx = rest % per_dim[d];
                rest /= per_dim[d];
                centers[(b, d)] = axis_centers[d][idx];
                widths[(b, d)] = axis_widths[d];
            }
        }

        Self { centers, widths }
    }

    /// Number of kernels.
    #[inline]
    pub fn len(&self) -> usize {
        self.centers.nrows()
    }

    /// Whether the grid holds no kernels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.centers.nrows() == 0
    }

    /// Input dimensionality of the kernels.
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.centers.ncols()
    }

    /// Kernel centers, one row per kernel.
    pub fn centers(&self) -> &DMatrix<f64> {
        &self.centers
    }

    /// Kernel widths, one row per kernel.
    pub fn widths(&self) -> &DMatrix<f64> {
        &self.widths
    }

    /// Write the activation of every kernel for input `x` into `out`.
    ///
    /// Does not allocate; `out.len()` must equal `self.len()`.
    #[inline]
    pub fn activations_into(&self, x: &[f64], out: &mut [f64], normalized: bool) {
        debug_assert_eq!(out.len(), self.len());
        for (b, act) in out.iter_mut().enumerate() {
            let mut sq = 0.0;
            for (d, &xd) in x.iter().enumerate() {
                let u = (xd - self.centers[(b, d)]) / self.widths[(b, d)];
                sq += u * u;
            }
            *act = gaussian(sq);
        }
        if normalized {
            normalize_in_place(out);
        }
    }

    /// Activation matrix for a batch of inputs (samples × kernels).
    pub fn activation_matrix(&self, inputs: &DMatrix<f64>, normalized: bool) -> DMatrix<f64> {
        let mut acts = DMatrix::zeros(inputs.nrows(), self.len());
        let mut row = vec![0.0; inputs.ncols()];
        let mut out = vec![0.0; self.len()];
        for i in 0..inputs.nrows() {
            linalg::copy_row(inputs, i, &mut row);
            self.activations_into(&row, &mut out, normalized);
            for (b, &a) in out.iter().enumerate() {
                acts[(i, b)] = a;
            }
        }
        acts
    }
}
