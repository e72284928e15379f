//! Column statistics for prediction reports.
//!
//! ## Purpose
//!
//! Per-output-dimension summaries of target and prediction matrices: mean
//! absolute error and value range. Matrices are column-major, so each column is
//! a contiguous slice.

use nalgebra::DMatrix;
use num_traits::Float;

/// Mean of `|a[i] - b[i]|`. Returns zero for empty input.
pub fn mean_abs_diff<T: Float>(a: &[T], b: &[T]) -> T {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return T::zero();
    }
    let total = a
        .iter()
        .zip(b)
        .fold(T::zero(), |acc, (&x, &y)| acc + (x - y).abs());
    total / T::from(a.len()).unwrap_or_else(T::one)
}

/// `max - min` of a slice. Returns zero for empty input.
pub fn range<T: Float>(values: &[T]) -> T {
    let Some(&first) = values.first() else {
        return T::zero();
    };
    let (lo, hi) = values
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    hi - lo
}

/// Column `col` of a column-major matrix as a slice.
#[inline]
pub fn column(m: &DMatrix<f64>, col: usize) -> &[f64] {
    let n = m.nrows();
    &m.as_slice()[col * n..(col + 1) * n]
}

/// Column-wise mean absolute error between `targets` and `outputs`.
pub fn mean_absolute_error(targets: &DMatrix<f64>, outputs: &DMatrix<f64>) -> Vec<f64> {
    debug_assert_eq!(targets.shape(), outputs.shape());
    (0..targets.ncols())
        .map(|c| mean_abs_diff(column(targets, c), column(outputs, c)))
        .collect()
}

/// Column-wise `max - min`.
pub fn column_ranges(m: &DMatrix<f64>) -> Vec<f64> {
    (0..m.ncols()).map(|c| range(column(m, c))).collect()
}

/// Column-wise minima and maxima.
pub fn column_bounds(m: &DMatrix<f64>) -> (Vec<f64>, Vec<f64>) {
    (0..m.ncols())
        .map(|c| {
            let col = column(m, c);
            let lo = col.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = col.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (lo, hi)
        })
        .unzip()
}
