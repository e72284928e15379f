//! Synthetic target functions and sample grids.
//!
//! ## Purpose
//!
//! The benchmark trains every approximator on the same deterministic data: a
//! regular grid over the target function's domain and the function values at
//! the grid points.
//!
//! ## Key concepts
//!
//! * **Standard**: `3 e^{-x} sin(2x²)` on `[0, 2]` in 1D, and
//!   `2.5 x₁ exp(-‖x‖²)` on `[-2, 2]ⁿ` otherwise.
//! * **SumOfSines**: `Σ_d sin(2x_d) + 0.5 sin(3x_d)` on `[0, 1]ⁿ`.
//! * **Grid order**: The first dimension varies slowest (row-major over the
//!   per-dimension sample indices).

use core::fmt;
use core::str::FromStr;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::engine::validator::Validator;
use crate::primitives::errors::FaError;

/// Deterministic function the approximators are trained on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFunction {
    /// Damped chirp in 1D, Gaussian-modulated ramp in higher dimensions.
    #[default]
    Standard,
    /// Sum of two sines per input dimension on the unit cube.
    SumOfSines,
}

impl TargetFunction {
    /// Function value at `x`.
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        match self {
            TargetFunction::Standard if x.len() == 1 => {
                3.0 * (-x[0]).exp() * (2.0 * x[0] * x[0]).sin()
            }
            TargetFunction::Standard => {
                let sq: f64 = x.iter().map(|v| v * v).sum();
                2.5 * x[0] * (-sq).exp()
            }
            TargetFunction::SumOfSines => x
                .iter()
                .map(|&v| (2.0 * v).sin() + 0.5 * (3.0 * v).sin())
                .sum(),
        }
    }

    /// Lower and upper bound of the domain, shared by all dimensions.
    pub fn domain(&self, input_dim: usize) -> (f64, f64) {
        match self {
            TargetFunction::Standard if input_dim == 1 => (0.0, 2.0),
            TargetFunction::Standard => (-2.0, 2.0),
            TargetFunction::SumOfSines => (0.0, 1.0),
        }
    }

    /// Samples per dimension used by the benchmark: 30 in 1D, a 10×10 grid in 2D
    /// and `⌈100^(1/n)⌉` per dimension beyond that.
    pub fn default_samples_per_dim(input_dim: usize) -> Vec<usize> {
        let per_dim = match input_dim {
            1 => 30,
            2 => 10,
            n => 100f64.powf(1.0 / n as f64).ceil() as usize,
        };
        vec![per_dim; input_dim]
    }
}

impl fmt::Display for TargetFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetFunction::Standard => write!(f, "standard"),
            TargetFunction::SumOfSines => write!(f, "sum-of-sines"),
        }
    }
}

impl FromStr for TargetFunction {
    type Err = FaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(TargetFunction::Standard),
            "sum-of-sines" | "sumofsines" | "sines" => Ok(TargetFunction::SumOfSines),
            _ => Err(FaError::InvalidMetaParameter {
                parameter: "target",
                reason: format!("unknown target function `{s}`"),
            }),
        }
    }
}

/// Inputs on a regular grid and the target values at those inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    /// samples × input_dim
    pub inputs: DMatrix<f64>,
    /// samples × 1
    pub targets: DMatrix<f64>,
}

impl SampleGrid {
    /// Sample `target` on a grid with `samples_per_dim[d]` points along dimension `d`.
    ///
    /// A dimension with a single sample uses the midpoint of the domain.
    pub fn generate(target: TargetFunction, samples_per_dim: &[usize]) -> Result<Self, FaError> {
        if samples_per_dim.is_empty() {
            return Err(FaError::EmptyInput);
        }
        for &n in samples_per_dim {
            Validator::validate_count(n, "samples_per_dim")?;
        }

        let input_dim = samples_per_dim.len();
        let (lo, hi) = target.domain(input_dim);
        let total: usize = samples_per_dim.iter().product();

        let mut inputs = DMatrix::zeros(total, input_dim);
        let mut targets = DMatrix::zeros(total, 1);
        let mut x = vec![0.0; input_dim];
        for r in 0..total {
            let mut rest = r;
            for d in (0..input_dim).rev() {
                let n = samples_per_dim[d];
                let i = rest % n;
                rest /= n;
                x[d] = if n == 1 {
                    0.5 * (lo + hi)
                } else {
                    lo + (hi - lo) * i as f64 / (n - 1) as f64
                };
            }
            for (d, &v) in x.iter().enumerate() {
                inputs[(r, d)] = v;
            }
            targets[(r, 0)] = target.evaluate(&x);
        }

        Ok(Self { inputs, targets })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    /// True when the grid has no samples.
    pub fn is_empty(&self) -> bool {
        self.inputs.nrows() == 0
    }

    /// Input dimensionality.
    pub fn input_dim(&self) -> usize {
        self.inputs.ncols()
    }
}
