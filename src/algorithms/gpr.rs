//! Gaussian process regression (GPR).
//!
//! ## Purpose
//!
//! Posterior mean of a Gaussian process with squared-exponential covariance
//! `k(x, x') = σ² exp(-0.5 ‖(x - x') / ℓ‖²)` and a constant prior mean equal to
//! the target mean.
//!
//! ## Design notes
//!
//! * **Training** solves `(K + σₙ² I) α = Y - ȳ` once.
//! * **Prediction** is `ȳ + k(x)ᵀ α`; the covariance vector lives in the
//!   caller's buffer, one entry per training sample.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::{FunctionApproximator, check_query};
use crate::engine::validator::Validator;
use crate::math::kernel::gaussian;
use crate::math::{linalg, stats};
use crate::primitives::buffer::PredictionBuffer;
use crate::primitives::errors::FaError;

/// Meta-parameters for [`Gpr`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GprParams {
    /// Input dimensionality.
    pub input_dim: usize,
    /// Signal variance `σ²` (covariance at zero distance).
    pub max_covariance: f64,
    /// Length scale `ℓ`, shared by all dimensions.
    pub length: f64,
    /// Observation noise variance `σₙ²` added to the diagonal.
    pub noise: f64,
}

impl GprParams {
    /// Defaults: `σ² = 1`, `ℓ = 0.1` in 1D and `0.5` otherwise, `σₙ² = 1e-6`.
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            max_covariance: 1.0,
            length: if input_dim == 1 { 0.1 } else { 0.5 },
            noise: 1e-6,
        }
    }

    /// Set the signal variance.
    pub fn max_covariance(mut self, max_covariance: f64) -> Self {
        self.max_covariance = max_covariance;
        self
    }

    /// Set the length scale.
    pub fn length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    /// Set the noise variance.
    pub fn noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    fn validate(&self) -> Result<(), FaError> {
        Validator::validate_count(self.input_dim, "input_dim")?;
        Validator::validate_positive(self.max_covariance, "max_covariance")?;
        Validator::validate_positive(self.length, "length")?;
        Validator::validate_non_negative(self.noise, "noise")
    }
}

/// Trained GPR model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GprModel {
    /// samples × input_dim
    inputs: DMatrix<f64>,
    /// samples × outputs
    alpha: DMatrix<f64>,
    mean: Vec<f64>,
    max_covariance: f64,
    length: f64,
}

impl GprModel {
    #[inline]
    fn covariance(&self, x: &[f64], i: usize) -> f64 {
        let mut sq = 0.0;
        for (d, &xd) in x.iter().enumerate() {
            let u = (xd - self.inputs[(i, d)]) / self.length;
            sq += u * u;
        }
        self.max_covariance * gaussian(sq)
    }

    /// Number of stored training samples.
    pub fn n_samples(&self) -> usize {
        self.inputs.nrows()
    }
}

/// Gaussian process regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gpr {
    params: GprParams,
    output_dim: usize,
    model: Option<GprModel>,
}

impl Gpr {
    /// Create an untrained approximator.
    pub fn new(params: GprParams) -> Self {
        Self {
            params,
            output_dim: 1,
            model: None,
        }
    }

    /// Meta-parameters.
    pub fn params(&self) -> &GprParams {
        &self.params
    }

    /// Trained model, if any.
    pub fn model(&self) -> Option<&GprModel> {
        self.model.as_ref()
    }
}

impl FunctionApproximator for Gpr {
    fn name(&self) -> &'static str {
        "GPR"
    }

    fn input_dim(&self) -> usize {
        self.params.input_dim
    }

    fn expected_output_dim(&self) -> usize {
        self.output_dim
    }

    fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    fn train(&mut self, inputs: &DMatrix<f64>, targets: &DMatrix<f64>) -> Result<(), FaError> {
        self.params.validate()?;
        Validator::validate_training_data(inputs, targets, self.params.input_dim, 1)?;

        let mean: Vec<f64> = (0..targets.ncols())
            .map(|c| {
                let col = stats::column(targets, c);
                col.iter().sum::<f64>() / col.len() as f64
            })
            .collect();
        let centered = DMatrix::from_fn(targets.nrows(), targets.ncols(), |r, c| {
            targets[(r, c)] - mean[c]
        });

        let mut model = GprModel {
            inputs: inputs.clone(),
            alpha: DMatrix::zeros(0, 0),
            mean,
            max_covariance: self.params.max_covariance,
            length: self.params.length,
        };

        let n = inputs.nrows();
        let mut row = vec![0.0; inputs.ncols()];
        let mut gram = DMatrix::zeros(n, n);
        for i in 0..n {
            linalg::copy_row(inputs, i, &mut row);
            for j in 0..n {
                gram[(i, j)] = model.covariance(&row, j);
            }
        }

        model.alpha = linalg::solve_regularized(gram, &centered, self.params.noise)
            .ok_or(FaError::SingularSystem("GPR covariance"))?;

        debug!(samples = n, length = self.params.length, "trained GPR");
        self.output_dim = targets.ncols();
        self.model = Some(model);
        Ok(())
    }

    fn reserve_buffer(&self, buffer: &mut PredictionBuffer) {
        let n = self.model.as_ref().map_or(0, GprModel::n_samples);
        buffer.ensure_capacity(0, n, self.params.input_dim);
    }

    fn predict_row(
        &self,
        input: &[f64],
        output: &mut [f64],
        buffer: &mut PredictionBuffer,
    ) -> Result<(), FaError> {
        let model = check_query(
            self.model.as_ref(),
            self.name(),
            input,
            output,
            self.params.input_dim,
            self.output_dim,
        )?;

        let k = buffer.features.zeroed(model.n_samples());
        for (i, ki) in k.iter_mut().enumerate() {
            *ki = model.covariance(input, i);
        }
        for (o, out) in output.iter_mut().enumerate() {
            *out = model.mean[o] + linalg::dot_column(k, &model.alpha, o);
        }
        Ok(())
    }
}
