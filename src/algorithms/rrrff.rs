//! Ridge regression with random Fourier features (RRRFF).
//!
//! ## Purpose
//!
//! Approximates a Gaussian-kernel regressor by projecting inputs onto random
//! cosine features `sqrt(2/D) * cos(ω·x + b)` and fitting the feature weights by
//! ridge regression.
//!
//! ## Design notes
//!
//! * **Spectral sampling**: For the kernel `exp(-γ‖x - y‖²)` the frequencies are
//!   drawn from `N(0, 2γ)` per dimension and the phases from `U[0, 2π)`.
//! * **Determinism**: Frequencies come from a `StdRng` seeded by the
//!   meta-parameters, so training the same data twice gives the same model.
//!
//! ## Key concepts
//!
//! * **Feature map**: Fixed after sampling; training only solves a `D × D` system.
//!
//! ## Reference
//!
//! Rahimi, A., & Recht, B. (2007). "Random Features for Large-Scale Kernel Machines."

use std::f64::consts::PI;

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::{FunctionApproximator, check_query};
use crate::engine::validator::Validator;
use crate::math::linalg;
use crate::primitives::buffer::PredictionBuffer;
use crate::primitives::errors::FaError;

/// Meta-parameters for [`Rrrff`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrrffParams {
    /// Input dimensionality.
    pub input_dim: usize,
    /// Number of random features `D`.
    pub n_features: usize,
    /// Kernel bandwidth `γ` of `exp(-γ‖x - y‖²)`.
    pub gamma: f64,
    /// Ridge term `λ`.
    pub regularization: f64,
    /// Seed for sampling frequencies and phases.
    pub seed: u64,
}

impl RrrffParams {
    /// Defaults: 20 features per input dimension, `γ = 5`, `λ = 0.01`.
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            n_features: 20 * input_dim.max(1),
            gamma: 5.0,
            regularization: 0.01,
            seed: 42,
        }
    }

    /// Set the number of random features.
    pub fn n_features(mut self, n: usize) -> Self {
        self.n_features = n;
        self
    }

    /// Set the kernel bandwidth.
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the ridge term.
    pub fn regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    /// Set the sampling seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<(), FaError> {
        Validator::validate_count(self.input_dim, "input_dim")?;
        Validator::validate_count(self.n_features, "n_features")?;
        Validator::validate_positive(self.gamma, "gamma")?;
        Validator::validate_non_negative(self.regularization, "regularization")
    }
}

/// Trained RRRFF model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrrffModel {
    /// features × input_dim
    frequencies: DMatrix<f64>,
    phases: Vec<f64>,
    /// features × outputs
    weights: DMatrix<f64>,
}

impl RrrffModel {
    fn features_into(&self, x: &[f64], out: &mut [f64]) {
        let scale = (2.0 / self.phases.len() as f64).sqrt();
        for (j, phi) in out.iter_mut().enumerate() {
            let mut arg = self.phases[j];
            for (d, &xd) in x.iter().enumerate() {
                arg += self.frequencies[(j, d)] * xd;
            }
            *phi = scale * arg.cos();
        }
    }

    /// Number of random features.
    pub fn n_features(&self) -> usize {
        self.phases.len()
    }
}

/// Ridge regression with random Fourier features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rrrff {
    params: RrrffParams,
    output_dim: usize,
    model: Option<RrrffModel>,
}

impl Rrrff {
    /// Create an untrained approximator.
    pub fn new(params: RrrffParams) -> Self {
        Self {
            params,
            output_dim: 1,
            model: None,
        }
    }

    /// Meta-parameters.
    pub fn params(&self) -> &RrrffParams {
        &self.params
    }

    /// Trained model, if any.
    pub fn model(&self) -> Option<&RrrffModel> {
        self.model.as_ref()
    }

    fn sample_features(&self) -> Result<(DMatrix<f64>, Vec<f64>), FaError> {
        let p = &self.params;
        let mut rng = StdRng::seed_from_u64(p.seed);
        let normal = Normal::new(0.0, (2.0 * p.gamma).sqrt()).map_err(|e| {
            FaError::InvalidMetaParameter {
                parameter: "gamma",
                reason: e.to_string(),
            }
        })?;
        let uniform =
            Uniform::new(0.0, 2.0 * PI).map_err(|e| FaError::InvalidMetaParameter {
                parameter: "phase",
                reason: e.to_string(),
            })?;

        let frequencies =
            DMatrix::from_fn(p.n_features, p.input_dim, |_, _| normal.sample(&mut rng));
        let phases = (0..p.n_features).map(|_| uniform.sample(&mut rng)).collect();
        Ok((frequencies, phases))
    }
}

impl FunctionApproximator for Rrrff {
    fn name(&self) -> &'static str {
        "RRRFF"
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
        Validator::validate_training_data(inputs, targets, self.params.input_dim, 2)?;

        let (frequencies, phases) = self.sample_features()?;
        let mut model = RrrffModel {
            frequencies,
            phases,
            weights: DMatrix::zeros(0, 0),
        };

        let n_features = model.n_features();
        let mut features = DMatrix::zeros(inputs.nrows(), n_features);
        let mut row = vec![0.0; inputs.ncols()];
        let mut phi = vec![0.0; n_features];
        for i in 0..inputs.nrows() {
            linalg::copy_row(inputs, i, &mut row);
            model.features_into(&row, &mut phi);
            for (j, &v) in phi.iter().enumerate() {
                features[(i, j)] = v;
            }
        }

        model.weights = linalg::ridge_regression(&features, targets, self.params.regularization)
            .ok_or(FaError::SingularSystem("RRRFF weights"))?;

        debug!(features = n_features, seed = self.params.seed, "trained RRRFF");
        self.output_dim = targets.ncols();
        self.model = Some(model);
        Ok(())
    }

    fn reserve_buffer(&self, buffer: &mut PredictionBuffer) {
        let n = self.model.as_ref().map_or(0, RrrffModel::n_features);
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

        let phi = buffer.features.zeroed(model.n_features());
        model.features_into(input, phi);
        for (o, out) in output.iter_mut().enumerate() {
            *out = linalg::dot_column(phi, &model.weights, o);
        }
        Ok(())
    }
}
