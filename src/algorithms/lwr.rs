//! Locally weighted regression (LWR).
//!
//! ## Purpose
//!
//! LWR covers the input domain with a grid of Gaussian kernels and fits one
//! affine model per kernel by weighted least squares, using the normalized
//! kernel activations as sample weights. A prediction blends the local models
//! with the same normalized activations.
//!
//! ## Design notes
//!
//! * **Partition of unity**: Activations are normalized, so the blend is a convex
//!   combination of local lines.
//! * **Independent fits**: Each kernel's fit is a small `(d+1) × (d+1)` system
//!   solved with QR (SVD fallback).
//! * **Real-time path**: Prediction touches only the activation slot of the
//!   caller's buffer.
//!
//! ## Invariants
//!
//! * One coefficient matrix of shape `(input_dim + 1) × output_dim` per kernel;
//!   the last row holds the offsets.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::{FunctionApproximator, check_query};
use crate::engine::validator::Validator;
use crate::math::kernel::KernelGrid;
use crate::math::{linalg, stats};
use crate::primitives::buffer::PredictionBuffer;
use crate::primitives::errors::FaError;

// ============================================================================
// Meta-parameters
// ============================================================================

/// Meta-parameters for [`Lwr`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LwrParams {
    /// Input dimensionality.
    pub input_dim: usize,
    /// Number of kernels along each input dimension.
    pub basis_per_dim: Vec<usize>,
    /// Height at which neighbouring kernels intersect, in (0, 1).
    pub intersection: f64,
    /// Ridge term added to each local normal matrix.
    pub regularization: f64,
}

impl LwrParams {
    /// Defaults: 9 kernels in 1D, 7 per dimension otherwise, intersection 0.5.
    pub fn new(input_dim: usize) -> Self {
        let per_dim = if input_dim == 1 { 9 } else { 7 };
        Self {
            input_dim,
            basis_per_dim: vec![per_dim; input_dim],
            intersection: 0.5,
            regularization: 1e-6,
        }
    }

    /// Set the number of kernels along each dimension.
    pub fn basis_per_dim(mut self, per_dim: Vec<usize>) -> Self {
        self.basis_per_dim = per_dim;
        self
    }

    /// Set the kernel intersection height.
    pub fn intersection(mut self, intersection: f64) -> Self {
        self.intersection = intersection;
        self
    }

    /// Set the ridge term of the local fits.
    pub fn regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    fn validate(&self) -> Result<(), FaError> {
        Validator::validate_count(self.input_dim, "input_dim")?;
        Validator::validate_per_dim(&self.basis_per_dim, self.input_dim, "basis_per_dim")?;
        Validator::validate_open_unit(self.intersection, "intersection")?;
        Validator::validate_non_negative(self.regularization, "regularization")
    }
}

// ============================================================================
// Model
// ============================================================================

/// Trained LWR model: kernels and one affine model per kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LwrModel {
    kernels: KernelGrid,
    lines: Vec<DMatrix<f64>>,
}

impl LwrModel {
    /// The kernel grid.
    pub fn kernels(&self) -> &KernelGrid {
        &self.kernels
    }

    /// Coefficients of kernel `b`: slopes in the first rows, offsets in the last.
    pub fn line(&self, b: usize) -> &DMatrix<f64> {
        &self.lines[b]
    }
}

/// Locally weighted regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lwr {
    params: LwrParams,
    output_dim: usize,
    model: Option<LwrModel>,
}

impl Lwr {
    /// Create an untrained approximator.
    pub fn new(params: LwrParams) -> Self {
        Self {
            params,
            output_dim: 1,
            model: None,
        }
    }

    /// Meta-parameters.
    pub fn params(&self) -> &LwrParams {
        &self.params
    }

    /// Trained model, if any.
    pub fn model(&self) -> Option<&LwrModel> {
        self.model.as_ref()
    }
}

impl FunctionApproximator for Lwr {
    fn name(&self) -> &'static str {
        "LWR"
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

        let (mins, maxs) = stats::column_bounds(inputs);
        let kernels = KernelGrid::spanning(
            &mins,
            &maxs,
            &self.params.basis_per_dim,
            self.params.intersection,
        );
        let activations = kernels.activation_matrix(inputs, true);
        let design = linalg::with_bias_column(inputs);

        let mut lines = Vec::with_capacity(kernels.len());
        for b in 0..kernels.len() {
            let weights = stats::column(&activations, b);
            let line = linalg::weighted_least_squares(
                &design,
                weights,
                targets,
                self.params.regularization,
            )
            .ok_or(FaError::SingularSystem("LWR local model"))?;
            lines.push(line);
        }

        debug!(
            kernels = kernels.len(),
            samples = inputs.nrows(),
            "trained LWR"
        );
        self.output_dim = targets.ncols();
        self.model = Some(LwrModel { kernels, lines });
        Ok(())
    }

    fn reserve_buffer(&self, buffer: &mut PredictionBuffer) {
        let n = self.model.as_ref().map_or(0, |m| m.kernels.len());
        buffer.ensure_capacity(n, 0, self.params.input_dim);
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

        let acts = buffer.activations.zeroed(model.kernels.len());
        model.kernels.activations_into(input, acts, true);

        let d = input.len();
        output.fill(0.0);
        for (b, &act) in acts.iter().enumerate() {
            let line = &model.lines[b];
            for (o, out) in output.iter_mut().enumerate() {
                let mut y = line[(d, o)];
                for (k, &xk) in input.iter().enumerate() {
                    y += line[(k, o)] * xk;
                }
                *out += act * y;
            }
        }
        Ok(())
    }
}
