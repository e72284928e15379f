//! Radial basis function network (RBFN).
//!
//! ## Purpose
//!
//! A linear combination of Gaussian kernels on a regular grid. The weights are
//! found by ridge regression on the (unnormalized) kernel activations.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::{FunctionApproximator, check_query};
use crate::engine::validator::Validator;
use crate::math::kernel::KernelGrid;
use crate::math::{linalg, stats};
use crate::primitives::buffer::PredictionBuffer;
use crate::primitives::errors::FaError;

/// Meta-parameters for [`Rbfn`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RbfnParams {
    /// Input dimensionality.
    pub input_dim: usize,
    /// Number of kernels along each input dimension.
    pub basis_per_dim: Vec<usize>,
    /// Height at which neighbouring kernels intersect, in (0, 1).
    pub intersection: f64,
    /// Ridge term of the weight regression.
    pub regularization: f64,
}

impl RbfnParams {
    /// Defaults: 10 kernels in 1D, 8 per dimension otherwise, intersection 0.7.
    pub fn new(input_dim: usize) -> Self {
        let per_dim = if input_dim == 1 { 10 } else { 8 };
        Self {
            input_dim,
            basis_per_dim: vec![per_dim; input_dim],
            intersection: 0.7,
            regularization: 1e-4,
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

    /// Set the ridge term.
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

/// Trained RBFN model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RbfnModel {
    kernels: KernelGrid,
    /// kernels × outputs
    weights: DMatrix<f64>,
}

impl RbfnModel {
    /// The kernel grid.
    pub fn kernels(&self) -> &KernelGrid {
        &self.kernels
    }

    /// Kernel weights (kernels × outputs).
    pub fn weights(&self) -> &DMatrix<f64> {
        &self.weights
    }
}

/// Radial basis function network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rbfn {
    params: RbfnParams,
    output_dim: usize,
    model: Option<RbfnModel>,
}

impl Rbfn {
    /// Create an untrained approximator.
    pub fn new(params: RbfnParams) -> Self {
        Self {
            params,
            output_dim: 1,
            model: None,
        }
    }

    /// Meta-parameters.
    pub fn params(&self) -> &RbfnParams {
        &self.params
    }

    /// Trained model, if any.
    pub fn model(&self) -> Option<&RbfnModel> {
        self.model.as_ref()
    }
}

impl FunctionApproximator for Rbfn {
    fn name(&self) -> &'static str {
        "RBFN"
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
        let activations = kernels.activation_matrix(inputs, false);
        let weights =
            linalg::ridge_regression(&activations, targets, self.params.regularization)
                .ok_or(FaError::SingularSystem("RBFN weights"))?;

        debug!(kernels = kernels.len(), "trained RBFN");
        self.output_dim = targets.ncols();
        self.model = Some(RbfnModel { kernels, weights });
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
        model.kernels.activations_into(input, acts, false);
        for (o, out) in output.iter_mut().enumerate() {
            *out = linalg::dot_column(acts, &model.weights, o);
        }
        Ok(())
    }
}
