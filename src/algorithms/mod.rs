//! Layer 4: Algorithms
//!
//! # Purpose
//!
//! This layer contains the function approximators and the trait they share:
//! - `lwr`: locally weighted regression on a kernel grid
//! - `rbfn`: radial basis function network
//! - `rrrff`: ridge regression on random Fourier features
//! - `gpr`: Gaussian process regression
//! - `gmr`: Gaussian mixture regression
//! - `lwpr`: locally weighted projection regression
//! - `approximator`: name-based selection over all of the above
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Evaluation
//!   ↓
//! Layer 4: Algorithms ← You are here
//!   ↓
//! Layer 3: Engine
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

use nalgebra::DMatrix;

use crate::engine::validator::Validator;
use crate::math::linalg;
use crate::primitives::buffer::PredictionBuffer;
use crate::primitives::errors::FaError;

/// Selection by name and the tagged `Approximator` enum.
pub mod approximator;

/// Gaussian mixture regression.
pub mod gmr;

/// Gaussian process regression.
pub mod gpr;

/// Locally weighted projection regression.
pub mod lwpr;

/// Locally weighted regression.
pub mod lwr;

/// Radial basis function network.
pub mod rbfn;

/// Ridge regression with random Fourier features.
pub mod rrrff;

// ============================================================================
// FunctionApproximator Trait
// ============================================================================

/// A trainable mapping from input vectors to output vectors.
///
/// The lifecycle is: construct with meta-parameters, `train` once, then predict
/// any number of times. `predict_row` is the real-time path: given a buffer
/// from `prediction_buffer`, it performs no heap allocation.
pub trait FunctionApproximator {
    /// Short name of the approximator (e.g. `"LWR"`).
    fn name(&self) -> &'static str;

    /// Width of a single input.
    fn input_dim(&self) -> usize;

    /// Width of a single output. Before training this is one.
    fn expected_output_dim(&self) -> usize;

    /// Whether `train` has completed successfully.
    fn is_trained(&self) -> bool;

    /// Fit the model to `inputs` (samples × input_dim) and `targets`
    /// (samples × output_dim). Retraining replaces the previous model.
    fn train(&mut self, inputs: &DMatrix<f64>, targets: &DMatrix<f64>) -> Result<(), FaError>;

    /// Grow `buffer` so that `predict_row` on this model never reallocates.
    ///
    /// A buffer reserved for several models can be shared between them.
    fn reserve_buffer(&self, buffer: &mut PredictionBuffer);

    /// Scratch space sized so that `predict_row` never reallocates.
    fn prediction_buffer(&self) -> PredictionBuffer {
        let mut buffer = PredictionBuffer::new(0, 0, self.input_dim());
        self.reserve_buffer(&mut buffer);
        buffer
    }

    /// Predict a single sample into `output` without allocating.
    fn predict_row(
        &self,
        input: &[f64],
        output: &mut [f64],
        buffer: &mut PredictionBuffer,
    ) -> Result<(), FaError>;

    /// Predict a batch of samples (one output row per input row).
    fn predict(&self, inputs: &DMatrix<f64>) -> Result<DMatrix<f64>, FaError> {
        if !self.is_trained() {
            return Err(FaError::NotTrained {
                approximator: self.name(),
            });
        }
        if inputs.ncols() != self.input_dim() {
            return Err(FaError::DimensionMismatch {
                what: "input",
                expected: self.input_dim(),
                got: inputs.ncols(),
            });
        }

        let output_dim = self.expected_output_dim();
        let mut outputs = DMatrix::zeros(inputs.nrows(), output_dim);
        let mut buffer = self.prediction_buffer();
        let mut row = vec![0.0; inputs.ncols()];
        let mut out = vec![0.0; output_dim];
        for i in 0..inputs.nrows() {
            linalg::copy_row(inputs, i, &mut row);
            self.predict_row(&row, &mut out, &mut buffer)?;
            for (c, &v) in out.iter().enumerate() {
                outputs[(i, c)] = v;
            }
        }
        Ok(outputs)
    }
}

/// Shared preamble of `predict_row`: the model must exist and the widths must match.
#[inline]
pub(crate) fn check_query<'m, M>(
    model: Option<&'m M>,
    name: &'static str,
    input: &[f64],
    output: &[f64],
    input_dim: usize,
    output_dim: usize,
) -> Result<&'m M, FaError> {
    let model = model.ok_or(FaError::NotTrained { approximator: name })?;
    Validator::validate_query(input, output, input_dim, output_dim)?;
    Ok(model)
}
