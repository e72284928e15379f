//! Input validation for training data, queries and meta-parameters.
//!
//! ## Purpose
//!
//! This module provides the validation functions that every approximator runs at
//! the start of `train`, plus the cheap shape checks performed by `predict_row`.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Efficiency**: Checks are ordered from cheap to expensive.
//! * **Generics**: Scalar checks are generic over `Float` types.
//!
//! ## Key concepts
//!
//! * **Shape checks**: Row counts must match, widths must match the model.
//! * **Finite Checks**: Training data must not contain NaN/Inf.
//! * **Parameter Bounds**: Widths, regularization and counts must be admissible.
//!
//! ## Invariants
//!
//! * All validated inputs satisfy their respective mathematical constraints.
//! * Validation logic is deterministic and side-effect free.
//!
//! ## Non-goals
//!
//! * This module does not transform or filter input data.
//! * This module does not provide automatic correction of invalid inputs.

use nalgebra::DMatrix;
use num_traits::Float;

use crate::primitives::errors::FaError;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for training data and meta-parameters.
///
/// Provides static methods that return `Result<(), FaError>` and fail fast upon
/// identifying the first violation.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Data Validation
    // ========================================================================

    /// Validate a training set against the approximator's input dimensionality.
    pub fn validate_training_data(
        inputs: &DMatrix<f64>,
        targets: &DMatrix<f64>,
        input_dim: usize,
        min_points: usize,
    ) -> Result<(), FaError> {
        // Check 1: Non-empty
        if inputs.is_empty() || targets.is_empty() {
            return Err(FaError::EmptyInput);
        }

        // Check 2: One target row per input row
        if inputs.nrows() != targets.nrows() {
            return Err(FaError::MismatchedInputs {
                inputs: inputs.nrows(),
                targets: targets.nrows(),
            });
        }

        // Check 3: Input width
        if inputs.ncols() != input_dim {
            return Err(FaError::DimensionMismatch {
                what: "input",
                expected: input_dim,
                got: inputs.ncols(),
            });
        }

        // Check 4: Enough samples
        if inputs.nrows() < min_points {
            return Err(FaError::TooFewPoints {
                got: inputs.nrows(),
                min: min_points,
            });
        }

        // Check 5: All values finite
        Self::validate_finite(inputs, "inputs")?;
        Self::validate_finite(targets, "targets")
    }

    /// Validate that every entry of a matrix is finite.
    pub fn validate_finite(m: &DMatrix<f64>, name: &str) -> Result<(), FaError> {
        for r in 0..m.nrows() {
            for c in 0..m.ncols() {
                let val = m[(r, c)];
                if !val.is_finite() {
                    return Err(FaError::InvalidNumericValue(format!(
                        "{}[({}, {})]={}",
                        name, r, c, val
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validate the width of a single query and its output slot.
    #[inline]
    pub fn validate_query(
        input: &[f64],
        output: &[f64],
        input_dim: usize,
        output_dim: usize,
    ) -> Result<(), FaError> {
        if input.len() != input_dim {
            return Err(FaError::DimensionMismatch {
                what: "input",
                expected: input_dim,
                got: input.len(),
            });
        }
        if output.len() != output_dim {
            return Err(FaError::DimensionMismatch {
                what: "output",
                expected: output_dim,
                got: output.len(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // Parameter Validation
    // ========================================================================

    /// Validate a strictly positive, finite parameter (widths, covariances).
    pub fn validate_positive<T: Float>(value: T, parameter: &'static str) -> Result<(), FaError> {
        if !value.is_finite() || value <= T::zero() {
            return Err(FaError::InvalidMetaParameter {
                parameter,
                reason: format!(
                    "{} (must be > 0 and finite)",
                    value.to_f64().unwrap_or(f64::NAN)
                ),
            });
        }
        Ok(())
    }

    /// Validate a non-negative, finite parameter (regularization, penalties).
    pub fn validate_non_negative<T: Float>(
        value: T,
        parameter: &'static str,
    ) -> Result<(), FaError> {
        if !value.is_finite() || value < T::zero() {
            return Err(FaError::InvalidMetaParameter {
                parameter,
                reason: format!(
                    "{} (must be >= 0 and finite)",
                    value.to_f64().unwrap_or(f64::NAN)
                ),
            });
        }
        Ok(())
    }

    /// Validate a parameter in the open interval (0, 1).
    pub fn validate_open_unit<T: Float>(value: T, parameter: &'static str) -> Result<(), FaError> {
        if !value.is_finite() || value <= T::zero() || value >= T::one() {
            return Err(FaError::InvalidMetaParameter {
                parameter,
                reason: format!(
                    "{} (must be > 0 and < 1)",
                    value.to_f64().unwrap_or(f64::NAN)
                ),
            });
        }
        Ok(())
    }

    /// Validate a parameter in the half-open interval (0, 1].
    pub fn validate_unit<T: Float>(value: T, parameter: &'static str) -> Result<(), FaError> {
        if !value.is_finite() || value <= T::zero() || value > T::one() {
            return Err(FaError::InvalidMetaParameter {
                parameter,
                reason: format!(
                    "{} (must be > 0 and <= 1)",
                    value.to_f64().unwrap_or(f64::NAN)
                ),
            });
        }
        Ok(())
    }

    /// Validate a count that must be at least one.
    pub fn validate_count(count: usize, parameter: &'static str) -> Result<(), FaError> {
        if count == 0 {
            return Err(FaError::InvalidMetaParameter {
                parameter,
                reason: "0 (must be at least 1)".to_string(),
            });
        }
        Ok(())
    }

    /// Validate per-dimension basis counts against the input dimensionality.
    pub fn validate_per_dim(
        per_dim: &[usize],
        input_dim: usize,
        parameter: &'static str,
    ) -> Result<(), FaError> {
        if per_dim.len() != input_dim {
            return Err(FaError::InvalidMetaParameter {
                parameter,
                reason: format!(
                    "{} entries for {} input dimension(s)",
                    per_dim.len(),
                    input_dim
                ),
            });
        }
        for &n in per_dim {
            Self::validate_count(n, parameter)?;
        }
        Ok(())
    }
}
