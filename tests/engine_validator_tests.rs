#![cfg(feature = "dev")]
//! Tests for training data, query and meta-parameter validation.

use nalgebra::DMatrix;

use fnapprox::internals::engine::validator::Validator;
use fnapprox::internals::primitives::errors::FaError;

fn column(values: &[f64]) -> DMatrix<f64> {
    DMatrix::from_column_slice(values.len(), 1, values)
}

// ============================================================================
// Training Data
// ============================================================================

#[test]
fn test_valid_training_data() {
    let x = column(&[0.0, 0.5, 1.0]);
    let y = column(&[1.0, 2.0, 3.0]);
    assert!(Validator::validate_training_data(&x, &y, 1, 2).is_ok());
}

#[test]
fn test_empty_training_data() {
    let x = DMatrix::<f64>::zeros(0, 1);
    let y = DMatrix::<f64>::zeros(0, 1);
    let err = Validator::validate_training_data(&x, &y, 1, 1).unwrap_err();
    assert!(matches!(err, FaError::EmptyInput));
}

#[test]
fn test_mismatched_rows() {
    let x = column(&[0.0, 0.5, 1.0]);
    let y = column(&[1.0, 2.0]);
    let err = Validator::validate_training_data(&x, &y, 1, 1).unwrap_err();
    assert!(matches!(
        err,
        FaError::MismatchedInputs {
            inputs: 3,
            targets: 2
        }
    ));
}

#[test]
fn test_wrong_input_width() {
    let x = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 2.0, 3.0]);
    let y = column(&[1.0, 2.0]);
    let err = Validator::validate_training_data(&x, &y, 1, 1).unwrap_err();
    assert!(matches!(
        err,
        FaError::DimensionMismatch {
            what: "input",
            expected: 1,
            got: 2
        }
    ));
}

#[test]
fn test_too_few_points() {
    let x = column(&[0.0]);
    let y = column(&[1.0]);
    let err = Validator::validate_training_data(&x, &y, 1, 2).unwrap_err();
    assert!(matches!(err, FaError::TooFewPoints { got: 1, min: 2 }));
}

#[test]
fn test_non_finite_values() {
    let x = column(&[0.0, f64::NAN]);
    let y = column(&[1.0, 2.0]);
    let err = Validator::validate_training_data(&x, &y, 1, 1).unwrap_err();
    assert!(matches!(err, FaError::InvalidNumericValue(_)));

    let x = column(&[0.0, 1.0]);
    let y = column(&[1.0, f64::INFINITY]);
    let err = Validator::validate_training_data(&x, &y, 1, 1).unwrap_err();
    assert!(matches!(err, FaError::InvalidNumericValue(ref msg) if msg.starts_with("targets")));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_query_widths() {
    assert!(Validator::validate_query(&[0.0, 1.0], &[0.0], 2, 1).is_ok());

    let err = Validator::validate_query(&[0.0], &[0.0], 2, 1).unwrap_err();
    assert!(matches!(err, FaError::DimensionMismatch { what: "input", .. }));

    let err = Validator::validate_query(&[0.0, 1.0], &[0.0, 0.0], 2, 1).unwrap_err();
    assert!(matches!(err, FaError::DimensionMismatch { what: "output", .. }));
}

// ============================================================================
// Meta-parameters
// ============================================================================

#[test]
fn test_scalar_parameter_bounds() {
    assert!(Validator::validate_positive(0.1, "length").is_ok());
    assert!(Validator::validate_positive(0.0, "length").is_err());
    assert!(Validator::validate_positive(f64::INFINITY, "length").is_err());

    assert!(Validator::validate_non_negative(0.0, "regularization").is_ok());
    assert!(Validator::validate_non_negative(-1e-9, "regularization").is_err());

    assert!(Validator::validate_open_unit(0.5, "intersection").is_ok());
    assert!(Validator::validate_open_unit(1.0, "intersection").is_err());
    assert!(Validator::validate_open_unit(0.0, "intersection").is_err());

    assert!(Validator::validate_unit(1.0, "w_prune").is_ok());
    assert!(Validator::validate_unit(1.5, "w_prune").is_err());
}

#[test]
fn test_parameter_error_names_parameter() {
    let err = Validator::validate_positive(-2.0, "gamma").unwrap_err();
    assert_eq!(
        format!("{}", err),
        "Invalid meta-parameter `gamma`: -2 (must be > 0 and finite)"
    );
}

#[test]
fn test_counts_and_per_dim() {
    assert!(Validator::validate_count(1, "epochs").is_ok());
    assert!(Validator::validate_count(0, "epochs").is_err());

    assert!(Validator::validate_per_dim(&[3, 4], 2, "basis_per_dim").is_ok());
    assert!(Validator::validate_per_dim(&[3], 2, "basis_per_dim").is_err());
    assert!(Validator::validate_per_dim(&[3, 0], 2, "basis_per_dim").is_err());
}
