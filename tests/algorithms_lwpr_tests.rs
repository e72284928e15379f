//! Tests for locally weighted projection regression.
//!
//! ## Test Organization
//!
//! 1. **Accuracy** - Smooth 1D target
//! 2. **Receptive fields** - Creation, locality, metric adaptation
//! 3. **Errors** - Meta-parameter validation

use approx::assert_relative_eq;
use nalgebra::DMatrix;

use fnapprox::prelude::*;

fn sum_of_sines_1d() -> SampleGrid {
    SampleGrid::generate(TargetFunction::SumOfSines, &[30]).unwrap()
}

// ============================================================================
// Accuracy
// ============================================================================

#[test]
fn test_lwpr_sum_of_sines_1d() {
    let grid = sum_of_sines_1d();
    let mut lwpr = Lwpr::new(LwprParams::new(1));
    lwpr.train(&grid.inputs, &grid.targets).unwrap();

    let outputs = lwpr.predict(&grid.inputs).unwrap();
    let mae = (&outputs - &grid.targets).abs().mean();
    assert!(mae < 0.15, "mae = {mae}");
}

#[test]
fn test_lwpr_standard_2d_runs() {
    let grid = SampleGrid::generate(TargetFunction::Standard, &[10, 10]).unwrap();
    let mut lwpr = Lwpr::new(LwprParams::new(2).epochs(10));
    lwpr.train(&grid.inputs, &grid.targets).unwrap();

    let outputs = lwpr.predict(&grid.inputs).unwrap();
    assert_eq!(outputs.shape(), (100, 1));
    assert!(outputs.iter().all(|v| v.is_finite()));
}

// ============================================================================
// Receptive Fields
// ============================================================================

#[test]
fn test_lwpr_creates_several_fields() {
    let grid = sum_of_sines_1d();
    let mut lwpr = Lwpr::new(LwprParams::new(1));
    lwpr.train(&grid.inputs, &grid.targets).unwrap();

    let model = lwpr.model().unwrap();
    assert!(model.max_fields() > 1);
    for rf in model.fields(0) {
        assert_eq!(rf.center().len(), 1);
        assert_eq!(rf.n_projections(), 1);
        assert!(rf.metric()[(0, 0)] > 0.0);
    }
}

#[test]
fn test_lwpr_predicts_zero_outside_all_fields() {
    let grid = sum_of_sines_1d();
    let mut lwpr = Lwpr::new(LwprParams::new(1));
    lwpr.train(&grid.inputs, &grid.targets).unwrap();

    let mut buffer = lwpr.prediction_buffer();
    let mut y = [1.0];
    lwpr.predict_row(&[100.0], &mut y, &mut buffer).unwrap();
    assert_relative_eq!(y[0], 0.0);
}

#[test]
fn test_lwpr_fixed_metric() {
    let grid = sum_of_sines_1d();
    let params = LwprParams::new(1).update_d(false).init_d(100.0);
    let mut lwpr = Lwpr::new(params);
    lwpr.train(&grid.inputs, &grid.targets).unwrap();

    for rf in lwpr.model().unwrap().fields(0) {
        assert_relative_eq!(rf.metric()[(0, 0)], 100.0, epsilon = 1e-9);
    }
}

#[test]
fn test_lwpr_deterministic_for_seed() {
    let grid = sum_of_sines_1d();
    let mut a = Lwpr::new(LwprParams::new(1).epochs(5).seed(11));
    let mut b = Lwpr::new(LwprParams::new(1).epochs(5).seed(11));
    a.train(&grid.inputs, &grid.targets).unwrap();
    b.train(&grid.inputs, &grid.targets).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_lwpr_separate_fields_per_output() {
    let inputs = DMatrix::from_fn(20, 1, |r, _| r as f64 / 19.0);
    let targets = DMatrix::from_fn(20, 2, |r, c| if c == 0 { r as f64 } else { -1.0 });
    let mut lwpr = Lwpr::new(LwprParams::new(1).epochs(5));
    lwpr.train(&inputs, &targets).unwrap();

    assert_eq!(lwpr.expected_output_dim(), 2);
    let model = lwpr.model().unwrap();
    assert!(!model.fields(0).is_empty());
    assert!(!model.fields(1).is_empty());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_lwpr_invalid_parameters() {
    let grid = sum_of_sines_1d();

    let mut lwpr = Lwpr::new(LwprParams::new(1).w_gen(1.0));
    assert!(matches!(
        lwpr.train(&grid.inputs, &grid.targets),
        Err(FaError::InvalidMetaParameter {
            parameter: "w_gen",
            ..
        })
    ));

    let mut lwpr = Lwpr::new(LwprParams::new(1).epochs(0));
    assert!(lwpr.train(&grid.inputs, &grid.targets).is_err());

    let mut lwpr = Lwpr::new(LwprParams::new(1).init_d(0.0));
    assert!(lwpr.train(&grid.inputs, &grid.targets).is_err());
}
