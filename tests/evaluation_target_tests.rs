//! Tests for target functions and sample grids.

use approx::assert_relative_eq;

use fnapprox::prelude::*;

#[test]
fn test_default_samples_per_dim() {
    assert_eq!(TargetFunction::default_samples_per_dim(1), vec![30]);
    assert_eq!(TargetFunction::default_samples_per_dim(2), vec![10, 10]);
    assert_eq!(TargetFunction::default_samples_per_dim(3), vec![5, 5, 5]);
}

#[test]
fn test_standard_1d_grid() {
    let grid = SampleGrid::generate(TargetFunction::Standard, &[30]).unwrap();
    assert_eq!(grid.len(), 30);
    assert_eq!(grid.input_dim(), 1);
    assert_eq!(grid.targets.shape(), (30, 1));

    assert_relative_eq!(grid.inputs[(0, 0)], 0.0);
    assert_relative_eq!(grid.inputs[(29, 0)], 2.0);

    let x = grid.inputs[(10, 0)];
    let expected = 3.0 * (-x).exp() * (2.0 * x * x).sin();
    assert_relative_eq!(grid.targets[(10, 0)], expected, epsilon = 1e-12);
}

#[test]
fn test_standard_2d_grid_order() {
    let grid = SampleGrid::generate(TargetFunction::Standard, &[10, 10]).unwrap();
    assert_eq!(grid.len(), 100);

    // First dimension varies slowest.
    assert_relative_eq!(grid.inputs[(0, 0)], -2.0);
    assert_relative_eq!(grid.inputs[(0, 1)], -2.0);
    assert_relative_eq!(grid.inputs[(1, 0)], -2.0);
    assert!(grid.inputs[(1, 1)] > -2.0);
    assert_relative_eq!(grid.inputs[(99, 0)], 2.0);
    assert_relative_eq!(grid.inputs[(99, 1)], 2.0);

    let (x1, x2) = (grid.inputs[(37, 0)], grid.inputs[(37, 1)]);
    let expected = 2.5 * x1 * (-(x1 * x1 + x2 * x2)).exp();
    assert_relative_eq!(grid.targets[(37, 0)], expected, epsilon = 1e-12);
}

#[test]
fn test_sum_of_sines() {
    let f = TargetFunction::SumOfSines;
    assert_relative_eq!(f.evaluate(&[0.0]), 0.0);
    assert_relative_eq!(
        f.evaluate(&[0.5, 1.0]),
        1.0_f64.sin() + 0.5 * 1.5_f64.sin() + 2.0_f64.sin() + 0.5 * 3.0_f64.sin(),
        epsilon = 1e-12
    );
    assert_eq!(f.domain(3), (0.0, 1.0));
}

#[test]
fn test_single_sample_dimension_uses_midpoint() {
    let grid = SampleGrid::generate(TargetFunction::SumOfSines, &[1, 3]).unwrap();
    assert_eq!(grid.len(), 3);
    for r in 0..3 {
        assert_relative_eq!(grid.inputs[(r, 0)], 0.5);
    }
}

#[test]
fn test_invalid_grids() {
    assert!(matches!(
        SampleGrid::generate(TargetFunction::Standard, &[]),
        Err(FaError::EmptyInput)
    ));
    assert!(matches!(
        SampleGrid::generate(TargetFunction::Standard, &[10, 0]),
        Err(FaError::InvalidMetaParameter { .. })
    ));
}

#[test]
fn test_target_names() {
    assert_eq!(
        "sum-of-sines".parse::<TargetFunction>().unwrap(),
        TargetFunction::SumOfSines
    );
    assert_eq!(
        "Standard".parse::<TargetFunction>().unwrap(),
        TargetFunction::Standard
    );
    assert!("cosine".parse::<TargetFunction>().is_err());
    assert_eq!(TargetFunction::SumOfSines.to_string(), "sum-of-sines");
}
