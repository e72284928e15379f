//! Tests for the radial basis function network.

use nalgebra::DMatrix;

use fnapprox::prelude::*;

#[test]
fn test_rbfn_sum_of_sines_1d() {
    let grid = SampleGrid::generate(TargetFunction::SumOfSines, &[30]).unwrap();
    let mut rbfn = Rbfn::new(RbfnParams::new(1));
    rbfn.train(&grid.inputs, &grid.targets).unwrap();

    let outputs = rbfn.predict(&grid.inputs).unwrap();
    let mae = (&outputs - &grid.targets).abs().mean();
    assert!(mae < 0.1, "mae = {mae}");
}

#[test]
fn test_rbfn_weights_shape() {
    let grid = SampleGrid::generate(TargetFunction::Standard, &[10, 10]).unwrap();
    let mut rbfn = Rbfn::new(RbfnParams::new(2).basis_per_dim(vec![4, 5]));
    rbfn.train(&grid.inputs, &grid.targets).unwrap();

    let model = rbfn.model().unwrap();
    assert_eq!(model.kernels().len(), 20);
    assert_eq!(model.weights().shape(), (20, 1));
}

#[test]
fn test_rbfn_retraining_replaces_model() {
    let inputs = DMatrix::from_fn(20, 1, |r, _| r as f64 / 19.0);
    let ones = DMatrix::from_element(20, 1, 1.0);
    let twos = DMatrix::from_element(20, 2, 2.0);

    let mut rbfn = Rbfn::new(RbfnParams::new(1));
    rbfn.train(&inputs, &ones).unwrap();
    assert_eq!(rbfn.expected_output_dim(), 1);

    rbfn.train(&inputs, &twos).unwrap();
    assert_eq!(rbfn.expected_output_dim(), 2);
    assert_eq!(rbfn.predict(&inputs).unwrap().shape(), (20, 2));
}

#[test]
fn test_rbfn_rejects_negative_regularization() {
    let grid = SampleGrid::generate(TargetFunction::Standard, &[30]).unwrap();
    let mut rbfn = Rbfn::new(RbfnParams::new(1).regularization(-1.0));
    assert!(matches!(
        rbfn.train(&grid.inputs, &grid.targets),
        Err(FaError::InvalidMetaParameter {
            parameter: "regularization",
            ..
        })
    ));
}
