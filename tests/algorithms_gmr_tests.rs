//! Tests for Gaussian mixture regression.

use nalgebra::DMatrix;

use fnapprox::prelude::*;

#[test]
fn test_gmr_sum_of_sines_1d() {
    let grid = SampleGrid::generate(TargetFunction::SumOfSines, &[30]).unwrap();
    let mut gmr = Gmr::new(GmrParams::new(1));
    gmr.train(&grid.inputs, &grid.targets).unwrap();

    let outputs = gmr.predict(&grid.inputs).unwrap();
    let mae = (&outputs - &grid.targets).abs().mean();
    assert!(mae < 0.25, "mae = {mae}");
}

#[test]
fn test_gmr_model_summary() {
    let grid = SampleGrid::generate(TargetFunction::Standard, &[10, 10]).unwrap();
    let mut gmr = Gmr::new(GmrParams::new(2).n_gaussians(4).max_iterations(30));
    gmr.train(&grid.inputs, &grid.targets).unwrap();

    let model = gmr.model().unwrap();
    assert_eq!(model.components().len(), 4);
    assert!(model.iterations() >= 1 && model.iterations() <= 30);
    assert!(model.log_likelihood().is_finite());
    for comp in model.components() {
        assert_eq!(comp.mean_input().len(), 2);
        assert_eq!(comp.mean_output().len(), 1);
    }
}

#[test]
fn test_gmr_fewer_samples_than_components() {
    let inputs = DMatrix::from_column_slice(5, 1, &[0.0, 0.25, 0.5, 0.75, 1.0]);
    let targets = inputs.map(|x| x * x);
    let mut gmr = Gmr::new(GmrParams::new(1).n_gaussians(10));
    gmr.train(&inputs, &targets).unwrap();

    assert!(gmr.model().unwrap().components().len() <= 5);
    let outputs = gmr.predict(&inputs).unwrap();
    assert!(outputs.iter().all(|v| v.is_finite()));
}

#[test]
fn test_gmr_deterministic_for_seed() {
    let grid = SampleGrid::generate(TargetFunction::SumOfSines, &[30]).unwrap();
    let mut a = Gmr::new(GmrParams::new(1).seed(3));
    let mut b = Gmr::new(GmrParams::new(1).seed(3));
    a.train(&grid.inputs, &grid.targets).unwrap();
    b.train(&grid.inputs, &grid.targets).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_gmr_invalid_parameters() {
    let inputs = DMatrix::from_column_slice(4, 1, &[0.0, 1.0, 2.0, 3.0]);
    let targets = inputs.clone();

    let mut gmr = Gmr::new(GmrParams::new(1).n_gaussians(0));
    assert!(gmr.train(&inputs, &targets).is_err());

    let mut gmr = Gmr::new(GmrParams::new(1).tolerance(-1.0));
    assert!(gmr.train(&inputs, &targets).is_err());
}
