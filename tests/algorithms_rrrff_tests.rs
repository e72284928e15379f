//! Tests for ridge regression with random Fourier features.

use nalgebra::DMatrix;

use fnapprox::prelude::*;

fn sum_of_sines_1d() -> SampleGrid {
    SampleGrid::generate(TargetFunction::SumOfSines, &[30]).unwrap()
}

#[test]
fn test_rrrff_sum_of_sines_1d() {
    let grid = sum_of_sines_1d();
    let mut rrrff = Rrrff::new(RrrffParams::new(1));
    rrrff.train(&grid.inputs, &grid.targets).unwrap();

    let outputs = rrrff.predict(&grid.inputs).unwrap();
    let mae = (&outputs - &grid.targets).abs().mean();
    assert!(mae < 0.15, "mae = {mae}");
}

#[test]
fn test_rrrff_same_seed_same_model() {
    let grid = sum_of_sines_1d();
    let mut a = Rrrff::new(RrrffParams::new(1).seed(7));
    let mut b = Rrrff::new(RrrffParams::new(1).seed(7));
    a.train(&grid.inputs, &grid.targets).unwrap();
    b.train(&grid.inputs, &grid.targets).unwrap();

    assert_eq!(a, b);
    assert_eq!(
        a.predict(&grid.inputs).unwrap(),
        b.predict(&grid.inputs).unwrap()
    );
}

#[test]
fn test_rrrff_seed_changes_features() {
    let grid = sum_of_sines_1d();
    let mut a = Rrrff::new(RrrffParams::new(1).seed(1));
    let mut b = Rrrff::new(RrrffParams::new(1).seed(2));
    a.train(&grid.inputs, &grid.targets).unwrap();
    b.train(&grid.inputs, &grid.targets).unwrap();

    assert_ne!(a.model(), b.model());
}

#[test]
fn test_rrrff_feature_count() {
    let grid = SampleGrid::generate(TargetFunction::Standard, &[10, 10]).unwrap();
    let mut rrrff = Rrrff::new(RrrffParams::new(2));
    assert_eq!(rrrff.params().n_features, 40);

    rrrff.train(&grid.inputs, &grid.targets).unwrap();
    assert_eq!(rrrff.model().unwrap().n_features(), 40);
    assert!(rrrff.prediction_buffer().features.capacity() >= 40);
}

#[test]
fn test_rrrff_invalid_parameters() {
    let inputs = DMatrix::from_fn(10, 1, |r, _| r as f64);
    let targets = inputs.clone();

    let mut rrrff = Rrrff::new(RrrffParams::new(1).gamma(0.0));
    assert!(matches!(
        rrrff.train(&inputs, &targets),
        Err(FaError::InvalidMetaParameter {
            parameter: "gamma",
            ..
        })
    ));

    let mut rrrff = Rrrff::new(RrrffParams::new(1).n_features(0));
    assert!(rrrff.train(&inputs, &targets).is_err());
    assert!(!rrrff.is_trained());
}
