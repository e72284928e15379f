//! Tests for creating approximators by kind and by name.

use nalgebra::DMatrix;

use fnapprox::prelude::*;

#[test]
fn test_kind_names_round_trip() {
    for kind in ApproximatorKind::ALL {
        assert_eq!(kind.name().parse::<ApproximatorKind>().unwrap(), kind);
        assert_eq!(kind.to_string(), kind.name());
    }
    assert_eq!("lwpr".parse::<ApproximatorKind>().unwrap(), ApproximatorKind::Lwpr);
    assert_eq!("Gmr".parse::<ApproximatorKind>().unwrap(), ApproximatorKind::Gmr);
}

#[test]
fn test_unknown_names() {
    assert!(Approximator::by_name("UNKNOWN", 1).is_none());
    let err = approximator("SVM", 1).unwrap_err();
    assert!(matches!(err, FaError::UnknownApproximator(ref name) if name == "SVM"));
}

#[test]
fn test_factory_creates_untrained_models() {
    for kind in ApproximatorKind::ALL {
        let a = approximator(kind.name(), 2).unwrap();
        assert_eq!(a.kind(), kind);
        assert_eq!(a.name(), kind.name());
        assert_eq!(a.input_dim(), 2);
        assert_eq!(a.expected_output_dim(), 1);
        assert!(!a.is_trained());
        assert!(matches!(
            a.predict(&DMatrix::zeros(1, 2)),
            Err(FaError::NotTrained { .. })
        ));
    }
}

#[test]
fn test_every_kind_trains_in_1d_and_2d() {
    for dim in [1, 2] {
        let samples = TargetFunction::default_samples_per_dim(dim);
        let grid = SampleGrid::generate(TargetFunction::Standard, &samples).unwrap();

        for kind in ApproximatorKind::ALL {
            let mut a = Approximator::new(kind, dim);
            a.train(&grid.inputs, &grid.targets).unwrap();

            let outputs = a.predict(&grid.inputs).unwrap();
            assert_eq!(outputs.shape(), (grid.len(), 1));
            let mae = (&outputs - &grid.targets).abs().mean();
            assert!(mae.is_finite(), "{kind} in {dim}D");
        }
    }
}

#[test]
fn test_wrong_training_width() {
    let mut a = Approximator::new(ApproximatorKind::Rrrff, 2);
    let inputs = DMatrix::from_fn(10, 1, |r, _| r as f64);
    let err = a.train(&inputs, &inputs).unwrap_err();
    assert!(matches!(err, FaError::DimensionMismatch { expected: 2, got: 1, .. }));
}
