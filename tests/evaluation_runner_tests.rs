//! Tests for the benchmark runner and its report.

use std::time::Duration;

use tempfile::tempdir;

use fnapprox::prelude::*;

#[test]
fn test_default_config() {
    let config = BenchmarkConfig::default();
    assert_eq!(config.directory, None);
    assert_eq!(config.approximators, DEFAULT_APPROXIMATORS.to_vec());
    assert_eq!(config.dims, vec![1, 2]);
    assert_eq!(config.target, TargetFunction::Standard);
    assert_eq!(config.policy, RealtimePolicy::Strict);
}

#[test]
fn test_config_builders() {
    let config = BenchmarkConfig::new()
        .directory("")
        .approximators(Vec::<String>::new());
    assert_eq!(config, BenchmarkConfig::default());

    let config = BenchmarkConfig::new()
        .directory("/tmp/fa")
        .approximators(["GPR"])
        .dims(vec![3]);
    assert!(config.directory.is_some());
    assert_eq!(config.approximators, vec!["GPR".to_string()]);
    assert_eq!(config.dims, vec![3]);
}

#[test]
fn test_lwr_sum_of_sines_benchmark() {
    let config = BenchmarkConfig::new()
        .approximators(["LWR"])
        .dims(vec![1])
        .target(TargetFunction::SumOfSines)
        .policy(RealtimePolicy::Warn);
    let reports = benchmark(config).unwrap();

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.name, "LWR");
    assert_eq!(report.input_dim, 1);
    assert_eq!(report.mean_abs_error.len(), 1);
    assert!(report.mean_abs_error[0] < 0.05);
    assert!(report.target_range[0] > 1.0);
    assert_eq!(report.drift, 0.0);
    assert!(report.mean_predict_time > Duration::ZERO);
    assert!(report.mean_predict_time < Duration::from_millis(100));
}

#[test]
fn test_unknown_names_are_skipped() {
    let config = BenchmarkConfig::new()
        .approximators(["NOPE", "RBFN", "ALSO_NOPE"])
        .dims(vec![1, 2])
        .policy(RealtimePolicy::Warn);

    let mut seen = Vec::new();
    let reports = BenchmarkRunner::new(config)
        .run_with(|r| seen.push((r.name.clone(), r.input_dim)))
        .unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(
        seen,
        vec![("RBFN".to_string(), 1), ("RBFN".to_string(), 2)]
    );
}

#[test]
fn test_invalid_dims() {
    let runner = BenchmarkRunner::new(BenchmarkConfig::new().dims(vec![]));
    assert!(matches!(
        runner.run(),
        Err(FaError::InvalidMetaParameter {
            parameter: "dims",
            ..
        })
    ));

    let runner = BenchmarkRunner::new(BenchmarkConfig::new().dims(vec![0]));
    assert!(runner.run().is_err());
}

#[test]
fn test_models_saved_per_dimension() {
    let dir = tempdir().unwrap();
    let config = BenchmarkConfig::new()
        .directory(dir.path())
        .approximators(["lwr"])
        .dims(vec![1, 2])
        .policy(RealtimePolicy::Warn);
    benchmark(config).unwrap();

    for sub in ["lwr_1D", "lwr_2D"] {
        let saved = dir.path().join(sub);
        assert!(saved.join(MODEL_FILE).is_file(), "{sub}");
        assert!(saved.join(SAMPLES_FILE).is_file(), "{sub}");
        assert_eq!(Approximator::load(&saved).unwrap().kind(), ApproximatorKind::Lwr);
    }
}

#[test]
fn test_rerun_overwrites_saved_models() {
    let dir = tempdir().unwrap();
    let config = BenchmarkConfig::new()
        .directory(dir.path())
        .approximators(["GPR"])
        .dims(vec![1])
        .policy(RealtimePolicy::Warn);
    benchmark(config.clone()).unwrap();
    assert!(benchmark(config).is_ok());
}

#[test]
fn test_report_display() {
    let report = BenchmarkReport {
        name: "LWR".to_string(),
        input_dim: 1,
        mean_abs_error: vec![0.125],
        target_range: vec![2.5],
        drift: 0.0,
        allocations: AllocationReport::default(),
        mean_predict_time: Duration::from_nanos(500),
    };
    assert_eq!(
        report.to_string(),
        "Training LWR on 1D data...\t         Mean absolute error : 0.12500   \t(range of target data is 2.50000)  diff=0.00000"
    );

    let report = BenchmarkReport {
        mean_abs_error: vec![0.1, 0.2],
        target_range: vec![1.0, 2.0],
        ..report
    };
    assert!(report.to_string().contains(" (per dimension): 0.10000 0.20000"));
}

#[test]
fn test_report_display_alternate_omits_heading() {
    let report = BenchmarkReport {
        name: "GMR".to_string(),
        input_dim: 2,
        mean_abs_error: vec![0.125],
        target_range: vec![2.5],
        drift: 0.0,
        allocations: AllocationReport::default(),
        mean_predict_time: Duration::from_nanos(500),
    };
    let heading = training_heading("GMR", 2);
    assert_eq!(heading, "Training GMR on 2D data...");
    assert_eq!(format!("{heading}{report:#}"), report.to_string());
    assert!(format!("{report:#}").starts_with("\t         Mean absolute error : "));
}

#[test]
fn test_progress_announces_training_before_report() {
    let config = BenchmarkConfig::new()
        .approximators(["lwr", "NOPE", "RBFN"])
        .dims(vec![1])
        .policy(RealtimePolicy::Warn);

    let events = std::cell::RefCell::new(Vec::new());
    let reports = BenchmarkRunner::new(config)
        .run_with_progress(
            |name, dim| events.borrow_mut().push(format!("start {name} {dim}")),
            |report| events.borrow_mut().push(format!("done {}", report.name)),
        )
        .unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(
        events.into_inner(),
        vec!["start LWR 1", "done LWR", "start RBFN 1", "done RBFN"]
    );
}
