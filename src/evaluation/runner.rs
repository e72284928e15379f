//! Benchmark runner for function approximators.
//!
//! ## Purpose
//!
//! This module trains each requested approximator on a synthetic target for
//! each requested input dimensionality, measures its mean absolute error, and
//! replays every sample through the real-time prediction path inside an
//! allocation guard.
//!
//! ## Design notes
//!
//! * **Skip, don't fail**: Unknown approximator names are skipped. Training and
//!   prediction errors abort the run.
//! * **Drift**: The real-time loop records how far the caller's input buffer
//!   moved during prediction, averaged over samples. It should stay zero.
//! * **Reporting**: The start of each training and each finished result are
//!   handed to callbacks, so a CLI can print progressively.
//!
//! ## Key concepts
//!
//! * **Save directory**: `<directory>/<name>_<dim>D`, using the name as requested.
//! * **Policy**: [`RealtimePolicy::Strict`] turns guarded allocations into
//!   errors; [`RealtimePolicy::Warn`] logs them.
//!
//! ## Non-goals
//!
//! * Pass/fail thresholds on the error (callers add their own assertions).

use core::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::algorithms::FunctionApproximator;
use crate::algorithms::approximator::Approximator;
use crate::engine::realtime::{
    AllocationReport, RealtimeGuard, RealtimePolicy, allocation_tracking_active,
};
use crate::engine::validator::Validator;
use crate::evaluation::target::{SampleGrid, TargetFunction};
use crate::math::{linalg, stats};
use crate::primitives::errors::FaError;

/// Approximators benchmarked when none are named.
pub const DEFAULT_APPROXIMATORS: [&str; 4] = ["LWR", "RRRFF", "LWPR", "GMR"];

// ============================================================================
// Configuration
// ============================================================================

/// What to benchmark and where to put the trained models.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    /// Base directory for saved models; `None` disables persistence.
    pub directory: Option<PathBuf>,
    /// Approximator names, as requested.
    pub approximators: Vec<String>,
    /// Input dimensionalities.
    pub dims: Vec<usize>,
    /// Function the data is sampled from.
    pub target: TargetFunction,
    /// Response to allocations in the real-time loop.
    pub policy: RealtimePolicy,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            directory: None,
            approximators: DEFAULT_APPROXIMATORS.iter().map(|s| s.to_string()).collect(),
            dims: vec![1, 2],
            target: TargetFunction::Standard,
            policy: RealtimePolicy::Strict,
        }
    }
}

impl BenchmarkConfig {
    /// Default configuration: the four default approximators in 1D and 2D.
    pub fn new() -> Self {
        Self::default()
    }

    /// Save models under `directory`. An empty path disables persistence.
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        self.directory = if directory.as_os_str().is_empty() {
            None
        } else {
            Some(directory)
        };
        self
    }

    /// Benchmark these approximators. An empty list keeps the defaults.
    pub fn approximators<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if !names.is_empty() {
            self.approximators = names;
        }
        self
    }

    /// Benchmark these input dimensionalities.
    pub fn dims(mut self, dims: Vec<usize>) -> Self {
        self.dims = dims;
        self
    }

    /// Sample data from `target`.
    pub fn target(mut self, target: TargetFunction) -> Self {
        self.target = target;
        self
    }

    /// Set the real-time violation policy.
    pub fn policy(mut self, policy: RealtimePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn validate(&self) -> Result<(), FaError> {
        if self.dims.is_empty() {
            return Err(FaError::InvalidMetaParameter {
                parameter: "dims",
                reason: "at least one dimensionality is required".to_string(),
            });
        }
        for &dim in &self.dims {
            Validator::validate_count(dim, "dims")?;
        }
        Ok(())
    }
}

// ============================================================================
// Report
// ============================================================================

/// Result of benchmarking one approximator at one dimensionality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    /// Name reported by the approximator.
    pub name: String,
    /// Input dimensionality.
    pub input_dim: usize,
    /// Mean absolute error per output dimension.
    pub mean_abs_error: Vec<f64>,
    /// `max - min` of the targets per output dimension.
    pub target_range: Vec<f64>,
    /// Mean change of the first input coordinate across `predict_row` calls.
    pub drift: f64,
    /// Allocator traffic summed over all guarded predictions.
    pub allocations: AllocationReport,
    /// Mean wall-clock time of one guarded prediction.
    pub mean_predict_time: Duration,
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &[f64]) -> fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{v:.5}")?;
    }
    Ok(())
}

/// Progress heading printed before training `name` on `input_dim`-D data.
pub fn training_heading(name: &str, input_dim: usize) -> String {
    format!("Training {name} on {input_dim}D data...")
}

/// The full report line. The alternate form (`{:#}`) omits the training
/// heading, for callers that printed it before training started.
impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            write!(f, "{}", training_heading(&self.name, self.input_dim))?;
        }
        write!(f, "\t         Mean absolute error ")?;
        if self.mean_abs_error.len() > 1 {
            write!(f, " (per dimension)")?;
        }
        write!(f, ": ")?;
        write_values(f, &self.mean_abs_error)?;
        write!(f, "   \t(range of target data is ")?;
        write_values(f, &self.target_range)?;
        write!(f, ")  diff={:.5}", self.drift)
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Runs a [`BenchmarkConfig`].
#[derive(Debug, Clone, Default)]
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    /// Create a runner.
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    /// The configuration being run.
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run every (dimensionality, approximator) pair and collect the reports.
    pub fn run(&self) -> Result<Vec<BenchmarkReport>, FaError> {
        self.run_with(|_| {})
    }

    /// Like [`run`](Self::run), calling `on_report` as each report is produced.
    pub fn run_with<F>(&self, on_report: F) -> Result<Vec<BenchmarkReport>, FaError>
    where
        F: FnMut(&BenchmarkReport),
    {
        self.run_with_progress(|_, _| {}, on_report)
    }

    /// Like [`run_with`](Self::run_with), also calling `on_start` with the
    /// approximator name and input dimensionality before each training.
    pub fn run_with_progress<S, F>(
        &self,
        mut on_start: S,
        mut on_report: F,
    ) -> Result<Vec<BenchmarkReport>, FaError>
    where
        S: FnMut(&str, usize),
        F: FnMut(&BenchmarkReport),
    {
        self.config.validate()?;
        if !allocation_tracking_active() {
            warn!("counting allocator not installed; real-time checks will not see allocations");
        }

        let mut reports = Vec::new();
        for &dim in &self.config.dims {
            let samples_per_dim = TargetFunction::default_samples_per_dim(dim);
            let grid = SampleGrid::generate(self.config.target, &samples_per_dim)?;
            debug!(
                dim,
                samples = grid.len(),
                target = %self.config.target,
                "generated sample grid"
            );

            for name in &self.config.approximators {
                if let Some(report) = self.evaluate_with(name, &grid, &mut on_start)? {
                    on_report(&report);
                    reports.push(report);
                }
            }
        }
        Ok(reports)
    }

    /// Benchmark one approximator on one grid; `None` when the name is unknown.
    pub fn evaluate(
        &self,
        name: &str,
        grid: &SampleGrid,
    ) -> Result<Option<BenchmarkReport>, FaError> {
        self.evaluate_with(name, grid, &mut |_: &str, _: usize| {})
    }

    fn evaluate_with(
        &self,
        name: &str,
        grid: &SampleGrid,
        on_start: &mut dyn FnMut(&str, usize),
    ) -> Result<Option<BenchmarkReport>, FaError> {
        let input_dim = grid.input_dim();
        let Some(mut approximator) = Approximator::by_name(name, input_dim) else {
            debug!(approximator = name, "skipping unknown approximator");
            return Ok(None);
        };

        let save_dir = self
            .config
            .directory
            .as_ref()
            .map(|dir| dir.join(format!("{name}_{input_dim}D")));

        info!(approximator = name, input_dim, "training");
        on_start(approximator.name(), input_dim);
        approximator.train_and_save(&grid.inputs, &grid.targets, save_dir.as_deref(), true)?;

        let outputs = approximator.predict(&grid.inputs)?;
        let mean_abs_error = stats::mean_absolute_error(&grid.targets, &outputs);
        let target_range = stats::column_ranges(&grid.targets);

        let (drift, allocations, mean_predict_time) =
            self.realtime_loop(&approximator, grid)?;

        info!(
            approximator = approximator.name(),
            input_dim,
            allocations = allocations.allocations,
            mean_predict_ns = mean_predict_time.as_nanos() as u64,
            "real-time loop finished"
        );

        Ok(Some(BenchmarkReport {
            name: approximator.name().to_string(),
            input_dim,
            mean_abs_error,
            target_range,
            drift,
            allocations,
            mean_predict_time,
        }))
    }

    fn realtime_loop(
        &self,
        approximator: &Approximator,
        grid: &SampleGrid,
    ) -> Result<(f64, AllocationReport, Duration), FaError> {
        let n = grid.len();
        let mut buffer = approximator.prediction_buffer();
        let mut input = vec![0.0; grid.input_dim()];
        let mut output = vec![0.0; approximator.expected_output_dim()];

        let mut drift = 0.0;
        let mut allocations = AllocationReport::default();
        let mut elapsed = Duration::ZERO;
        for i in 0..n {
            linalg::copy_row(&grid.inputs, i, &mut input);

            let start = Instant::now();
            let guard = RealtimeGuard::enter();
            let result = approximator.predict_row(&input, &mut output, &mut buffer);
            let report = guard.finish();
            elapsed += start.elapsed();

            result?;
            self.config.policy.check(report, approximator.name())?;
            allocations += report;
            drift += grid.inputs[(i, 0)] - input[0];
        }

        let n = n.max(1);
        Ok((drift / n as f64, allocations, elapsed.div_f64(n as f64)))
    }
}
