//! High-level API for function approximation.
//!
//! ## Purpose
//!
//! This module is the user-facing entry point. It gathers the types needed to
//! create, train, query and persist approximators, and to run the real-time
//! benchmark, behind one import path.
//!
//! ## Design notes
//!
//! * **Two factories**: [`approximator`] fails with `UnknownApproximator`;
//!   `Approximator::by_name` returns `None` for callers that skip unknown names.
//! * **Builders everywhere**: Meta-parameters and the benchmark configuration are
//!   fluent builders with defaults for every field.
//!
//! ## Key concepts
//!
//! 1. Create an approximator by kind or name.
//! 2. `train` (or `train_and_save`) on sample-major matrices.
//! 3. Predict in batch with `predict`, or per sample with `predict_row` and a
//!    buffer from `prediction_buffer`.

// Publicly re-exported types
pub use crate::algorithms::FunctionApproximator;
pub use crate::algorithms::approximator::{Approximator, ApproximatorKind};
pub use crate::algorithms::gmr::{Gmr, GmrComponent, GmrModel, GmrParams};
pub use crate::algorithms::gpr::{Gpr, GprModel, GprParams};
pub use crate::algorithms::lwpr::{Lwpr, LwprModel, LwprParams, ReceptiveField};
pub use crate::algorithms::lwr::{Lwr, LwrModel, LwrParams};
pub use crate::algorithms::rbfn::{Rbfn, RbfnModel, RbfnParams};
pub use crate::algorithms::rrrff::{Rrrff, RrrffModel, RrrffParams};
pub use crate::engine::realtime::{
    AllocationReport, CountingAllocator, RealtimeGuard, RealtimePolicy,
    allocation_tracking_active,
};
pub use crate::engine::persistence::{MODEL_FILE, SAMPLES_FILE, SampleRecord, load_samples};
pub use crate::evaluation::runner::{
    BenchmarkConfig, BenchmarkReport, BenchmarkRunner, DEFAULT_APPROXIMATORS, training_heading,
};
pub use crate::evaluation::target::{SampleGrid, TargetFunction};
pub use crate::math::kernel::KernelGrid;
pub use crate::primitives::buffer::PredictionBuffer;
pub use crate::primitives::errors::FaError;

/// Create an untrained approximator by name (case-insensitive).
pub fn approximator(name: &str, input_dim: usize) -> Result<Approximator, FaError> {
    let kind: ApproximatorKind = name.parse()?;
    Ok(Approximator::new(kind, input_dim))
}

/// Run the benchmark described by `config`.
pub fn benchmark(config: BenchmarkConfig) -> Result<Vec<BenchmarkReport>, FaError> {
    BenchmarkRunner::new(config).run()
}
