//! # fnapprox: Function Approximators with Real-Time Prediction
//!
//! Trainable regressors that map input vectors to output vectors, built for use
//! inside control loops: once trained, every approximator predicts a single
//! sample without touching the heap.
//!
//! ## Approximators
//!
//! | Name      | Model                                         | Training                          |
//! |-----------|-----------------------------------------------|-----------------------------------|
//! | **LWR**   | Kernel-weighted blend of local linear models  | Weighted least squares per kernel |
//! | **RRRFF** | Ridge regression on random Fourier features   | One ridge solve                   |
//! | **LWPR**  | Receptive fields with local PLS regression    | Incremental, several epochs       |
//! | **GMR**   | Conditional of a joint Gaussian mixture       | k-means, then EM                  |
//! | **RBFN**  | Weighted sum of Gaussian kernels              | One ridge solve                   |
//! | **GPR**   | Gaussian process posterior mean               | One kernel solve                  |
//!
//! ## Quick Start
//!
//! ```rust
//! use fnapprox::prelude::*;
//! use nalgebra::DMatrix;
//!
//! let grid = SampleGrid::generate(TargetFunction::SumOfSines, &[30])?;
//!
//! let mut lwr = Lwr::new(LwrParams::new(1).basis_per_dim(vec![9]).intersection(0.5));
//! lwr.train(&grid.inputs, &grid.targets)?;
//!
//! // Batch prediction
//! let outputs: DMatrix<f64> = lwr.predict(&grid.inputs)?;
//! assert_eq!(outputs.shape(), (30, 1));
//!
//! // Real-time prediction: no allocation after the buffer is created
//! let mut buffer = lwr.prediction_buffer();
//! let mut y = [0.0];
//! lwr.predict_row(&[0.25], &mut y, &mut buffer)?;
//! # Result::<(), FaError>::Ok(())
//! ```
//!
//! ## Selecting by Name
//!
//! ```rust
//! use fnapprox::prelude::*;
//!
//! let grid = SampleGrid::generate(TargetFunction::Standard, &[10, 10])?;
//! let mut model = Approximator::by_name("GMR", 2).expect("known name");
//! model.train(&grid.inputs, &grid.targets)?;
//! assert_eq!(model.name(), "GMR");
//!
//! assert!(Approximator::by_name("NOPE", 2).is_none());
//! # Result::<(), FaError>::Ok(())
//! ```
//!
//! ## Benchmark
//!
//! The `fa-realtime` binary (and [`prelude::BenchmarkRunner`]) trains each
//! approximator on a synthetic target in 1D and 2D, reports the mean absolute
//! error, and replays every sample through `predict_row` inside a
//! [`prelude::RealtimeGuard`]. With [`prelude::CountingAllocator`] installed as the
//! global allocator, any allocation in that region is a
//! [`FaError::RealtimeViolation`](prelude::FaError::RealtimeViolation).
//!
//! ```text
//! Training LWR on 1D data...	         Mean absolute error : <mae>   	(range of target data is <range>)  diff=<drift>
//! ```
//!
//! ## Persistence
//!
//! `Approximator::train_and_save` writes `model.json` and `samples.json` into a
//! directory; `Approximator::load` reads the model back.
//!
//! ## References
//!
//! - Atkeson, C. G., Moore, A. W., & Schaal, S. (1997). "Locally Weighted Learning"
//! - Vijayakumar, S., D'Souza, A., & Schaal, S. (2005). "Incremental Online Learning in High Dimensions"
//! - Rahimi, A., & Recht, B. (2007). "Random Features for Large-Scale Kernel Machines"
//! - Calinon, S. (2016). "A Tutorial on Task-Parameterized Movement Learning and Retrieval"

#![deny(missing_docs)]

// ============================================================================
// Internal Modules
// ============================================================================

// Layer 1: Primitives - error type and prediction scratch buffers.
mod primitives;

// Layer 2: Math - kernels, linear algebra and column statistics.
mod math;

// Layer 3: Engine - validation, allocation tracking and persistence.
mod engine;

// Layer 4: Algorithms - the approximators and their shared trait.
mod algorithms;

// Layer 5: Evaluation - target functions and the benchmark runner.
mod evaluation;

// High-level API.
mod api;

// ============================================================================
// Prelude
// ============================================================================

/// Standard fnapprox prelude.
///
/// This module is intended to be wildcard-imported for convenient access
/// to the most commonly used types:
///
/// ```
/// use fnapprox::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::*;
}

// ============================================================================
// Testing re-exports
// ============================================================================

/// Internal modules for development and testing.
///
/// This module re-exports internal modules for development and testing purposes.
/// It is only available with the `dev` feature enabled.
///
/// **Warning**: These are internal implementation details and may change without notice.
/// Do not use in production code.
#[cfg(feature = "dev")]
pub mod internals {
    /// Internal primitive types and utilities.
    pub mod primitives {
        pub use crate::primitives::*;
    }
    /// Internal math functions.
    pub mod math {
        pub use crate::math::*;
    }
    /// Internal approximators.
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    /// Internal validation, real-time and persistence machinery.
    pub mod engine {
        pub use crate::engine::*;
    }
    /// Internal evaluation.
    pub mod evaluation {
        pub use crate::evaluation::*;
    }
    /// Internal API.
    pub mod api {
        pub use crate::api::*;
    }
}
