//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides pure mathematical functions used by the approximators:
//! - Gaussian kernels and kernel grids spanning the input domain
//! - Linear algebra (regularized solves, weighted least squares, dot products)
//! - Column statistics used by the benchmark report
//!
//! These are reusable mathematical building blocks with no model-specific logic.
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Evaluation
//!   ↓
//! Layer 4: Algorithms
//!   ↓
//! Layer 3: Engine
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Gaussian kernels and kernel grids.
pub mod kernel;

/// Linear algebra backed by nalgebra.
pub mod linalg;

/// Column statistics.
pub mod stats;
