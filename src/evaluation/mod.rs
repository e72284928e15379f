//! Layer 5: Evaluation
//!
//! # Purpose
//!
//! This layer measures approximators on synthetic data:
//! - Target functions and the regular sample grids drawn from them
//! - The benchmark runner (error, target range, drift, real-time checks)
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Evaluation ← You are here
//!   ↓
//! Layer 4: Algorithms
//!   ↓
//! Layer 3: Engine
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Synthetic target functions and sample grids.
pub mod target;

/// The benchmark runner.
pub mod runner;
