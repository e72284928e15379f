//! Layer 3: Engine
//!
//! # Purpose
//!
//! This layer provides the machinery around the approximators:
//! - Validation of training data, queries and meta-parameters
//! - The allocation-counting guard for real-time critical regions
//! - Saving and loading trained models
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
//! Layer 3: Engine ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Input and meta-parameter validation.
pub mod validator;

/// Allocation tracking for real-time critical regions.
pub mod realtime;

/// Model and sample persistence.
pub mod persistence;
