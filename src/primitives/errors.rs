//! Error types for function approximation.
//!
//! ## Purpose
//!
//! This module defines the error conditions that can occur while validating
//! training data, fitting an approximator, predicting, persisting a model, or
//! checking the real-time prediction path.
//!
//! ## Design notes
//!
//! * **Contextual**: Errors carry the offending values (expected vs. actual sizes).
//! * **Single enum**: Every layer returns `FaError`, so `?` composes across layers.
//!
//! ## Key concepts
//!
//! 1. **Input validation**: Empty data, mismatched rows, non-finite values.
//! 2. **Parameter validation**: Meta-parameters outside their admissible range.
//! 3. **Lifecycle**: Predicting with an approximator that was never trained.
//! 4. **Real-time checks**: Heap activity inside a guarded prediction.
//! 5. **Persistence**: Filesystem and serialization failures.
//!
//! ## Non-goals
//!
//! * This module does not perform the validation logic itself.
//! * This module does not provide error recovery or fallback strategies.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Error Type
// ============================================================================

/// Error type for function approximation.
#[derive(Debug, Error)]
pub enum FaError {
    /// No samples were provided.
    #[error("Input arrays are empty")]
    EmptyInput,

    /// `inputs` and `targets` must have the same number of rows.
    #[error("Row mismatch: inputs have {inputs} rows, targets have {targets}")]
    MismatchedInputs {
        /// Rows in the input matrix.
        inputs: usize,
        /// Rows in the target matrix.
        targets: usize,
    },

    /// A matrix or slice has the wrong width.
    #[error("Dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// What was being checked (e.g. "input", "output").
        what: &'static str,
        /// Expected width.
        expected: usize,
        /// Actual width.
        got: usize,
    },

    /// Data contains NaN or infinite values.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// Not enough samples for the requested model.
    #[error("Too few points: got {got}, need at least {min}")]
    TooFewPoints {
        /// Number of samples provided.
        got: usize,
        /// Minimum number of samples.
        min: usize,
    },

    /// A meta-parameter is outside its admissible range.
    #[error("Invalid meta-parameter `{parameter}`: {reason}")]
    InvalidMetaParameter {
        /// Name of the meta-parameter.
        parameter: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The approximator must be trained before it can predict.
    #[error("{approximator} has not been trained")]
    NotTrained {
        /// Name of the approximator.
        approximator: &'static str,
    },

    /// A linear system could not be solved, even with the SVD fallback.
    #[error("Singular system while computing {0}")]
    SingularSystem(&'static str),

    /// Name does not correspond to any approximator.
    #[error("Unknown approximator: {0}")]
    UnknownApproximator(String),

    /// Heap activity was observed inside a real-time critical region.
    #[error(
        "Real-time violation: {allocations} allocation(s) and {deallocations} deallocation(s) in critical region"
    )]
    RealtimeViolation {
        /// Allocations observed between enter and exit.
        allocations: usize,
        /// Deallocations observed between enter and exit.
        deallocations: usize,
    },

    /// Refused to write into a non-empty directory without overwrite.
    #[error("Output directory {} is not empty (overwrite disabled)", .0.display())]
    OutputExists(PathBuf),

    /// Filesystem error while saving or loading a model.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// JSON (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FaError {
    fn from(err: serde_json::Error) -> Self {
        FaError::Serialization(err.to_string())
    }
}
