//! Memory management for allocation-free prediction.
//!
//! ## Purpose
//!
//! This module provides the reusable scratch space (`PredictionBuffer`) that every
//! approximator uses in `predict_row`. The buffer is created once, sized for the
//! trained model, and then passed by mutable reference into each single-sample
//! prediction so the hot path never touches the allocator.
//!
//! ## Design notes
//!
//! * **Caller ownership**: The buffer lives outside the approximator, so a trained
//!   model can be shared immutably while each control loop owns its scratch space.
//! * **Lazy Expansion**: Slots grow on demand but never shrink. A buffer sized by
//!   `prediction_buffer()` never grows during prediction.
//!
//! ## Invariants
//!
//! * `Slot::zeroed` resizes within capacity and only allocates when the slot is
//!   smaller than requested.
//! * Capacity is monotonically increasing.
//!
//! ## Non-goals
//!
//! * Thread-local automatic caching (buffers are explicitly passed).
//! * Dynamic shrinking or memory reclamation.

use core::ops::{Deref, DerefMut};

// ============================================================================
// Slot - Unified Vector Abstraction
// ============================================================================

/// A reusable vector slot with automatic capacity management.
#[derive(Debug, Clone)]
pub struct Slot<T>(Vec<T>);

impl<T> Slot<T> {
    /// Create a new slot with the given initial capacity.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Ensure the slot has at least the given capacity.
    /// Grows the underlying vector if needed; never shrinks.
    #[inline]
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if self.0.capacity() < capacity {
            self.0.reserve(capacity - self.0.len());
        }
    }

    /// Clear the slot (sets length to 0, preserves capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<T: Copy + Default> Slot<T> {
    /// Reset the slot to `len` default values and return it as a slice.
    #[inline]
    pub fn zeroed(&mut self, len: usize) -> &mut [T] {
        self.0.clear();
        self.0.resize(len, T::default());
        &mut self.0
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Deref for Slot<T> {
    type Target = Vec<T>;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Slot<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

// ============================================================================
// Prediction Buffer
// ============================================================================

/// Scratch space for single-sample prediction.
///
/// Which slots an approximator uses, and how large they are, depends on the
/// model: kernel models use `activations`, feature models use `features`, and
/// projection/mixture models use `delta` and `residual` for per-input work.
#[derive(Debug, Clone, Default)]
pub struct PredictionBuffer {
    /// Kernel activations, one per basis function, receptive field or component.
    pub activations: Slot<f64>,
    /// Feature vector (random features, covariances with training points).
    pub features: Slot<f64>,
    /// Input-sized work vector (normalized input, offset from a center).
    pub delta: Slot<f64>,
    /// Input-sized residual vector for projection regression.
    pub residual: Slot<f64>,
}

impl PredictionBuffer {
    /// Create a buffer with the given capacities.
    ///
    /// - `n_activations`: basis functions, receptive fields or mixture components.
    /// - `n_features`: length of the feature vector.
    /// - `input_dim`: width of a single input.
    pub fn new(n_activations: usize, n_features: usize, input_dim: usize) -> Self {
        Self {
            activations: Slot::new(n_activations),
            features: Slot::new(n_features),
            delta: Slot::new(input_dim),
            residual: Slot::new(input_dim),
        }
    }

    /// Ensure all slots can hold the given sizes without reallocating.
    pub fn ensure_capacity(&mut self, n_activations: usize, n_features: usize, input_dim: usize) {
        self.activations.ensure_capacity(n_activations);
        self.features.ensure_capacity(n_features);
        self.delta.ensure_capacity(input_dim);
        self.residual.ensure_capacity(input_dim);
    }
}
