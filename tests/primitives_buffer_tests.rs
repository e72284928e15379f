#![cfg(feature = "dev")]
//! Tests for prediction scratch buffers.

use fnapprox::internals::primitives::buffer::{PredictionBuffer, Slot};

#[test]
fn test_slot_zeroed_resets_values() {
    let mut slot: Slot<f64> = Slot::new(4);
    slot.zeroed(3).copy_from_slice(&[1.0, 2.0, 3.0]);

    let values = slot.zeroed(2);
    assert_eq!(values, &[0.0, 0.0]);
    assert_eq!(slot.len(), 2);
}

#[test]
fn test_slot_zeroed_keeps_capacity() {
    let mut slot: Slot<f64> = Slot::new(8);
    let before = slot.capacity();
    slot.zeroed(8);
    slot.zeroed(3);
    assert_eq!(slot.capacity(), before);
}

#[test]
fn test_slot_ensure_capacity_grows_only() {
    let mut slot: Slot<f64> = Slot::new(2);
    slot.ensure_capacity(16);
    assert!(slot.capacity() >= 16);

    let grown = slot.capacity();
    slot.ensure_capacity(4);
    assert_eq!(slot.capacity(), grown);
}

#[test]
fn test_slot_ensure_capacity_with_contents() {
    let mut slot: Slot<f64> = Slot::new(0);
    slot.zeroed(5);
    slot.ensure_capacity(10);
    assert!(slot.capacity() >= 10);
    assert_eq!(slot.len(), 5);

    slot.clear();
    assert!(slot.is_empty());
    assert!(slot.capacity() >= 10);
}

#[test]
fn test_prediction_buffer_capacities() {
    let buffer = PredictionBuffer::new(9, 20, 2);
    assert!(buffer.activations.capacity() >= 9);
    assert!(buffer.features.capacity() >= 20);
    assert!(buffer.delta.capacity() >= 2);
    assert!(buffer.residual.capacity() >= 2);
}

#[test]
fn test_prediction_buffer_ensure_capacity() {
    let mut buffer = PredictionBuffer::default();
    buffer.ensure_capacity(3, 4, 5);
    assert!(buffer.activations.capacity() >= 3);
    assert!(buffer.features.capacity() >= 4);
    assert!(buffer.delta.capacity() >= 5);
    assert!(buffer.residual.capacity() >= 5);
}
