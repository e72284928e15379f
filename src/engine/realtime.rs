//! Allocation tracking for real-time critical regions.
//!
//! ## Purpose
//!
//! Control loops call `predict_row` at a fixed rate and cannot afford a trip to
//! the heap. This module makes that contract checkable: a counting global
//! allocator records every allocation made on a thread while that thread is
//! inside a [`RealtimeGuard`], and leaving the guard reports what happened.
//!
//! ## Design notes
//!
//! * **Opt-in allocator**: [`CountingAllocator`] only counts once a program (or
//!   test binary) installs it with `#[global_allocator]`. Without it every guard
//!   reports zero, which [`allocation_tracking_active`] detects.
//! * **Thread-local counters**: Counters use `const`-initialized thread locals so
//!   the allocator itself never allocates, and parallel test threads do not see
//!   each other's allocations.
//! * **Nesting**: Guards nest. An inner guard reports only its own region; the
//!   outer guard's report includes the inner region.
//!
//! ## Invariants
//!
//! * Counters only increase while the thread is armed (depth > 0).
//! * A guard dropped without `exit` disarms without reporting.
//!
//! ## Non-goals
//!
//! * Timing guarantees (only allocator traffic is checked).
//! * Tracking allocations made by other threads.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::marker::PhantomData;
use std::thread::LocalKey;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::primitives::errors::FaError;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
    static DEALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

#[inline]
fn read(counter: &'static LocalKey<Cell<usize>>) -> usize {
    counter.try_with(Cell::get).unwrap_or(0)
}

#[inline]
fn record(counter: &'static LocalKey<Cell<usize>>) {
    let armed = DEPTH.try_with(|d| d.get() > 0).unwrap_or(false);
    if armed {
        let _ = counter.try_with(|c| c.set(c.get() + 1));
    }
}

// ============================================================================
// Counting Allocator
// ============================================================================

/// Global allocator that forwards to [`System`] and counts calls made inside
/// real-time guards.
///
/// ```ignore
/// #[global_allocator]
/// static ALLOCATOR: fnapprox::prelude::CountingAllocator = fnapprox::prelude::CountingAllocator;
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingAllocator;

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record(&ALLOCATIONS);
        unsafe { System.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        record(&ALLOCATIONS);
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        record(&ALLOCATIONS);
        unsafe { System.realloc(ptr, layout, new_size) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        record(&DEALLOCATIONS);
        unsafe { System.dealloc(ptr, layout) }
    }
}

// ============================================================================
// Guard
// ============================================================================

/// Allocator traffic observed inside a guarded region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Allocations and reallocations.
    pub allocations: usize,
    /// Deallocations.
    pub deallocations: usize,
}

impl AllocationReport {
    /// True when the region touched neither `alloc` nor `dealloc`.
    pub fn is_clean(&self) -> bool {
        self.allocations == 0 && self.deallocations == 0
    }

    fn into_result(self) -> Result<Self, FaError> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(FaError::RealtimeViolation {
                allocations: self.allocations,
                deallocations: self.deallocations,
            })
        }
    }
}

impl core::ops::AddAssign for AllocationReport {
    fn add_assign(&mut self, rhs: Self) {
        self.allocations += rhs.allocations;
        self.deallocations += rhs.deallocations;
    }
}

/// Scoped marker for a real-time critical region on the current thread.
#[derive(Debug)]
pub struct RealtimeGuard {
    allocations: usize,
    deallocations: usize,
    active: bool,
    // Counters are per thread, so the guard must stay on the thread that armed it.
    _not_send: PhantomData<*const ()>,
}

impl RealtimeGuard {
    /// Enter a critical region.
    pub fn enter() -> Self {
        let _ = DEPTH.try_with(|d| d.set(d.get() + 1));
        Self {
            allocations: read(&ALLOCATIONS),
            deallocations: read(&DEALLOCATIONS),
            active: true,
            _not_send: PhantomData,
        }
    }

    /// Leave the region and return its allocator traffic, clean or not.
    pub fn finish(mut self) -> AllocationReport {
        let report = AllocationReport {
            allocations: read(&ALLOCATIONS) - self.allocations,
            deallocations: read(&DEALLOCATIONS) - self.deallocations,
        };
        self.disarm();
        report
    }

    /// Leave the region; any allocation or deallocation is an error.
    pub fn exit(self) -> Result<AllocationReport, FaError> {
        self.finish().into_result()
    }

    fn disarm(&mut self) {
        if self.active {
            self.active = false;
            let _ = DEPTH.try_with(|d| d.set(d.get().saturating_sub(1)));
        }
    }
}

impl Drop for RealtimeGuard {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// Run `f` inside a guard and return its result with the observed traffic.
pub fn guarded<R>(f: impl FnOnce() -> R) -> (R, AllocationReport) {
    let guard = RealtimeGuard::enter();
    let result = f();
    (result, guard.finish())
}

/// Whether [`CountingAllocator`] is the global allocator of this program.
pub fn allocation_tracking_active() -> bool {
    let (_, report) = guarded(|| drop(std::hint::black_box(Box::new(0u8))));
    report.allocations > 0
}

// ============================================================================
// Policy
// ============================================================================

/// What to do when a guarded region allocated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RealtimePolicy {
    /// Fail with [`FaError::RealtimeViolation`].
    #[default]
    Strict,
    /// Log a warning and continue.
    Warn,
}

impl RealtimePolicy {
    /// Apply the policy to the traffic of a region run by `approximator`.
    pub fn check(self, report: AllocationReport, approximator: &str) -> Result<(), FaError> {
        match (self, report.into_result()) {
            (_, Ok(_)) => Ok(()),
            (RealtimePolicy::Strict, Err(e)) => Err(e),
            (RealtimePolicy::Warn, Err(_)) => {
                warn!(
                    approximator,
                    allocations = report.allocations,
                    deallocations = report.deallocations,
                    "allocation in real-time critical region"
                );
                Ok(())
            }
        }
    }
}
