//! Tracking Allocator
//!
//! Global allocator wrapper that keeps live, peak and cumulative byte counts.
//! Install it in the benchmark binary:
//!
//! ```ignore
//! #[global_allocator]
//! static GLOBAL: sweepbench::TrackingAllocator = sweepbench::TrackingAllocator;
//! ```
//!
//! Counters are process-wide. Trials run one at a time, so the only traffic
//! inside a measured window comes from the function under test.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static LIVE_BYTES: AtomicU64 = AtomicU64::new(0);
static PEAK_BYTES: AtomicU64 = AtomicU64::new(0);
static ALLOCATED_BYTES: AtomicU64 = AtomicU64::new(0);
static ALLOCATION_COUNT: AtomicU64 = AtomicU64::new(0);
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Allocator that forwards to [`System`] and records usage.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackingAllocator;

impl TrackingAllocator {
    #[inline]
    fn record_alloc(size: u64) {
        let live = LIVE_BYTES.fetch_add(size, Ordering::Relaxed) + size;
        PEAK_BYTES.fetch_max(live, Ordering::Relaxed);
        ALLOCATED_BYTES.fetch_add(size, Ordering::Relaxed);
        ALLOCATION_COUNT.fetch_add(1, Ordering::Relaxed);
        if !INSTALLED.load(Ordering::Relaxed) {
            INSTALLED.store(true, Ordering::Relaxed);
        }
    }

    #[inline]
    fn record_dealloc(size: u64) {
        // Memory freed before the allocator saw it must not wrap the counter
        let _ = LIVE_BYTES.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |live| {
            Some(live.saturating_sub(size))
        });
    }
}

// SAFETY: every call is forwarded to `System` with the caller's layout; the
// bookkeeping only touches atomics and never allocates.
unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            Self::record_alloc(layout.size() as u64);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            Self::record_alloc(layout.size() as u64);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        Self::record_dealloc(layout.size() as u64);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            let old = layout.size() as u64;
            let new = new_size as u64;
            if new > old {
                Self::record_alloc(new - old);
            } else {
                Self::record_dealloc(old - new);
                ALLOCATION_COUNT.fetch_add(1, Ordering::Relaxed);
            }
        }
        new_ptr
    }
}

/// Reset the cumulative counters and the peak to the current live usage.
pub fn reset_allocation_counter() {
    ALLOCATED_BYTES.store(0, Ordering::Relaxed);
    ALLOCATION_COUNT.store(0, Ordering::Relaxed);
    PEAK_BYTES.store(LIVE_BYTES.load(Ordering::Relaxed), Ordering::Relaxed);
}

/// Bytes allocated and allocation count since the last reset.
pub fn current_allocation() -> (u64, u64) {
    (
        ALLOCATED_BYTES.load(Ordering::Relaxed),
        ALLOCATION_COUNT.load(Ordering::Relaxed),
    )
}

/// Bytes currently live on the heap.
pub fn live_bytes() -> u64 {
    LIVE_BYTES.load(Ordering::Relaxed)
}

/// Highest live usage since the last reset.
pub fn peak_allocation() -> u64 {
    PEAK_BYTES.load(Ordering::Relaxed)
}

/// Whether [`TrackingAllocator`] has served at least one allocation,
/// i.e. it is installed as the global allocator.
pub fn is_tracking() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The allocator is not installed in unit tests, so the counters only move
    // through the calls below. Kept in one test: the counters are process-wide.
    #[test]
    fn test_bookkeeping() {
        reset_allocation_counter();
        let base = live_bytes();

        TrackingAllocator::record_alloc(100);
        TrackingAllocator::record_alloc(50);
        TrackingAllocator::record_dealloc(100);

        assert_eq!(peak_allocation(), base + 150);
        assert_eq!(live_bytes(), base + 50);
        assert_eq!(current_allocation(), (150, 2));
        assert!(is_tracking());

        TrackingAllocator::record_dealloc(u64::MAX);
        assert_eq!(live_bytes(), 0);
    }
}
