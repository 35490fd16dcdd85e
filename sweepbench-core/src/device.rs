//! Device and Memory Probes
//!
//! A [`Device`] is the accelerator context chosen once for the whole run by the
//! embedding binary. The harness never looks it up itself; it is injected and
//! threaded through every [`TrialContext`](crate::TrialContext).

use crate::allocator;
use std::any::Any;
use crate::error::DeviceError;

/// Accelerator context that executes work asynchronously.
pub trait Device: Send + Sync {
    /// Human-readable name, shown in report metadata
    fn name(&self) -> &str;

    /// Wait until every queued operation has completed.
    fn synchronize(&self) -> Result<(), DeviceError>;

    /// Device-side memory probe. `None` falls back to host allocation tracking.
    fn memory_probe(&self) -> Option<&dyn MemoryProbe> {
        None
    }

    /// The concrete device, for functions that drive it beyond the barrier.
    ///
    /// See [`TrialContext::device_as`](crate::TrialContext::device_as).
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}

/// Source of peak-memory readings for the memory strategy.
///
/// Implementations must not allocate from the host heap in either method:
/// they run inside the measured window.
pub trait MemoryProbe: Send + Sync {
    /// Reset peak tracking to the current usage and return that usage as the baseline.
    fn snapshot(&self) -> u64;

    /// Highest usage observed since the last [`snapshot`](MemoryProbe::snapshot).
    fn peak(&self) -> u64;

    /// Allocations observed since the last snapshot (0 if unknown)
    fn allocations(&self) -> u64 {
        0
    }
}

/// Host heap probe backed by [`TrackingAllocator`](crate::TrackingAllocator).
///
/// Reports zero growth unless the binary installs the tracking allocator as
/// its `#[global_allocator]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostMemory;

pub(crate) static HOST_MEMORY: HostMemory = HostMemory;

impl MemoryProbe for HostMemory {
    fn snapshot(&self) -> u64 {
        allocator::reset_allocation_counter();
        allocator::live_bytes()
    }

    fn peak(&self) -> u64 {
        allocator::peak_allocation()
    }

    fn allocations(&self) -> u64 {
        allocator::current_allocation().1
    }
}
