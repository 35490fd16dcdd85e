#![warn(missing_docs)]
//! SweepBench Core - Trial Runtime
//!
//! This crate provides the pieces every trial is built from:
//! - `BenchFunction` contract and the static function registry
//! - Sweep presets producing ordered configurations
//! - `Bencher` trial runner for the time and memory strategies
//! - `Device` and `MemoryProbe` contracts for accelerator-backed functions
//! - Global allocator interceptor for host memory tracking

mod allocator;
mod bencher;
mod device;
mod error;
mod function;
mod measure;
mod registry;
mod sweep;

pub use allocator::{
    TrackingAllocator, current_allocation, is_tracking, live_bytes, peak_allocation,
    reset_allocation_counter,
};
pub use bencher::{Bencher, BenchmarkResult, Sample, Strategy, TrialFailure, Unit, run_trial};
pub use device::{Device, HostMemory, MemoryProbe};
pub use error::{DeviceError, FunctionError, SweepError};
pub use function::{BenchFunction, TrialContext};
pub use measure::{Instant, Timer, pin_to_cpu};
pub use registry::Registry;
pub use sweep::{Configuration, Preset, Sweep, SweepAxis, SweepOptions, generate};

/// Optional external library a function depends on
#[derive(Debug, Clone, Copy)]
pub struct Requirement {
    /// Library name, shown when it is missing
    pub library: &'static str,
    /// Availability check, run once while planning
    pub available: fn() -> bool,
}

/// Registered candidate implementation
#[derive(Debug, Clone, Copy)]
pub struct FunctionDef {
    /// Unique identifier
    pub id: &'static str,
    /// Computation being compared (e.g. `signature_forward`)
    pub group: &'static str,
    /// Library label (e.g. `signatory`); ratios pair functions by this label
    pub implementation: &'static str,
    /// Runs on the injected device and needs the synchronization barrier
    pub device: bool,
    /// Excluded by `--no-slow`
    pub slow: bool,
    /// External dependency, if any
    pub requires: Option<Requirement>,
    /// Builds a fresh instance for each trial
    pub factory: fn() -> Box<dyn BenchFunction>,
}

impl FunctionDef {
    /// Host function with no flags
    pub const fn new(
        id: &'static str,
        group: &'static str,
        implementation: &'static str,
        factory: fn() -> Box<dyn BenchFunction>,
    ) -> Self {
        Self {
            id,
            group,
            implementation,
            device: false,
            slow: false,
            requires: None,
            factory,
        }
    }

    /// Mark as device-backed
    pub const fn on_device(mut self) -> Self {
        self.device = true;
        self
    }

    /// Mark as slow
    pub const fn slow(mut self) -> Self {
        self.slow = true;
        self
    }

    /// Depend on an external library
    pub const fn requires(mut self, library: &'static str, available: fn() -> bool) -> Self {
        self.requires = Some(Requirement { library, available });
        self
    }

    /// Build a fresh instance
    pub fn instantiate(&self) -> Box<dyn BenchFunction> {
        (self.factory)()
    }
}

// Collect all registered functions
inventory::collect!(FunctionDef);

/// Anchor to prevent LTO from stripping inventory entries
#[used]
#[doc(hidden)]
pub static REGISTRY_ANCHOR: fn() = || {
    for _ in inventory::iter::<FunctionDef> {}
};

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}

/// Submit a [`FunctionDef`] to the static registry.
///
/// ```ignore
/// sweepbench::register!(FunctionDef::new("naive_sum", "power_sum", "naive", || Box::new(Naive::default())));
/// ```
#[macro_export]
macro_rules! register {
    ($def:expr) => {
        $crate::__private::inventory::submit! { $def }
    };
}
