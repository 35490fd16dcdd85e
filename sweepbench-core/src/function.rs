//! Function Contract
//!
//! Every candidate implementation is a [`BenchFunction`]. The harness owns the
//! call order:
//!
//! ```text
//! setup ──► (memory mode) snapshot ─► mem_include ─► run ─► barrier ─► peak
//!       └─► (time mode)   mem_include ─► [timer ─► run ─► barrier ─► stop] × N
//! ```
//!
//! A fresh instance is built from the registered factory for every trial, so
//! state never leaks from one configuration to the next.

use crate::device::{Device, HOST_MEMORY, MemoryProbe};
use crate::error::{DeviceError, FunctionError};
use crate::sweep::Configuration;
use std::any::{Any, type_name};

/// Hooks implemented once per candidate library.
pub trait BenchFunction {
    /// Prepare inputs for this configuration. Called once per trial and never measured.
    fn setup(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError>;

    /// Work that belongs to the memory measurement but is not the repeated unit.
    ///
    /// In memory mode this runs after the baseline snapshot and before `run`.
    /// In time mode it runs once, untimed, after `setup`.
    fn mem_include(&mut self, _ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
        Ok(())
    }

    /// The measured unit of work. Must be repeatable.
    ///
    /// Device-backed implementations issue their work and return; the harness
    /// waits for completion before stopping the clock.
    fn run(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError>;
}

/// Per-trial view handed to every hook.
#[derive(Clone, Copy)]
pub struct TrialContext<'a> {
    configuration: &'a Configuration,
    device: Option<&'a dyn Device>,
    device_backed: bool,
}

impl<'a> TrialContext<'a> {
    /// Build the context for one (configuration, function) pair
    pub fn new(
        configuration: &'a Configuration,
        device: Option<&'a dyn Device>,
        device_backed: bool,
    ) -> Self {
        Self {
            configuration,
            device,
            device_backed,
        }
    }

    /// The configuration being measured
    pub fn configuration(&self) -> &'a Configuration {
        self.configuration
    }

    /// The device selected for the run, if any
    pub fn device(&self) -> Option<&'a dyn Device> {
        self.device
    }

    /// The device, or [`FunctionError::NoDevice`]
    pub fn require_device(&self) -> Result<&'a dyn Device, FunctionError> {
        self.device.ok_or(FunctionError::NoDevice)
    }

    /// The injected device as its concrete type.
    ///
    /// Fails with [`FunctionError::NoDevice`] when no device was injected, and
    /// with [`FunctionError::Failed`] when the device is of another type or
    /// does not expose itself through [`Device::as_any`].
    pub fn device_as<T: Any>(&self) -> Result<&'a T, FunctionError> {
        let device = self.require_device()?;
        device
            .as_any()
            .and_then(|any| any.downcast_ref::<T>())
            .ok_or_else(|| {
                FunctionError::msg(format!(
                    "device `{}` is not a `{}`",
                    device.name(),
                    type_name::<T>()
                ))
            })
    }

    /// Whether the function under test runs on the device
    pub fn is_device_backed(&self) -> bool {
        self.device_backed
    }

    /// Block until queued device work is complete.
    ///
    /// No-op for host functions.
    #[inline]
    pub fn synchronize(&self) -> Result<(), DeviceError> {
        match (self.device_backed, self.device) {
            (true, Some(device)) => device.synchronize(),
            _ => Ok(()),
        }
    }

    /// Probe used for memory measurement: the device's own when the function
    /// is device-backed and the device provides one, host allocations otherwise.
    pub fn memory_probe(&self) -> &'a dyn MemoryProbe {
        if self.device_backed {
            if let Some(probe) = self.device.and_then(|d| d.memory_probe()) {
                return probe;
            }
        }
        &HOST_MEMORY
    }
}

impl std::fmt::Debug for TrialContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrialContext")
            .field("configuration", self.configuration)
            .field("device", &self.device.map(|d| d.name()))
            .field("device_backed", &self.device_backed)
            .finish()
    }
}
