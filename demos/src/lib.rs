//! SweepBench Demos
//!
//! Runnable demonstrations of SweepBench. This crate is not published; it
//! hosts a small suite comparing three implementations of one computation.
//!
//! Run it with:
//! ```sh
//! cargo run --example power_sums -p sweepbench-demos --release -- --type depths
//! ```
//!
//! ## The Computation
//!
//! For an input of shape `(batch, stream_length, channels)` and a depth `d`,
//! the power sums are `Σ_t x[b, t, c]^k` for every batch, channel and
//! `k = 1..=d`. Output shape is `(batch, channels, depth)`.
//!
//! | Implementation | Strategy |
//! |----------------|----------|
//! | `naive` | `powi(k)` for every power |
//! | `incremental` | running product, one multiply per power |
//! | `device` | incremental, executed on a simulated asynchronous device |

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::any::Any;
use std::sync::{Arc, Condvar, Mutex};
use sweepbench::prelude::*;

/// Deterministic input of the configuration's shape, values in `[-0.5, 0.5)`
pub fn input(configuration: &Configuration) -> Vec<f64> {
    let (batch, length, channels) = configuration.shape();
    (0..batch * length * channels)
        .map(|i| ((i as u64).wrapping_mul(2_654_435_761) % 1000) as f64 / 1000.0 - 0.5)
        .collect()
}

/// Power sums via `powi`
pub fn power_sums_naive(x: &[f64], configuration: &Configuration, out: &mut [f64]) {
    let (batch, length, channels) = configuration.shape();
    let depth = configuration.depth;
    out.fill(0.0);
    for b in 0..batch {
        for t in 0..length {
            for c in 0..channels {
                let value = x[(b * length + t) * channels + c];
                for k in 0..depth {
                    out[(b * channels + c) * depth + k] += value.powi(k as i32 + 1);
                }
            }
        }
    }
}

/// Power sums via a running product
pub fn power_sums_incremental(x: &[f64], configuration: &Configuration, out: &mut [f64]) {
    let (batch, length, channels) = configuration.shape();
    let depth = configuration.depth;
    out.fill(0.0);
    for b in 0..batch {
        for t in 0..length {
            for c in 0..channels {
                let value = x[(b * length + t) * channels + c];
                let mut power = 1.0;
                let row = &mut out[(b * channels + c) * depth..][..depth];
                for slot in row {
                    power *= value;
                    *slot += power;
                }
            }
        }
    }
}

fn output_len(configuration: &Configuration) -> usize {
    configuration.batch_size * configuration.channels * configuration.depth
}

// ---------------------------------------------------------------------------
// Host implementations
// ---------------------------------------------------------------------------

/// `powi` per power
#[derive(Default)]
pub struct Naive {
    x: Vec<f64>,
    out: Vec<f64>,
}

impl BenchFunction for Naive {
    fn setup(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
        self.x = input(ctx.configuration());
        Ok(())
    }

    fn mem_include(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
        self.out = vec![0.0; output_len(ctx.configuration())];
        Ok(())
    }

    fn run(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
        power_sums_naive(&self.x, ctx.configuration(), &mut self.out);
        std::hint::black_box(&self.out);
        Ok(())
    }
}

/// Running product per power
#[derive(Default)]
pub struct Incremental {
    x: Vec<f64>,
    out: Vec<f64>,
}

impl BenchFunction for Incremental {
    fn setup(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
        self.x = input(ctx.configuration());
        Ok(())
    }

    fn mem_include(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
        self.out = vec![0.0; output_len(ctx.configuration())];
        Ok(())
    }

    fn run(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
        power_sums_incremental(&self.x, ctx.configuration(), &mut self.out);
        std::hint::black_box(&self.out);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Simulated device
// ---------------------------------------------------------------------------

type Job = Box<dyn FnOnce() + Send>;

/// Accelerator stand-in: a worker thread draining a job queue.
///
/// `submit` returns immediately; `synchronize` blocks until every submitted
/// job has run. Buffers allocated through [`ThreadDevice::alloc`] are counted
/// by its memory probe.
pub struct ThreadDevice {
    queue: Mutex<Sender<Job>>,
    pending: Arc<(Mutex<usize>, Condvar)>,
    memory: Arc<DeviceMemory>,
}

/// Byte counters of buffers living on a [`ThreadDevice`]
#[derive(Debug, Default)]
pub struct DeviceMemory {
    live: AtomicU64,
    peak: AtomicU64,
    allocations: AtomicU64,
}

impl MemoryProbe for DeviceMemory {
    fn snapshot(&self) -> u64 {
        let live = self.live.load(Ordering::SeqCst);
        self.peak.store(live, Ordering::SeqCst);
        self.allocations.store(0, Ordering::SeqCst);
        live
    }

    fn peak(&self) -> u64 {
        self.peak.load(Ordering::SeqCst)
    }

    fn allocations(&self) -> u64 {
        self.allocations.load(Ordering::SeqCst)
    }
}

/// Buffer owned by a [`ThreadDevice`]; released on drop
pub struct DeviceBuffer {
    data: Arc<Mutex<Vec<f64>>>,
    bytes: u64,
    memory: Arc<DeviceMemory>,
}

impl DeviceBuffer {
    /// Shared handle for jobs
    pub fn handle(&self) -> Arc<Mutex<Vec<f64>>> {
        Arc::clone(&self.data)
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        self.memory.live.fetch_sub(self.bytes, Ordering::SeqCst);
    }
}

impl ThreadDevice {
    /// Start the worker thread
    pub fn new() -> Self {
        let (queue, jobs) = mpsc::channel::<Job>();
        let pending = Arc::new((Mutex::new(0usize), Condvar::new()));
        let worker_pending = Arc::clone(&pending);
        std::thread::spawn(move || {
            for job in jobs {
                job();
                let (count, done) = &*worker_pending;
                if let Ok(mut count) = count.lock() {
                    *count = count.saturating_sub(1);
                }
                done.notify_all();
            }
        });
        Self {
            queue: Mutex::new(queue),
            pending,
            memory: Arc::new(DeviceMemory::default()),
        }
    }

    /// Queue `job` and return without waiting
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<(), DeviceError> {
        let (count, _) = &*self.pending;
        *count
            .lock()
            .map_err(|e| DeviceError::Other(e.to_string()))? += 1;
        self.queue
            .lock()
            .map_err(|e| DeviceError::Other(e.to_string()))?
            .send(Box::new(job))
            .map_err(|_| DeviceError::Other("device worker stopped".to_string()))
    }

    /// Allocate a zeroed buffer of `len` values on the device
    pub fn alloc(&self, len: usize) -> DeviceBuffer {
        let bytes = (len * std::mem::size_of::<f64>()) as u64;
        let live = self.memory.live.fetch_add(bytes, Ordering::SeqCst) + bytes;
        self.memory.peak.fetch_max(live, Ordering::SeqCst);
        self.memory.allocations.fetch_add(1, Ordering::SeqCst);
        DeviceBuffer {
            data: Arc::new(Mutex::new(vec![0.0; len])),
            bytes,
            memory: Arc::clone(&self.memory),
        }
    }
}

impl Default for ThreadDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for ThreadDevice {
    fn name(&self) -> &str {
        "thread-device"
    }

    fn synchronize(&self) -> Result<(), DeviceError> {
        let (count, done) = &*self.pending;
        let mut pending = count
            .lock()
            .map_err(|e| DeviceError::Synchronize(e.to_string()))?;
        while *pending > 0 {
            pending = done
                .wait(pending)
                .map_err(|e| DeviceError::Synchronize(e.to_string()))?;
        }
        Ok(())
    }

    fn memory_probe(&self) -> Option<&dyn MemoryProbe> {
        Some(&*self.memory)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

/// Incremental power sums executed on the injected [`ThreadDevice`]
#[derive(Default)]
pub struct OnDevice {
    x: Option<DeviceBuffer>,
    out: Option<DeviceBuffer>,
}

impl BenchFunction for OnDevice {
    fn setup(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
        let device = ctx.device_as::<ThreadDevice>()?;
        let host = input(ctx.configuration());
        let x = device.alloc(host.len());
        let target = x.handle();
        device.submit(move || {
            if let Ok(mut data) = target.lock() {
                data.copy_from_slice(&host);
            }
        })?;
        device.synchronize()?;
        self.x = Some(x);
        Ok(())
    }

    fn mem_include(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
        let device = ctx.device_as::<ThreadDevice>()?;
        self.out = Some(device.alloc(output_len(ctx.configuration())));
        Ok(())
    }

    fn run(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
        let (Some(x), Some(out)) = (&self.x, &self.out) else {
            return Err(FunctionError::msg("device buffers not allocated"));
        };
        let (x, out) = (x.handle(), out.handle());
        let configuration = ctx.configuration().clone();
        ctx.device_as::<ThreadDevice>()?.submit(move || {
            if let (Ok(x), Ok(mut out)) = (x.lock(), out.lock()) {
                power_sums_incremental(&x, &configuration, &mut out);
            }
        })?;
        Ok(())
    }
}

/// Factory for [`Naive`]
pub fn naive() -> Box<dyn BenchFunction> {
    Box::new(Naive::default())
}

/// Factory for [`Incremental`]
pub fn incremental() -> Box<dyn BenchFunction> {
    Box::new(Incremental::default())
}

/// Factory for [`OnDevice`]
pub fn on_device() -> Box<dyn BenchFunction> {
    Box::new(OnDevice::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepbench::{Preset, SweepOptions, generate};

    #[test]
    fn test_implementations_agree() {
        for configuration in generate(Preset::Small, &SweepOptions::default()).configurations {
            let x = input(&configuration);
            let mut naive = vec![0.0; output_len(&configuration)];
            let mut incremental = naive.clone();
            power_sums_naive(&x, &configuration, &mut naive);
            power_sums_incremental(&x, &configuration, &mut incremental);
            for (a, b) in naive.iter().zip(&incremental) {
                assert!((a - b).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_device_runs_queued_work_before_sync_returns() {
        let device = ThreadDevice::new();
        let done = Arc::new(AtomicU64::new(0));
        let flag = Arc::clone(&done);
        device
            .submit(move || {
                std::thread::sleep(std::time::Duration::from_millis(20));
                flag.store(1, Ordering::SeqCst);
            })
            .unwrap();
        device.synchronize().unwrap();
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_device_memory_probe_counts_buffers() {
        let device = ThreadDevice::new();
        let baseline = device.memory.snapshot();
        let buffer = device.alloc(128);
        assert_eq!(device.memory.peak() - baseline, 128 * 8);
        assert_eq!(device.memory.allocations(), 1);
        drop(buffer);
        assert_eq!(device.memory.snapshot(), baseline);
    }

    #[test]
    fn test_on_device_uses_injected_device() {
        let sweep = generate(Preset::Small, &SweepOptions::default());
        let configuration = &sweep.configurations[0];
        let device = ThreadDevice::new();
        let ctx = TrialContext::new(configuration, Some(&device), true);

        let mut function = OnDevice::default();
        function.setup(&ctx).unwrap();
        function.mem_include(&ctx).unwrap();
        function.run(&ctx).unwrap();
        ctx.synchronize().unwrap();

        let expected_bytes = (input(configuration).len() + output_len(configuration)) * 8;
        assert_eq!(device.memory.snapshot(), expected_bytes as u64);

        let x = input(configuration);
        let mut expected = vec![0.0; output_len(configuration)];
        power_sums_incremental(&x, configuration, &mut expected);
        let out = function.out.as_ref().unwrap().handle();
        assert_eq!(*out.lock().unwrap(), expected);
    }

    #[test]
    fn test_on_device_without_device_fails_setup() {
        let sweep = generate(Preset::Small, &SweepOptions::default());
        let ctx = TrialContext::new(&sweep.configurations[0], None, true);
        let mut function = OnDevice::default();
        assert!(matches!(function.setup(&ctx), Err(FunctionError::NoDevice)));
    }
}
