//! Bencher - Trial Runner
//!
//! Runs one function against one configuration under one [`Strategy`].
//! Setup happens before the first timer start; the device barrier happens
//! after `run` returns and before the timer stops or the probe is read.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::{Deserialize, Serialize};

use crate::error::FunctionError;
use crate::function::{BenchFunction, TrialContext};
use crate::measure::Timer;

/// What a trial measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Wall-clock duration of `run`, repeated
    Time,
    /// Peak allocation growth of one `run`
    Memory,
}

impl Strategy {
    /// Unit of the values this strategy produces
    pub fn unit(self) -> Unit {
        match self {
            Strategy::Time => Unit::Seconds,
            Strategy::Memory => Unit::Bytes,
        }
    }

    /// Lowercase strategy name
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Time => "time",
            Strategy::Memory => "memory",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "time" => Ok(Strategy::Time),
            "memory" | "mem" => Ok(Strategy::Memory),
            other => Err(format!("Unknown measurement mode: {}", other)),
        }
    }
}

/// Measurement unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Seconds (time strategy)
    Seconds,
    /// Bytes (memory strategy)
    Bytes,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Seconds => f.write_str("s"),
            Unit::Bytes => f.write_str("B"),
        }
    }
}

/// One raw observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Duration of the timed window (time strategy)
    pub duration_nanos: u64,
    /// Peak growth over the baseline (memory strategy)
    pub peak_bytes: u64,
    /// Allocations inside the window, when the probe reports them
    pub alloc_count: u64,
}

impl Sample {
    /// The sample expressed in the strategy's unit
    #[inline]
    pub fn value(&self, strategy: Strategy) -> f64 {
        match strategy {
            Strategy::Time => self.duration_nanos as f64 / 1e9,
            Strategy::Memory => self.peak_bytes as f64,
        }
    }
}

/// Why a trial produced no measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialFailure {
    /// `setup` failed or panicked
    Setup(String),
    /// `mem_include`, `run` or the barrier failed or panicked
    Run(String),
}

/// Result of a single trial
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    /// Strategy every sample was taken with
    pub strategy: Strategy,
    /// Retained samples, in order
    pub samples: Vec<Sample>,
    /// Warm-up samples excluded from statistics
    pub discarded: Vec<Sample>,
    /// Set when the trial stopped early
    pub failure: Option<TrialFailure>,
}

impl BenchmarkResult {
    /// Retained samples in the strategy's unit
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value(self.strategy)).collect()
    }

    /// Whether the trial completed
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Collects the samples of one trial.
///
/// The first `warmup` samples go to the discard list; everything after is
/// retained until `repetitions` samples exist.
pub struct Bencher {
    strategy: Strategy,
    warmup: usize,
    target_samples: usize,
    samples: Vec<Sample>,
    discarded: Vec<Sample>,
}

impl Bencher {
    /// Create a bencher. At least one sample is always retained.
    pub fn new(strategy: Strategy, warmup: usize, repetitions: usize) -> Self {
        let (warmup, target_samples) = match strategy {
            Strategy::Time => (warmup, repetitions.max(1)),
            Strategy::Memory => (0, 1),
        };
        // Preallocated so the window never grows these vectors
        Self {
            strategy,
            warmup,
            target_samples,
            samples: Vec::with_capacity(target_samples),
            discarded: Vec::with_capacity(warmup),
        }
    }

    /// Whether the next sample will be discarded
    pub fn is_warmup(&self) -> bool {
        self.discarded.len() < self.warmup
    }

    /// Check if we've collected enough samples
    pub fn has_enough_samples(&self) -> bool {
        self.samples.len() >= self.target_samples
    }

    /// Get collected samples
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    fn record(&mut self, sample: Sample) {
        if self.is_warmup() {
            self.discarded.push(sample);
        } else {
            self.samples.push(sample);
        }
    }

    /// Time one call of `run`, barrier included.
    #[inline]
    pub fn iter_timed(
        &mut self,
        function: &mut dyn BenchFunction,
        ctx: &TrialContext<'_>,
    ) -> Result<(), FunctionError> {
        let timer = Timer::start();
        guarded(|| {
            function.run(ctx)?;
            ctx.synchronize()?;
            Ok(())
        })?;
        let duration_nanos = timer.stop();

        self.record(Sample {
            duration_nanos,
            ..Sample::default()
        });
        Ok(())
    }

    /// Measure peak memory growth of `mem_include` followed by one `run`.
    pub fn iter_memory(
        &mut self,
        function: &mut dyn BenchFunction,
        ctx: &TrialContext<'_>,
    ) -> Result<(), FunctionError> {
        let probe = ctx.memory_probe();
        let baseline = probe.snapshot();
        guarded(|| {
            function.mem_include(ctx)?;
            function.run(ctx)?;
            ctx.synchronize()?;
            Ok(())
        })?;
        let peak = probe.peak();
        let alloc_count = probe.allocations();

        self.record(Sample {
            duration_nanos: 0,
            peak_bytes: peak.saturating_sub(baseline),
            alloc_count,
        });
        Ok(())
    }

    /// Finalize and return results
    pub fn finish(self, failure: Option<TrialFailure>) -> BenchmarkResult {
        BenchmarkResult {
            strategy: self.strategy,
            samples: self.samples,
            discarded: self.discarded,
            failure,
        }
    }
}

/// Run one trial: `setup`, then the strategy's measured calls.
///
/// Errors and panics from any hook end the trial and are reported in
/// [`BenchmarkResult::failure`]; they never propagate to the caller.
pub fn run_trial(
    function: &mut dyn BenchFunction,
    ctx: &TrialContext<'_>,
    strategy: Strategy,
    warmup: usize,
    repetitions: usize,
) -> BenchmarkResult {
    let mut bencher = Bencher::new(strategy, warmup, repetitions);

    if let Err(e) = guarded(|| function.setup(ctx)) {
        return bencher.finish(Some(TrialFailure::Setup(e.to_string())));
    }

    let outcome = match strategy {
        Strategy::Memory => bencher.iter_memory(function, ctx),
        Strategy::Time => guarded(|| function.mem_include(ctx)).and_then(|()| {
            while !bencher.has_enough_samples() {
                bencher.iter_timed(function, ctx)?;
            }
            Ok(())
        }),
    };

    match outcome {
        Ok(()) => bencher.finish(None),
        Err(e) => bencher.finish(Some(TrialFailure::Run(e.to_string()))),
    }
}

/// Call a hook, turning a panic into [`FunctionError::Panicked`].
fn guarded<F>(f: F) -> Result<(), FunctionError>
where
    F: FnOnce() -> Result<(), FunctionError>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic) => {
            let message = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            Err(FunctionError::Panicked(message))
        }
    }
}
