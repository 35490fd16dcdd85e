//! Sweep Execution
//!
//! Runs every (configuration, function) pair of a plan, one at a time, on
//! the calling thread. Trials never overlap: concurrent trials would share
//! CPU and device time and corrupt each other's numbers.
//!
//! ## Data Flow
//!
//! ```text
//! Sweep × ExecutionPlan
//!        │
//!        ▼
//!   ExecutionConfig (strategy + SamplingPolicy)
//!        │
//!        ▼
//! ┌──────────────────┐
//! │  Executor        │  setup → [warm-up] → measured runs → barrier
//! └────────┬─────────┘
//!          │
//!          ▼
//!  TrialExecution (samples or failure, per pair)
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use sweepbench_core::{
    BenchmarkResult, Device, FunctionDef, Strategy, Sweep, SweepError, TrialContext, TrialFailure,
    pin_to_cpu, run_trial,
};
use sweepbench_stats::{CentralStatistic, OutlierMethod};
use tracing::{debug, warn};

/// How many samples a trial takes and how they are reduced
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingPolicy {
    /// Retained timed repetitions
    pub repetitions: usize,
    /// Discarded leading repetitions for device-backed functions
    pub device_warmup: usize,
    /// Discarded leading repetitions for host functions
    pub host_warmup: usize,
    /// Central statistic
    pub statistic: CentralStatistic,
    /// Outlier rejection before the central statistic
    pub outliers: OutlierMethod,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            repetitions: 20,
            device_warmup: 1,
            host_warmup: 0,
            statistic: CentralStatistic::Median,
            outliers: OutlierMethod::None,
        }
    }
}

impl SamplingPolicy {
    /// Warm-up repetitions for one function
    pub fn warmup_for(&self, function: &FunctionDef) -> usize {
        if function.device {
            self.device_warmup
        } else {
            self.host_warmup
        }
    }

    /// Reject policies that cannot produce a measurement
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.repetitions == 0 {
            return Err(SweepError::config("repetitions must be at least 1"));
        }
        if let OutlierMethod::Iqr { k } = self.outliers {
            if !(k.is_finite() && k > 0.0) {
                return Err(SweepError::config(format!(
                    "IQR outlier multiplier must be positive, got {}",
                    k
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for sweep execution
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Strategy for every trial of the run
    pub strategy: Strategy,
    /// Sampling policy
    pub policy: SamplingPolicy,
    /// Pin the measuring thread to this CPU
    pub pin_cpu: Option<usize>,
    /// Draw a progress bar
    pub show_progress: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Time,
            policy: SamplingPolicy::default(),
            pin_cpu: None,
            show_progress: true,
        }
    }
}

/// Result from executing a single trial
#[derive(Debug)]
pub struct TrialExecution {
    /// Configuration index
    pub configuration: usize,
    /// Function under test
    pub function: FunctionDef,
    /// Samples or failure; `None` when the trial never started
    pub result: Option<BenchmarkResult>,
    /// Wall time including setup
    pub duration_ns: u64,
}

/// Execute a sweep and produce per-trial results
pub struct Executor<'a> {
    config: ExecutionConfig,
    device: Option<&'a dyn Device>,
    stop: Option<&'a AtomicBool>,
}

impl<'a> Executor<'a> {
    /// Executor with no device and no interrupt flag
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            config,
            device: None,
            stop: None,
        }
    }

    /// Use `device` for every device-backed function
    pub fn with_device(mut self, device: Option<&'a dyn Device>) -> Self {
        self.device = device;
        self
    }

    /// Stop starting new trials once `flag` is set
    pub fn with_stop_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.stop = Some(flag);
        self
    }

    fn interrupted(&self) -> bool {
        self.stop.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Execute every pair, configuration-major, in sweep and plan order
    pub fn execute(&self, sweep: &Sweep, functions: &[FunctionDef]) -> Vec<TrialExecution> {
        let total = sweep.len() * functions.len();
        let pb = if self.config.show_progress {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        if let Some(cpu) = self.config.pin_cpu {
            if let Err(e) = pin_to_cpu(cpu) {
                warn!("Could not pin to CPU {}: {}", cpu, e);
            }
        }

        let mut executions = Vec::with_capacity(total);
        for (index, configuration) in sweep.configurations.iter().enumerate() {
            for function in functions {
                if self.interrupted() {
                    executions.push(TrialExecution {
                        configuration: index,
                        function: *function,
                        result: None,
                        duration_ns: 0,
                    });
                    continue;
                }

                pb.set_message(format!("{} @ {}", function.id, configuration.label));
                let ctx = TrialContext::new(configuration, self.device, function.device);
                executions.push(self.execute_single(index, function, &ctx));
                pb.inc(1);
            }
        }

        if self.interrupted() {
            pb.abandon_with_message("Interrupted");
        } else {
            pb.finish_with_message("Complete");
        }
        executions
    }

    /// Execute a single trial with a fresh instance
    fn execute_single(
        &self,
        index: usize,
        function: &FunctionDef,
        ctx: &TrialContext<'_>,
    ) -> TrialExecution {
        let start = Instant::now();
        let mut instance = function.instantiate();
        let result = run_trial(
            instance.as_mut(),
            ctx,
            self.config.strategy,
            self.config.policy.warmup_for(function),
            self.config.policy.repetitions,
        );
        drop(instance);
        let duration_ns = start.elapsed().as_nanos() as u64;

        match &result.failure {
            None => debug!(
                "{} @ {}: {} samples ({} discarded)",
                function.id,
                ctx.configuration().label,
                result.samples.len(),
                result.discarded.len()
            ),
            Some(TrialFailure::Setup(reason)) => warn!(
                "{} @ {}: setup failed: {}",
                function.id,
                ctx.configuration().label,
                reason
            ),
            Some(TrialFailure::Run(reason)) => warn!(
                "{} @ {}: run failed: {}",
                function.id,
                ctx.configuration().label,
                reason
            ),
        }

        TrialExecution {
            configuration: index,
            function: *function,
            result: Some(result),
            duration_ns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use sweepbench_core::{BenchFunction, FunctionError, Preset, SweepOptions, generate};

    static SETUPS: AtomicUsize = AtomicUsize::new(0);

    struct Counting;

    impl BenchFunction for Counting {
        fn setup(&mut self, _ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
            SETUPS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn run(&mut self, _ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
            Ok(())
        }
    }

    fn counting() -> Box<dyn BenchFunction> {
        Box::new(Counting)
    }

    fn config(repetitions: usize) -> ExecutionConfig {
        ExecutionConfig {
            policy: SamplingPolicy {
                repetitions,
                ..SamplingPolicy::default()
            },
            show_progress: false,
            ..ExecutionConfig::default()
        }
    }

    #[test]
    fn test_every_pair_runs_in_order() {
        let sweep = generate(Preset::Small, &SweepOptions::default());
        let functions = [
            FunctionDef::new("a", "g", "a", counting),
            FunctionDef::new("b", "g", "b", counting),
        ];

        let before = SETUPS.load(Ordering::SeqCst);
        let executions = Executor::new(config(3)).execute(&sweep, &functions);

        assert_eq!(executions.len(), sweep.len() * 2);
        assert_eq!(SETUPS.load(Ordering::SeqCst) - before, sweep.len() * 2);
        let order: Vec<_> = executions
            .iter()
            .map(|e| (e.configuration, e.function.id))
            .collect();
        assert_eq!(order[0], (0, "a"));
        assert_eq!(order[1], (0, "b"));
        assert_eq!(order[2], (1, "a"));
        assert!(executions
            .iter()
            .all(|e| e.result.as_ref().is_some_and(|r| r.samples.len() == 3)));
    }

    #[test]
    fn test_stop_flag_skips_remaining() {
        let sweep = generate(Preset::Small, &SweepOptions::default());
        let functions = [FunctionDef::new("a", "g", "a", counting)];
        let stop = AtomicBool::new(true);

        let executions = Executor::new(config(1))
            .with_stop_flag(&stop)
            .execute(&sweep, &functions);

        assert_eq!(executions.len(), sweep.len());
        assert!(executions.iter().all(|e| e.result.is_none()));
    }

    #[test]
    fn test_policy_validation() {
        assert!(SamplingPolicy::default().validate().is_ok());
        let zero = SamplingPolicy {
            repetitions: 0,
            ..SamplingPolicy::default()
        };
        assert!(zero.validate().is_err());
        let bad_k = SamplingPolicy {
            outliers: OutlierMethod::Iqr { k: -1.0 },
            ..SamplingPolicy::default()
        };
        assert!(bad_k.validate().is_err());
    }

    #[test]
    fn test_warmup_depends_on_device() {
        let policy = SamplingPolicy::default();
        let host = FunctionDef::new("h", "g", "h", counting);
        assert_eq!(policy.warmup_for(&host), 0);
        assert_eq!(policy.warmup_for(&host.on_device()), 1);
    }
}
