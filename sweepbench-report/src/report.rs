//! Report Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sweepbench_core::{FunctionDef, Preset, Strategy, Unit};
use sweepbench_stats::{CentralStatistic, OutlierMethod, SummaryStatistics};

/// Outcome of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    /// Measured
    Success,
    /// `setup` failed; nothing was measured
    SetupFailed,
    /// `mem_include`, `run` or the barrier failed
    RunFailed,
    /// Never started (interrupted run)
    Skipped,
}

impl TrialStatus {
    /// Short label used in table cells
    pub fn label(self) -> &'static str {
        match self {
            TrialStatus::Success => "ok",
            TrialStatus::SetupFailed => "setup failed",
            TrialStatus::RunFailed => "run failed",
            TrialStatus::Skipped => "skipped",
        }
    }
}

/// Aggregated value of a successful trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Central value in `unit`
    pub value: f64,
    /// IQR (median) or standard deviation (mean)
    pub spread: f64,
    /// Seconds or bytes
    pub unit: Unit,
    /// Strategy the samples came from
    pub strategy: Strategy,
    /// Statistic `value` was computed with
    pub statistic: CentralStatistic,
    /// Samples that contributed
    pub samples: usize,
}

/// Registered function as recorded in the result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    /// Unique identifier
    pub id: String,
    /// Computation being compared
    pub group: String,
    /// Library label
    pub implementation: String,
    /// Device-backed
    pub device: bool,
}

impl From<&FunctionDef> for FunctionInfo {
    fn from(def: &FunctionDef) -> Self {
        Self {
            id: def.id.to_string(),
            group: def.group.to_string(),
            implementation: def.implementation.to_string(),
            device: def.device,
        }
    }
}

/// One (configuration, function) trial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Index into the sweep's configurations
    pub configuration: usize,
    /// Function id
    pub function: String,
    /// Strategy the trial ran with
    pub strategy: Strategy,
    /// Outcome
    pub status: TrialStatus,
    /// Failure or skip reason
    pub reason: Option<String>,
    /// Retained raw samples, in the strategy's unit
    pub samples: Vec<f64>,
    /// Warm-up samples excluded from statistics
    pub discarded: Vec<f64>,
    /// Aggregated value; present only on success
    pub measurement: Option<Measurement>,
    /// Descriptive statistics over `samples`
    pub summary: Option<SummaryStatistics>,
}

impl TrialRecord {
    /// Record for a trial that never ran
    pub fn skipped(configuration: usize, function: &str, strategy: Strategy, reason: &str) -> Self {
        Self {
            configuration,
            function: function.to_string(),
            strategy,
            status: TrialStatus::Skipped,
            reason: Some(reason.to_string()),
            samples: Vec::new(),
            discarded: Vec::new(),
            measurement: None,
            summary: None,
        }
    }

    /// The measured value, if the trial succeeded
    pub fn value(&self) -> Option<f64> {
        match self.status {
            TrialStatus::Success => self.measurement.map(|m| m.value),
            _ => None,
        }
    }
}

/// Run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    /// Bumped when the JSON layout changes
    pub schema_version: u32,
    /// Harness version
    pub version: String,
    /// Start of the run
    pub timestamp: DateTime<Utc>,
    /// Git commit of the working tree
    pub git_commit: Option<String>,
    /// Git branch of the working tree
    pub git_branch: Option<String>,
    /// Host description
    pub system: SystemInfo,
    /// Injected device, if any
    pub device: Option<String>,
    /// Sweep preset
    pub preset: Preset,
    /// Measurement strategy
    pub strategy: Strategy,
    /// Sampling policy in effect
    pub policy: PolicyMeta,
}

/// Sampling policy captured in the metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyMeta {
    /// Retained timed repetitions per trial
    pub repetitions: usize,
    /// Discarded repetitions for device functions
    pub device_warmup: usize,
    /// Discarded repetitions for host functions
    pub host_warmup: usize,
    /// Central statistic
    pub statistic: CentralStatistic,
    /// Outlier rejection
    pub outliers: OutlierMethod,
}

/// System information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system
    pub os: String,
    /// Kernel or OS version
    pub os_version: String,
    /// CPU model
    pub cpu: String,
    /// Logical cores
    pub cpu_cores: u32,
    /// Installed memory
    pub memory_gb: f64,
}

/// Counts over every trial of the run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Trials planned
    pub total_trials: usize,
    /// Measured
    pub succeeded: usize,
    /// `setup` failures
    pub setup_failed: usize,
    /// `run` failures and panics
    pub run_failed: usize,
    /// Not started
    pub skipped: usize,
    /// Whether the run was interrupted
    pub interrupted: bool,
    /// Wall time of the whole sweep
    pub total_duration_ms: f64,
}

impl RunSummary {
    /// Tally trial statuses
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a TrialRecord>) -> Self {
        let mut summary = RunSummary::default();
        for record in records {
            summary.total_trials += 1;
            match record.status {
                TrialStatus::Success => summary.succeeded += 1,
                TrialStatus::SetupFailed => summary.setup_failed += 1,
                TrialStatus::RunFailed => summary.run_failed += 1,
                TrialStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    /// Trials that did not produce a measurement
    pub fn failed(&self) -> usize {
        self.setup_failed + self.run_failed
    }
}
