//! Result Set Building
//!
//! Turns per-trial executions and their statistics into the `ResultSet`
//! every renderer reads.
//!
//! ## Pipeline
//!
//! ```text
//! TrialExecution + TrialStatistics
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │    TrialRecord      │  status, reason, samples, Measurement
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │     ResultSet       │  indexed by (configuration, function)
//!   └─────────────────────┘
//! ```

use super::execution::{SamplingPolicy, TrialExecution};
use super::statistics::TrialStatistics;
use sweepbench_core::{FunctionDef, Sweep, TrialFailure};
use sweepbench_report::{
    FunctionInfo, Measurement, ResultSet, RunMeta, RunSummary, TrialRecord, TrialStatus,
};

/// Reason recorded for trials cut off by an interrupt
pub const INTERRUPTED_REASON: &str = "interrupted";

/// Build the result set of a run
///
/// `stats` must be index-aligned with `executions`.
pub fn build_result_set(
    sweep: &Sweep,
    functions: &[FunctionDef],
    executions: &[TrialExecution],
    stats: &[TrialStatistics],
    policy: &SamplingPolicy,
    meta: RunMeta,
    total_duration_ms: f64,
) -> ResultSet {
    let mut results = ResultSet::new(
        sweep.clone(),
        functions.iter().map(FunctionInfo::from).collect(),
    );
    let strategy = meta.strategy;
    let mut interrupted = false;

    for (execution, stat) in executions.iter().zip(stats) {
        let Some(result) = &execution.result else {
            interrupted = true;
            results.insert(TrialRecord::skipped(
                execution.configuration,
                execution.function.id,
                strategy,
                INTERRUPTED_REASON,
            ));
            continue;
        };

        let (status, reason) = match (&result.failure, stat.aggregate) {
            (Some(TrialFailure::Setup(reason)), _) => {
                (TrialStatus::SetupFailed, Some(reason.clone()))
            }
            (Some(TrialFailure::Run(reason)), _) => (TrialStatus::RunFailed, Some(reason.clone())),
            (None, Some(_)) => (TrialStatus::Success, None),
            (None, None) => (TrialStatus::RunFailed, Some("no samples".to_string())),
        };

        let measurement = stat
            .aggregate
            .filter(|_| status == TrialStatus::Success)
            .map(|agg| Measurement {
                value: agg.value,
                spread: agg.spread,
                unit: result.strategy.unit(),
                strategy: result.strategy,
                statistic: policy.statistic,
                samples: agg.used,
            });

        results.insert(TrialRecord {
            configuration: execution.configuration,
            function: execution.function.id.to_string(),
            strategy: result.strategy,
            status,
            reason,
            samples: result.values(),
            discarded: result
                .discarded
                .iter()
                .map(|s| s.value(result.strategy))
                .collect(),
            measurement,
            summary: stat.summary.clone(),
        });
    }

    let mut summary = RunSummary::tally(results.records());
    summary.interrupted = interrupted;
    summary.total_duration_ms = total_duration_ms;
    results.summary = Some(summary);
    results.meta = Some(meta);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecutionConfig, build_run_meta, compute_statistics};
    use sweepbench_core::{
        BenchFunction, BenchmarkResult, FunctionError, Preset, Sample, Strategy, SweepOptions,
        TrialContext, generate,
    };

    struct Noop;

    impl BenchFunction for Noop {
        fn setup(&mut self, _ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
            Ok(())
        }

        fn run(&mut self, _ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
            Ok(())
        }
    }

    fn noop() -> Box<dyn BenchFunction> {
        Box::new(Noop)
    }

    fn timed(nanos: &[u64], failure: Option<TrialFailure>) -> BenchmarkResult {
        BenchmarkResult {
            strategy: Strategy::Time,
            samples: nanos
                .iter()
                .map(|&n| Sample {
                    duration_nanos: n,
                    ..Sample::default()
                })
                .collect(),
            discarded: vec![Sample {
                duration_nanos: 9_000_000_000,
                ..Sample::default()
            }],
            failure,
        }
    }

    #[test]
    fn test_records_map_outcomes() {
        let sweep = generate(Preset::Small, &SweepOptions::default());
        let a = FunctionDef::new("a_sum", "sum", "a", noop);
        let b = FunctionDef::new("b_sum", "sum", "b", noop);
        let executions = vec![
            TrialExecution {
                configuration: 0,
                function: a,
                result: Some(timed(&[1_000, 3_000, 2_000], None)),
                duration_ns: 0,
            },
            TrialExecution {
                configuration: 0,
                function: b,
                result: Some(timed(&[], Some(TrialFailure::Setup("no input".to_string())))),
                duration_ns: 0,
            },
            TrialExecution {
                configuration: 1,
                function: a,
                result: None,
                duration_ns: 0,
            },
        ];
        let config = ExecutionConfig::default();
        let stats = compute_statistics(&executions, &config.policy);
        let meta = build_run_meta(&config, Preset::Small, None);

        let results = build_result_set(
            &sweep,
            &[a, b],
            &executions,
            &stats,
            &config.policy,
            meta,
            1.5,
        );

        let ok = results.get(0, "a_sum").unwrap();
        assert_eq!(ok.status, TrialStatus::Success);
        assert!((ok.value().unwrap() - 2.0e-6).abs() < 1e-12);
        assert_eq!(ok.discarded, vec![9.0]);

        let failed = results.get(0, "b_sum").unwrap();
        assert_eq!(failed.status, TrialStatus::SetupFailed);
        assert_eq!(failed.reason.as_deref(), Some("no input"));
        assert!(failed.measurement.is_none());

        let skipped = results.get(1, "a_sum").unwrap();
        assert_eq!(skipped.status, TrialStatus::Skipped);
        assert_eq!(skipped.reason.as_deref(), Some(INTERRUPTED_REASON));

        let summary = results.summary.as_ref().unwrap();
        assert_eq!(summary.total_trials, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.setup_failed, 1);
        assert!(summary.interrupted);
        assert_eq!(summary.total_duration_ms, 1.5);
    }
}
