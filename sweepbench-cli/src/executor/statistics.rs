//! Statistics Computation
//!
//! Runs after the sweep has finished, so parallelism here cannot disturb a
//! measurement. Each trial's samples are reduced independently to:
//! - The central value and spread of the sampling policy
//! - Summary statistics for the JSON report

use super::execution::{SamplingPolicy, TrialExecution};
use rayon::prelude::*;
use sweepbench_stats::{Aggregate, SummaryStatistics, aggregate, compute_summary};

/// Reduced samples of one trial
#[derive(Debug, Clone, Default)]
pub struct TrialStatistics {
    /// Central value; `None` for failed or skipped trials
    pub aggregate: Option<Aggregate>,
    /// Descriptive statistics over the retained samples
    pub summary: Option<SummaryStatistics>,
}

/// Compute statistics for every trial (parallelized with Rayon)
///
/// The output is index-aligned with `executions`.
pub fn compute_statistics(
    executions: &[TrialExecution],
    policy: &SamplingPolicy,
) -> Vec<TrialStatistics> {
    executions
        .par_iter()
        .map(|execution| match &execution.result {
            Some(result) if result.is_success() => {
                let values = result.values();
                TrialStatistics {
                    aggregate: aggregate(&values, policy.statistic, policy.outliers),
                    summary: Some(compute_summary(&values, policy.outliers)),
                }
            }
            _ => TrialStatistics::default(),
        })
        .collect()
}
