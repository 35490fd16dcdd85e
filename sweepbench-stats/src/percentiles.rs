//! Percentile Computation
//!
//! Linear interpolation between nearest ranks. Trials are short (tens of
//! samples), so every call sorts a private copy.

use serde::{Deserialize, Serialize};

/// Quartiles and extremes of a trial's samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    /// 25th percentile
    pub p25: f64,
    /// 50th percentile (median)
    pub p50: f64,
    /// 75th percentile
    pub p75: f64,
    /// 90th percentile
    pub p90: f64,
}

impl Percentiles {
    /// Interquartile range
    pub fn iqr(&self) -> f64 {
        self.p75 - self.p25
    }
}

/// Compute a single percentile from samples
///
/// Uses linear interpolation between nearest ranks. Returns 0 for no samples.
///
/// ```
/// # use sweepbench_stats::compute_percentile;
/// let samples = vec![4.0, 1.0, 3.0, 2.0];
/// assert_eq!(compute_percentile(&samples, 50.0), 2.5);
/// ```
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    match samples {
        [] => 0.0,
        [only] => *only,
        _ => {
            let mut sorted = samples.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            interpolate(&sorted, percentile)
        }
    }
}

fn interpolate(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    let rank = (percentile / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(n - 1);
    let fraction = rank - lower_idx as f64;

    sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
}

/// Compute quartiles and p90 with a single sort
pub fn compute_percentiles(samples: &[f64]) -> Percentiles {
    if samples.len() < 2 {
        let value = samples.first().copied().unwrap_or(0.0);
        return Percentiles {
            p25: value,
            p50: value,
            p75: value,
            p90: value,
        };
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Percentiles {
        p25: interpolate(&sorted, 25.0),
        p50: interpolate(&sorted, 50.0),
        p75: interpolate(&sorted, 75.0),
        p90: interpolate(&sorted, 90.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        let samples = vec![5.0, 1.0, 3.0, 2.0, 4.0];
        assert!((compute_percentile(&samples, 50.0) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quartiles() {
        let samples: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let p = compute_percentiles(&samples);

        assert!((p.p25 - 25.75).abs() < 1e-9);
        assert!((p.p75 - 75.25).abs() < 1e-9);
        assert!((p.iqr() - 49.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(compute_percentile(&[42.0], 90.0), 42.0);
        assert_eq!(compute_percentile(&[], 50.0), 0.0);
        assert_eq!(compute_percentiles(&[7.0]).iqr(), 0.0);
    }

    #[test]
    fn test_out_of_range_percentile_clamps() {
        let samples = vec![1.0, 2.0, 3.0];
        assert_eq!(compute_percentile(&samples, 150.0), 3.0);
        assert_eq!(compute_percentile(&samples, -5.0), 1.0);
    }
}
