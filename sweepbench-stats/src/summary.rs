//! Summary Statistics
//!
//! Descriptive numbers kept alongside each measurement in the JSON report:
//! - Mean, median, stddev from the cleaned samples
//! - Min, max from all samples

use serde::{Deserialize, Serialize};

use crate::outliers::{OutlierMethod, detect_outliers};
use crate::percentiles::compute_percentile;

/// Summary of one trial's samples
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Mean of the cleaned samples
    pub mean: f64,
    /// Median of the cleaned samples
    pub median: f64,
    /// Sample standard deviation of the cleaned samples
    pub std_dev: f64,
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
    /// Number of samples before rejection
    pub sample_count: usize,
    /// Number of rejected samples
    pub outlier_count: usize,
}

impl SummaryStatistics {
    /// Coefficient of variation in percent
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean) * 100.0
        }
    }
}

/// Mean and sample standard deviation
pub(crate) fn mean_std(samples: &[f64]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    if samples.len() < 2 {
        return (mean, 0.0);
    }
    let variance =
        samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
    (mean, variance.sqrt())
}

/// Compute summary statistics
pub fn compute_summary(samples: &[f64], outlier_method: OutlierMethod) -> SummaryStatistics {
    if samples.is_empty() {
        return SummaryStatistics::default();
    }

    let analysis = detect_outliers(samples, outlier_method);
    let cleaned = &analysis.cleaned_samples;
    let (mean, std_dev) = mean_std(cleaned);

    SummaryStatistics {
        mean,
        median: compute_percentile(cleaned, 50.0),
        std_dev,
        min: samples.iter().copied().fold(f64::INFINITY, f64::min),
        max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        sample_count: samples.len(),
        outlier_count: analysis.outlier_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_summary() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let summary = compute_summary(&samples, OutlierMethod::None);

        assert!((summary.mean - 3.0).abs() < 1e-9);
        assert!((summary.median - 3.0).abs() < 1e-9);
        assert!((summary.std_dev - 2.5_f64.sqrt()).abs() < 1e-9);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert_eq!(summary.sample_count, 5);
    }

    #[test]
    fn test_outlier_handling() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let summary = compute_summary(&samples, OutlierMethod::Iqr { k: 1.5 });

        assert!(summary.mean < 10.0);
        // Extremes keep the outlier
        assert_eq!(summary.max, 100.0);
        assert_eq!(summary.outlier_count, 1);
    }

    #[test]
    fn test_empty_samples() {
        let summary = compute_summary(&[], OutlierMethod::None);
        assert_eq!(summary.sample_count, 0);
        assert_eq!(summary.coefficient_of_variation(), 0.0);
    }
}
