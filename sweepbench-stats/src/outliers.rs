//! Outlier Detection
//!
//! IQR (Interquartile Range) fences. Rejection only affects the central
//! value and spread; the summary's min and max always see every sample.

use serde::{Deserialize, Serialize};

use crate::percentiles::compute_percentiles;

/// Method for outlier detection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Outliers are outside `[Q1 - k*IQR, Q3 + k*IQR]`
    Iqr {
        /// Fence multiplier (1.5 is the usual Tukey fence)
        k: f64,
    },
    /// Keep every sample
    #[default]
    None,
}

impl std::str::FromStr for OutlierMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(OutlierMethod::None),
            "iqr" => Ok(OutlierMethod::Iqr { k: 1.5 }),
            other => Err(format!("Unknown outlier method: {}", other)),
        }
    }
}

/// Result of outlier analysis
#[derive(Debug, Clone)]
pub struct OutlierAnalysis {
    /// Samples inside the fences, in original order
    pub cleaned_samples: Vec<f64>,
    /// Indices of rejected samples
    pub outlier_indices: Vec<usize>,
    /// Lower fence
    pub lower_bound: f64,
    /// Upper fence
    pub upper_bound: f64,
}

impl OutlierAnalysis {
    /// Number of rejected samples
    pub fn outlier_count(&self) -> usize {
        self.outlier_indices.len()
    }
}

/// Detect outliers in samples using specified method
pub fn detect_outliers(samples: &[f64], method: OutlierMethod) -> OutlierAnalysis {
    let (lower_bound, upper_bound) = match method {
        // Fewer than four points give no meaningful quartiles
        OutlierMethod::Iqr { k } if samples.len() >= 4 => {
            let p = compute_percentiles(samples);
            (p.p25 - k * p.iqr(), p.p75 + k * p.iqr())
        }
        _ => (f64::NEG_INFINITY, f64::INFINITY),
    };

    let mut cleaned_samples = Vec::with_capacity(samples.len());
    let mut outlier_indices = Vec::new();
    for (i, &sample) in samples.iter().enumerate() {
        if sample < lower_bound || sample > upper_bound {
            outlier_indices.push(i);
        } else {
            cleaned_samples.push(sample);
        }
    }

    OutlierAnalysis {
        cleaned_samples,
        outlier_indices,
        lower_bound,
        upper_bound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_outliers() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = detect_outliers(&samples, OutlierMethod::Iqr { k: 1.5 });

        assert_eq!(result.outlier_count(), 0);
        assert_eq!(result.cleaned_samples, samples);
    }

    #[test]
    fn test_with_outliers() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let result = detect_outliers(&samples, OutlierMethod::Iqr { k: 1.5 });

        assert_eq!(result.outlier_indices, vec![5]);
        assert_eq!(result.cleaned_samples.len(), 5);
    }

    #[test]
    fn test_no_detection() {
        let samples = vec![1.0, 2.0, 100.0, 3.0];
        let result = detect_outliers(&samples, OutlierMethod::None);
        assert_eq!(result.cleaned_samples.len(), 4);
    }

    #[test]
    fn test_too_few_samples() {
        let samples = vec![1.0, 1000.0];
        let result = detect_outliers(&samples, OutlierMethod::Iqr { k: 1.5 });
        assert_eq!(result.outlier_count(), 0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("iqr".parse::<OutlierMethod>().unwrap(), OutlierMethod::Iqr { k: 1.5 });
        assert!("zscore".parse::<OutlierMethod>().is_err());
    }
}
