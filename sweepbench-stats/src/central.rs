//! Central Statistic
//!
//! The value a trial reports and the one ratios are computed from.

use serde::{Deserialize, Serialize};

use crate::outliers::{OutlierMethod, detect_outliers};
use crate::percentiles::compute_percentiles;
use crate::summary::mean_std;

/// Which statistic summarizes a trial
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentralStatistic {
    /// Median, with the interquartile range as spread
    #[default]
    Median,
    /// Arithmetic mean, with the sample standard deviation as spread
    Mean,
}

impl CentralStatistic {
    /// Lowercase name
    pub fn name(self) -> &'static str {
        match self {
            CentralStatistic::Median => "median",
            CentralStatistic::Mean => "mean",
        }
    }
}

impl std::fmt::Display for CentralStatistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for CentralStatistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "median" => Ok(CentralStatistic::Median),
            "mean" => Ok(CentralStatistic::Mean),
            other => Err(format!("Unknown statistic: {}", other)),
        }
    }
}

/// Reported value of one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Central value
    pub value: f64,
    /// Spread around it (IQR or stddev)
    pub spread: f64,
    /// Samples that contributed after rejection
    pub used: usize,
}

/// Reduce samples to one value. `None` when there is nothing to reduce.
pub fn aggregate(
    samples: &[f64],
    statistic: CentralStatistic,
    outliers: OutlierMethod,
) -> Option<Aggregate> {
    if samples.is_empty() {
        return None;
    }

    let analysis = detect_outliers(samples, outliers);
    let cleaned = &analysis.cleaned_samples;
    // IQR fences always keep the quartiles, so this only guards NaN input
    if cleaned.is_empty() {
        return None;
    }

    let (value, spread) = match statistic {
        CentralStatistic::Median => {
            let p = compute_percentiles(cleaned);
            (p.p50, p.iqr())
        }
        CentralStatistic::Mean => mean_std(cleaned),
    };

    Some(Aggregate {
        value,
        spread,
        used: cleaned.len(),
    })
}
