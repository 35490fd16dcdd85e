#![warn(missing_docs)]
//! SweepBench Statistics
//!
//! Reduces the raw samples of one trial to a single reported value:
//! - Percentiles by linear interpolation
//! - Optional outlier rejection via the IQR method
//! - Summary statistics for the run report
//! - The central statistic policy (median or mean) with its spread

mod central;
mod outliers;
mod percentiles;
mod summary;

pub use central::{Aggregate, CentralStatistic, aggregate};
pub use outliers::{OutlierAnalysis, OutlierMethod, detect_outliers};
pub use percentiles::{Percentiles, compute_percentile, compute_percentiles};
pub use summary::{SummaryStatistics, compute_summary};
