#![warn(missing_docs)]
//! SweepBench Report - Results and Rendering
//!
//! Holds every trial of a run and renders it:
//! - `ResultSet` indexed by configuration and function
//! - Ratios against a reference implementation
//! - Table (terminal), graph (SVG) and JSON output

mod format;
mod graph;
mod json;
mod ratio;
mod report;
mod result_set;
mod table;

pub use format::{format_bytes, format_duration, format_value};
pub use graph::{
    Chart, Plotter, RenderedGraph, Series, SvgPlotter, build_charts, check_graph, render_graphs,
    write_graphs,
};
pub use json::{generate_json_report, load_json_report};
pub use ratio::{Ratio, RatioEntry};
pub use report::{
    FunctionInfo, Measurement, PolicyMeta, RunMeta, RunSummary, SystemInfo, TrialRecord,
    TrialStatus,
};
pub use result_set::ResultSet;
pub use table::render_table;

use sweepbench_core::SweepError;
use thiserror::Error;

/// Current JSON layout version
pub const SCHEMA_VERSION: u32 = 1;

/// Failure while rendering or writing output
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output mode does not fit the sweep
    #[error(transparent)]
    Configuration(#[from] SweepError),

    /// Writing an output file failed
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Aligned text table per group
    Table,
    /// SVG chart per group
    Graph,
    /// Full result set as JSON
    Json,
    /// Measure only
    None,
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(OutputMode::Table),
            "graph" | "svg" => Ok(OutputMode::Graph),
            "json" => Ok(OutputMode::Json),
            "none" => Ok(OutputMode::None),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
