//! Sweep Executor
//!
//! Runs every planned function on every configuration of a sweep and turns
//! the raw samples into a `ResultSet`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! FunctionDef (registered via register!)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Run trials one at a time, collect samples
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ statistics  │  Central value and summary stats (parallel)
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Build the ResultSet with run metadata
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Run summary and listings
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Trial execution and sampling policy
//! - [`statistics`] - Parallel statistics computation
//! - [`report`] - Result set building
//! - [`formatting`] - Human-readable summaries
//! - [`metadata`] - System metadata collection

mod execution;
mod formatting;
mod metadata;
mod report;
mod statistics;

// Re-export public API
pub use execution::{ExecutionConfig, Executor, SamplingPolicy, TrialExecution};
pub use formatting::{format_failures, format_function_list, format_run_summary};
pub use metadata::build_run_meta;
pub use report::{INTERRUPTED_REASON, build_result_set};
pub use statistics::{TrialStatistics, compute_statistics};
