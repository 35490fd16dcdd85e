#![warn(missing_docs)]
//! # SweepBench
//!
//! Compare alternative implementations of one computation across a sweep of
//! problem sizes.
//!
//! SweepBench runs every registered implementation on every configuration of
//! a preset sweep and reports them side by side:
//! - **Function Contract**: `setup` outside the measurement, `run` inside it, `mem_include` for memory
//! - **Sweep Presets**: `typical`, `depths`, `channels` and `small` configuration grids
//! - **Device Barriers**: asynchronous accelerator work is waited for inside the timed window
//! - **Time or Memory**: repeated wall-clock samples, or peak memory growth of one call
//! - **Ratios**: every implementation against a reference, per configuration
//! - **Output**: aligned tables, SVG graphs or JSON
//!
//! ## Quick Start
//!
//! ```ignore
//! use sweepbench::prelude::*;
//!
//! #[derive(Default)]
//! struct NaiveSum { data: Vec<f64> }
//!
//! impl BenchFunction for NaiveSum {
//!     fn setup(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
//!         let cfg = ctx.configuration();
//!         self.data = vec![1.0; cfg.batch_size * cfg.stream_length * cfg.channels];
//!         Ok(())
//!     }
//!
//!     fn run(&mut self, _ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
//!         std::hint::black_box(self.data.iter().sum::<f64>());
//!         Ok(())
//!     }
//! }
//!
//! fn naive() -> Box<dyn BenchFunction> {
//!     Box::new(NaiveSum::default())
//! }
//!
//! sweepbench::register!(FunctionDef::new("naive_sum", "sum", "naive", naive));
//!
//! fn main() {
//!     sweepbench::run().unwrap();
//! }
//! ```
//!
//! ## Device-Backed Functions
//!
//! ```ignore
//! sweepbench::register!(FunctionDef::new("gpu_sum", "sum", "gpu", gpu).on_device());
//!
//! fn main() {
//!     let device: Arc<dyn Device> = Arc::new(MyAccelerator::open()?);
//!     sweepbench::run_with_device(Some(device))?;
//! }
//! ```

// Re-export core types
pub use sweepbench_core::{
    BenchFunction, Bencher, BenchmarkResult, Configuration, Device, DeviceError, FunctionDef,
    FunctionError, HostMemory, MemoryProbe, Preset, Registry, Requirement, Sample, Strategy,
    Sweep, SweepAxis, SweepError, SweepOptions, TrackingAllocator, TrialContext, TrialFailure,
    Unit, generate, register, run_trial,
};

// Re-export stats
pub use sweepbench_stats::{
    CentralStatistic, OutlierMethod, SummaryStatistics, aggregate, compute_summary,
};

// Re-export results and renderers
pub use sweepbench_report::{
    OutputMode, Ratio, RenderError, ResultSet, TrialRecord, TrialStatus, check_graph,
    generate_json_report, load_json_report, render_graphs, render_table,
};

// Re-export the harness
pub use sweepbench_cli::{
    Rendered, RunOutcome, RunSettings, SamplingPolicy, SweepConfig, run_sweep, run_with_cli,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BenchFunction, Configuration, Device, DeviceError, FunctionDef, FunctionError,
        MemoryProbe, TrialContext, register,
    };
}

/// Run the SweepBench CLI harness.
///
/// Call this from your sweep binary's `main()`:
/// ```ignore
/// fn main() {
///     sweepbench::run().unwrap();
/// }
/// ```
pub use sweepbench_cli::run;

/// Run the CLI harness with a device for device-backed functions.
pub use sweepbench_cli::run_with_device;
