//! Run Harness
//!
//! The whole pipeline behind the CLI, callable without argument parsing:
//! generate the sweep, plan, validate, measure, reduce and render.
//!
//! Everything that can reject a run (bad policy, unknown reference,
//! missing dependency, graph on a single-point sweep) is checked before
//! the first trial starts.

use crate::config::SweepConfig;
use crate::executor::{
    ExecutionConfig, Executor, SamplingPolicy, build_result_set, build_run_meta,
    compute_statistics,
};
use crate::planner::{PlanOptions, build_plan};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use sweepbench_core::{
    Device, FunctionDef, Preset, Registry, Strategy, SweepError, SweepOptions, generate,
    is_tracking,
};
use sweepbench_report::{
    OutputMode, RenderError, ResultSet, SvgPlotter, check_graph, generate_json_report,
    render_graphs, render_table, write_graphs,
};
use tracing::info;

/// Name of the saved result set inside the output directory
pub const RESULTS_FILE: &str = "results.json";

/// Every knob of a single run
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Sweep preset
    pub preset: Preset,
    /// Overrides of the preset's sizes
    pub options: SweepOptions,
    /// Time or memory
    pub strategy: Strategy,
    /// Sampling policy
    pub policy: SamplingPolicy,
    /// Regex over function ids
    pub filter: Option<String>,
    /// Keep only this group
    pub group: Option<String>,
    /// Drop slow functions
    pub no_slow: bool,
    /// Drop device-backed functions
    pub no_device: bool,
    /// Compute ratios
    pub ratio: bool,
    /// Reference implementation label
    pub reference: Option<String>,
    /// Output mode
    pub output: OutputMode,
    /// Directory for graphs and saved results
    pub out_dir: PathBuf,
    /// Also write the result set as JSON into `out_dir`
    pub save_json: bool,
    /// Pin the measuring thread to this CPU
    pub pin_cpu: Option<usize>,
    /// Draw a progress bar
    pub show_progress: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from_config(&SweepConfig::default())
    }
}

impl RunSettings {
    /// Settings taken from a configuration file
    pub fn from_config(config: &SweepConfig) -> Self {
        Self {
            preset: config.sweep.preset,
            options: config.sweep.options.clone(),
            strategy: config.sweep.measure,
            policy: SamplingPolicy {
                repetitions: config.runner.repetitions,
                device_warmup: config.runner.device_warmup,
                host_warmup: config.runner.host_warmup,
                statistic: config.runner.statistic,
                outliers: config.runner.outliers,
            },
            filter: None,
            group: None,
            no_slow: false,
            no_device: false,
            ratio: config.output.ratio,
            reference: config.output.reference.clone(),
            output: config.output.format,
            out_dir: PathBuf::from(&config.output.directory),
            save_json: config.output.save_json,
            pin_cpu: config.runner.pin_cpu,
            show_progress: true,
        }
    }
}

/// What the output mode produced
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// Text table, one block per group
    Table(String),
    /// Paths of the written graph files
    Graphs(Vec<PathBuf>),
    /// Pretty-printed result set
    Json(String),
    /// Nothing
    Nothing,
}

/// Finished run
#[derive(Debug)]
pub struct RunOutcome {
    /// Every trial of the run
    pub results: ResultSet,
    /// Resolved reference implementation, when ratios were enabled
    pub reference: Option<String>,
    /// Output of the selected mode
    pub rendered: Rendered,
    /// Path of the saved JSON result set
    pub saved: Option<PathBuf>,
}

/// Run a sweep over the functions of `registry`.
///
/// `stop` is polled between trials; once set, the remaining trials are
/// recorded as skipped and the partial result set is rendered.
pub fn run_sweep(
    registry: &Registry,
    settings: &RunSettings,
    device: Option<&dyn Device>,
    stop: Option<&AtomicBool>,
) -> anyhow::Result<RunOutcome> {
    settings.policy.validate()?;

    let sweep = generate(settings.preset, &settings.options);
    if sweep.is_empty() {
        return Err(SweepError::config(format!(
            "sweep `{}` has no configurations",
            settings.preset
        ))
        .into());
    }
    if settings.output == OutputMode::Graph {
        check_graph(&sweep)?;
    }

    let filter = settings
        .filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| SweepError::config(format!("invalid function pattern: {}", e)))?;
    let plan = build_plan(
        registry,
        &PlanOptions {
            filter: filter.as_ref(),
            group: settings.group.as_deref(),
            no_slow: settings.no_slow,
            no_device: settings.no_device,
            device_available: device.is_some(),
        },
    );
    let reference = plan.validate(settings.ratio, settings.reference.as_deref())?;
    if settings.strategy == Strategy::Memory
        && !is_tracking()
        && needs_host_tracking(&plan.functions, device)
    {
        return Err(SweepError::config(
            "memory measurement requires TrackingAllocator as the global allocator",
        )
        .into());
    }

    info!(
        "Running {} functions over {} configurations ({}, {})",
        plan.functions.len(),
        sweep.len(),
        settings.preset,
        settings.strategy
    );

    let config = ExecutionConfig {
        strategy: settings.strategy,
        policy: settings.policy.clone(),
        pin_cpu: settings.pin_cpu,
        show_progress: settings.show_progress,
    };
    let start_time = Instant::now();
    let mut executor = Executor::new(config.clone()).with_device(device);
    if let Some(flag) = stop {
        executor = executor.with_stop_flag(flag);
    }
    let executions = executor.execute(&sweep, &plan.functions);
    let stats = compute_statistics(&executions, &config.policy);
    let total_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    let meta = build_run_meta(&config, settings.preset, device.map(|d| d.name()));
    let results = build_result_set(
        &sweep,
        &plan.functions,
        &executions,
        &stats,
        &config.policy,
        meta,
        total_duration_ms,
    );

    let rendered = render(&results, settings.output, reference.as_deref(), &settings.out_dir)?;
    let saved = if settings.save_json {
        Some(save_json(&results, &settings.out_dir)?)
    } else {
        None
    };

    Ok(RunOutcome {
        results,
        reference,
        rendered,
        saved,
    })
}

/// Whether some function would be measured through the host heap probe,
/// which only moves when the tracking allocator is installed.
fn needs_host_tracking(functions: &[FunctionDef], device: Option<&dyn Device>) -> bool {
    let device_probe = device.and_then(|d| d.memory_probe()).is_some();
    functions.iter().any(|f| !(f.device && device_probe))
}

/// Render a result set in `mode`. Graph files go to `out_dir`.
pub fn render(
    results: &ResultSet,
    mode: OutputMode,
    reference: Option<&str>,
    out_dir: &Path,
) -> Result<Rendered, RenderError> {
    Ok(match mode {
        OutputMode::Table => Rendered::Table(render_table(results, reference)),
        OutputMode::Graph => {
            let graphs = render_graphs(results, reference, &SvgPlotter::default())?;
            Rendered::Graphs(write_graphs(out_dir, &graphs)?)
        }
        OutputMode::Json => Rendered::Json(generate_json_report(results)?),
        OutputMode::None => Rendered::Nothing,
    })
}

fn save_json(results: &ResultSet, out_dir: &Path) -> Result<PathBuf, RenderError> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(RESULTS_FILE);
    std::fs::write(&path, generate_json_report(results)?)?;
    Ok(path)
}
