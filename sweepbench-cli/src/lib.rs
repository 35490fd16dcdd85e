#![warn(missing_docs)]
//! SweepBench CLI Library
//!
//! This module provides the command line for sweep binaries.
//! Use `sweepbench::run()` (or `sweepbench_cli::run()`) in your main function to sweep every
//! registered function; use `run_with_device` when some of them run on an accelerator.
//!
//! # Example
//!
//! ```ignore
//! use sweepbench::prelude::*;
//!
//! struct Sum { data: Vec<f64> }
//!
//! impl BenchFunction for Sum {
//!     fn setup(&mut self, ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
//!         self.data = vec![1.0; ctx.configuration().channels];
//!         Ok(())
//!     }
//!
//!     fn run(&mut self, _ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
//!         std::hint::black_box(self.data.iter().sum::<f64>());
//!         Ok(())
//!     }
//! }
//!
//! fn main() {
//!     if let Err(e) = sweepbench_cli::run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod config;
mod executor;
mod harness;
mod interrupt;
mod planner;

pub use config::*;
pub use executor::{
    ExecutionConfig, Executor, INTERRUPTED_REASON, SamplingPolicy, TrialExecution, TrialStatistics,
    build_result_set, build_run_meta, compute_statistics, format_failures, format_function_list,
    format_run_summary,
};
pub use harness::{RESULTS_FILE, Rendered, RunOutcome, RunSettings, render, run_sweep};
pub use planner::{
    Exclusion, ExclusionReason, ExecutionPlan, ListEntry, Listing, PlanOptions, build_plan,
    list_functions,
};

use clap::{Parser, Subcommand};
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use sweepbench_core::{Device, Preset, Registry, Strategy};
use sweepbench_report::OutputMode;
use sweepbench_stats::CentralStatistic;

/// SweepBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "sweepbench")]
#[command(author, version, about = "SweepBench - parameter-sweep benchmarks for competing implementations")]
pub struct Cli {
    /// Optional subcommand; defaults to running the sweep
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Sweep preset: typical, depths, channels, small
    #[arg(long = "type")]
    pub sweep_type: Option<Preset>,

    /// Measurement: time or memory
    #[arg(long)]
    pub measure: Option<Strategy>,

    /// Run functions whose id matches this regex
    #[arg(long)]
    pub fns: Option<String>,

    /// Run functions of this group only
    #[arg(long)]
    pub group: Option<String>,

    /// Output: table, graph, json, none
    #[arg(long)]
    pub output: Option<OutputMode>,

    /// Skip functions marked slow
    #[arg(long)]
    pub no_slow: bool,

    /// Skip device-backed functions
    #[arg(long)]
    pub no_gpu: bool,

    /// Do not compute ratios
    #[arg(long)]
    pub no_ratio: bool,

    /// Reference implementation for ratios
    #[arg(long)]
    pub reference: Option<String>,

    /// Retained repetitions per trial
    #[arg(long, short = 'n')]
    pub repetitions: Option<usize>,

    /// Central statistic: median or mean
    #[arg(long)]
    pub statistic: Option<CentralStatistic>,

    /// Directory for graphs and saved results
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Also save the result set as JSON in the output directory
    #[arg(long)]
    pub save_json: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Internal: Absorb cargo bench's --bench flag
    #[arg(long, hide = true)]
    pub bench: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered functions by group
    List,
    /// Run the sweep (default)
    Run,
    /// Print a documented sweepbench.toml template
    InitConfig,
}

/// Run the SweepBench CLI with the given arguments.
/// This is the main entry point for sweep binaries without a device.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if the run could not proceed.
pub fn run() -> anyhow::Result<()> {
    run_with_device(None)
}

/// Run the CLI with `device` injected into every device-backed function.
pub fn run_with_device(device: Option<Arc<dyn Device>>) -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli, device)
}

/// Run the SweepBench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli, device: Option<Arc<dyn Device>>) -> anyhow::Result<()> {
    // Initialize logging
    let filter = if cli.verbose {
        "sweepbench=debug"
    } else {
        "sweepbench=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    // Discover sweepbench.toml configuration (CLI flags override)
    let config = SweepConfig::discover()?.unwrap_or_default();
    let settings = build_settings(&cli, &config);
    let registry = Registry::discover()?;

    match cli.command {
        Some(Commands::List) => list(&registry, &settings, device.is_some()),
        Some(Commands::InitConfig) => {
            print!("{}", SweepConfig::default_toml());
            Ok(())
        }
        Some(Commands::Run) | None => run_and_render(&registry, &settings, device.as_deref()),
    }
}

/// Build run settings by layering: sweepbench.toml defaults → CLI overrides.
fn build_settings(cli: &Cli, config: &SweepConfig) -> RunSettings {
    let mut settings = RunSettings::from_config(config);

    if let Some(preset) = cli.sweep_type {
        settings.preset = preset;
    }
    if let Some(strategy) = cli.measure {
        settings.strategy = strategy;
    }
    if let Some(output) = cli.output {
        settings.output = output;
    }
    if let Some(repetitions) = cli.repetitions {
        settings.policy.repetitions = repetitions;
    }
    if let Some(statistic) = cli.statistic {
        settings.policy.statistic = statistic;
    }
    if let Some(dir) = &cli.out_dir {
        settings.out_dir = dir.clone();
    }
    if cli.reference.is_some() {
        settings.reference = cli.reference.clone();
    }
    settings.filter = cli.fns.clone();
    settings.group = cli.group.clone();
    settings.no_slow = cli.no_slow;
    settings.no_device = cli.no_gpu;
    settings.ratio = settings.ratio && !cli.no_ratio;
    settings.save_json = settings.save_json || cli.save_json;
    settings
}

fn list(registry: &Registry, settings: &RunSettings, device_available: bool) -> anyhow::Result<()> {
    let filter = settings.filter.as_deref().map(Regex::new).transpose()?;
    let plan = build_plan(
        registry,
        &PlanOptions {
            filter: filter.as_ref(),
            group: settings.group.as_deref(),
            no_slow: settings.no_slow,
            no_device: settings.no_device,
            device_available,
        },
    );

    println!("SweepBench Functions:\n");
    print!("{}", format_function_list(&list_functions(registry, &plan)));
    Ok(())
}

fn run_and_render(
    registry: &Registry,
    settings: &RunSettings,
    device: Option<&dyn Device>,
) -> anyhow::Result<()> {
    let stop = interrupt::install();
    let outcome = run_sweep(registry, settings, device, Some(stop))?;

    match &outcome.rendered {
        Rendered::Table(text) => print!("{}", text),
        Rendered::Json(json) => println!("{}", json),
        Rendered::Graphs(paths) => {
            for path in paths {
                eprintln!("Graph written to: {}", path.display());
            }
        }
        Rendered::Nothing => {}
    }
    if let Some(path) = &outcome.saved {
        eprintln!("Results saved to: {}", path.display());
    }

    // Table and graph runs get the human-readable tail; JSON stays parseable
    if matches!(outcome.rendered, Rendered::Table(_) | Rendered::Graphs(_)) {
        eprint!("{}", format_failures(&outcome.results));
        if let Some(summary) = &outcome.results.summary {
            eprint!("{}", format_run_summary(summary));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "sweepbench",
            "--type",
            "depths",
            "--measure",
            "memory",
            "--no-ratio",
            "-n",
            "5",
            "--statistic",
            "mean",
        ]);
        let settings = build_settings(&cli, &SweepConfig::default());
        assert_eq!(settings.preset, Preset::Depths);
        assert_eq!(settings.strategy, Strategy::Memory);
        assert!(!settings.ratio);
        assert_eq!(settings.policy.repetitions, 5);
        assert_eq!(settings.policy.statistic, CentralStatistic::Mean);
    }

    #[test]
    fn test_config_values_survive_without_flags() {
        let mut config = SweepConfig::default();
        config.output.format = OutputMode::Json;
        config.output.reference = Some("fast".to_string());
        let cli = Cli::parse_from(["sweepbench"]);
        let settings = build_settings(&cli, &config);
        assert_eq!(settings.output, OutputMode::Json);
        assert_eq!(settings.reference.as_deref(), Some("fast"));
        assert!(settings.ratio);
    }

    #[test]
    fn test_rejects_unknown_preset() {
        assert!(Cli::try_parse_from(["sweepbench", "--type", "huge"]).is_err());
    }

    #[test]
    fn test_list_subcommand() {
        let cli = Cli::parse_from(["sweepbench", "--group", "sum", "list"]);
        assert!(matches!(cli.command, Some(Commands::List)));
        assert_eq!(cli.group.as_deref(), Some("sum"));
    }
}
