//! Configuration loading from sweepbench.toml
//!
//! SweepBench configuration can be specified in a `sweepbench.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.
//! Command-line flags override every value read here.

use serde::{Deserialize, Serialize};
use std::path::Path;
use sweepbench_core::{Preset, Strategy, SweepOptions};
use sweepbench_report::OutputMode;
use sweepbench_stats::{CentralStatistic, OutlierMethod};

/// Name of the configuration file
pub const CONFIG_FILE: &str = "sweepbench.toml";

/// SweepBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SweepConfig {
    /// Sampling policy
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Preset, strategy and sweep overrides
    #[serde(default)]
    pub sweep: SweepSection,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Sampling policy for every trial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Retained timed repetitions per trial
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,
    /// Discarded leading repetitions for device functions
    #[serde(default = "default_device_warmup")]
    pub device_warmup: usize,
    /// Discarded leading repetitions for host functions
    #[serde(default)]
    pub host_warmup: usize,
    /// Central statistic: "median" or "mean"
    #[serde(default)]
    pub statistic: CentralStatistic,
    /// Outlier rejection before the central statistic
    #[serde(default)]
    pub outliers: OutlierMethod,
    /// Pin the measuring thread to this CPU (Linux only)
    #[serde(default)]
    pub pin_cpu: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            repetitions: default_repetitions(),
            device_warmup: default_device_warmup(),
            host_warmup: 0,
            statistic: CentralStatistic::default(),
            outliers: OutlierMethod::default(),
            pin_cpu: None,
        }
    }
}

fn default_repetitions() -> usize {
    20
}
fn default_device_warmup() -> usize {
    1
}

/// `[sweep]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSection {
    /// Preset used when `--type` is not given
    #[serde(default = "default_preset")]
    pub preset: Preset,
    /// Strategy used when `--measure` is not given
    #[serde(default = "default_measure")]
    pub measure: Strategy,
    /// Overrides of the preset's sizes
    #[serde(flatten)]
    pub options: SweepOptions,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            measure: default_measure(),
            options: SweepOptions::default(),
        }
    }
}

fn default_preset() -> Preset {
    Preset::Typical
}
fn default_measure() -> Strategy {
    Strategy::Time
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output mode: table, graph, json, none
    #[serde(default = "default_format")]
    pub format: OutputMode,
    /// Directory for graph files and saved results
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Compute ratios against the reference implementation
    #[serde(default = "default_ratio")]
    pub ratio: bool,
    /// Reference implementation label; the first selected function's when unset
    #[serde(default)]
    pub reference: Option<String>,
    /// Also write `results.json` into `directory`
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: default_output_dir(),
            ratio: default_ratio(),
            reference: None,
            save_json: false,
        }
    }
}

fn default_format() -> OutputMode {
    OutputMode::Table
}
fn default_output_dir() -> String {
    "target/sweepbench".to_string()
}
fn default_ratio() -> bool {
    true
}

impl SweepConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    ///
    /// A file that exists but fails to parse is an error, not a silent default.
    pub fn discover() -> anyhow::Result<Option<Self>> {
        let Ok(mut dir) = std::env::current_dir() else {
            return Ok(None);
        };
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load(&config_path).map(Some).map_err(|e| {
                    anyhow::anyhow!("failed to load {}: {}", config_path.display(), e)
                });
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# SweepBench Configuration
# https://github.com/ml-rust/sweepbench

[runner]
# Retained timed repetitions per trial
repetitions = 20
# Leading repetitions discarded for device-backed functions
device_warmup = 1
# Leading repetitions discarded for host functions
host_warmup = 0
# Central statistic: median or mean
statistic = "median"
# Outlier rejection: { method = "none" } or { method = "iqr", k = 1.5 }
outliers = { method = "none" }
# Pin the measuring thread to a CPU (uncomment to enable)
# pin_cpu = 2

[sweep]
# Default preset: typical, depths, channels, small
preset = "typical"
# Default measurement: time or memory
measure = "time"
# Size overrides (uncomment to enable)
# batch_size = 32
# stream_length = 128
# depths = [2, 3, 4, 5, 6, 7, 8, 9]
# channels = [2, 3, 4, 5, 6, 7, 8, 9]

[output]
# Default output: table, graph, json, none
format = "table"
# Directory for graphs and saved results
directory = "target/sweepbench"
# Compute ratios against the reference implementation
ratio = true
# Reference implementation label (uncomment to enable)
# reference = "naive"
# Also write results.json into the output directory
save_json = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SweepConfig::default();
        assert_eq!(config.runner.repetitions, 20);
        assert_eq!(config.runner.device_warmup, 1);
        assert_eq!(config.runner.host_warmup, 0);
        assert_eq!(config.runner.statistic, CentralStatistic::Median);
        assert_eq!(config.sweep.preset, Preset::Typical);
        assert!(config.output.ratio);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            repetitions = 5
            statistic = "mean"
            outliers = { method = "iqr", k = 3.0 }

            [sweep]
            preset = "depths"
            depths = [2, 4]

            [output]
            format = "none"
            ratio = false
        "#;

        let config: SweepConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.repetitions, 5);
        assert_eq!(config.runner.statistic, CentralStatistic::Mean);
        assert_eq!(config.runner.outliers, OutlierMethod::Iqr { k: 3.0 });
        assert_eq!(config.sweep.preset, Preset::Depths);
        assert_eq!(config.sweep.options.depths, Some(vec![2, 4]));
        assert_eq!(config.output.format, OutputMode::None);
        assert!(!config.output.ratio);
        // Defaults should still apply
        assert_eq!(config.runner.device_warmup, 1);
        assert_eq!(config.sweep.measure, Strategy::Time);
        assert_eq!(config.output.directory, "target/sweepbench");
    }

    #[test]
    fn test_default_toml_parses() {
        let config: SweepConfig = toml::from_str(&SweepConfig::default_toml()).unwrap();
        assert_eq!(config.runner.repetitions, 20);
        assert_eq!(config.runner.outliers, OutlierMethod::None);
        assert_eq!(config.output.format, OutputMode::Table);
        assert_eq!(config.sweep.options, SweepOptions::default());
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let result: Result<SweepConfig, _> = toml::from_str("[sweep]\npreset = \"huge\"\n");
        assert!(result.is_err());
    }
}
