//! System Metadata Collection
//!
//! Collects system information for run metadata including CPU, memory,
//! OS details, and git information.
//!
//! Linux-specific data (CPU model, memory) gracefully degrades on other
//! platforms, returning "Unknown" or 0 values.

use super::execution::ExecutionConfig;
use chrono::Utc;
use sweepbench_core::Preset;
use sweepbench_report::{PolicyMeta, RunMeta, SCHEMA_VERSION, SystemInfo};

/// Build run metadata including system info and git details
pub fn build_run_meta(config: &ExecutionConfig, preset: Preset, device: Option<&str>) -> RunMeta {
    let system = SystemInfo {
        os: std::env::consts::OS.to_string(),
        os_version: std::env::consts::ARCH.to_string(),
        cpu: proc_field("/proc/cpuinfo", "model name").unwrap_or_else(|| "Unknown".to_string()),
        cpu_cores: num_cpus(),
        memory_gb: memory_gb().unwrap_or(0.0),
    };

    RunMeta {
        schema_version: SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        git_commit: git(&["rev-parse", "HEAD"]),
        git_branch: git(&["rev-parse", "--abbrev-ref", "HEAD"]),
        system,
        device: device.map(str::to_string),
        preset,
        strategy: config.strategy,
        policy: PolicyMeta {
            repetitions: config.policy.repetitions,
            device_warmup: config.policy.device_warmup,
            host_warmup: config.policy.host_warmup,
            statistic: config.policy.statistic,
            outliers: config.policy.outliers,
        },
    }
}

/// Output of a git command, `None` outside a repository
fn git(args: &[&str]) -> Option<String> {
    std::process::Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
}

/// Value of the first `key: value` line of a /proc file (Linux only)
#[cfg(target_os = "linux")]
fn proc_field(path: &str, key: &str) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    content
        .lines()
        .find(|l| l.starts_with(key))
        .and_then(|l| l.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
}

#[cfg(not(target_os = "linux"))]
fn proc_field(_path: &str, _key: &str) -> Option<String> {
    None
}

/// Total system memory in GB
fn memory_gb() -> Option<f64> {
    let total = proc_field("/proc/meminfo", "MemTotal")?;
    let kb: u64 = total.split_whitespace().next()?.parse().ok()?;
    Some(kb as f64 / 1024.0 / 1024.0)
}

fn num_cpus() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}
