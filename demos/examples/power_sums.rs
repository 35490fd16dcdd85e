//! Power Sums: three implementations across a sweep
//!
//! `naive` and `incremental` run on the host; `device` queues its work on a
//! simulated accelerator and is timed up to the device barrier.
//!
//! Run with:
//!   cargo run --example power_sums -p sweepbench-demos --release
//!   cargo run --example power_sums -p sweepbench-demos --release -- --type channels
//!   cargo run --example power_sums -p sweepbench-demos --release -- --measure memory
//!   cargo run --example power_sums -p sweepbench-demos --release -- --type depths --output graph
//!   cargo run --example power_sums -p sweepbench-demos --release -- list

use std::sync::Arc;
use sweepbench::prelude::*;
use sweepbench::{TrackingAllocator, register};
use sweepbench_demos::{ThreadDevice, incremental, naive, on_device};

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

register!(FunctionDef::new("power_sums_naive", "power_sums", "naive", naive).slow());
register!(FunctionDef::new(
    "power_sums_incremental",
    "power_sums",
    "incremental",
    incremental
));
register!(FunctionDef::new("power_sums_device", "power_sums", "device", on_device).on_device());

fn main() {
    let device: Arc<dyn Device> = Arc::new(ThreadDevice::new());
    if let Err(e) = sweepbench::run_with_device(Some(device)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
