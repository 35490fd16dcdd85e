//! Output Formatting
//!
//! Terminal text that accompanies the renderers:
//! - Run summary with status counts and failure reasons
//! - Function listing grouped by computation, with flags

use crate::planner::Listing;
use sweepbench_report::{ResultSet, RunSummary, TrialStatus};

/// Format the counts of a finished run
pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    output.push_str("\nSummary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  Total: {}  Succeeded: {}  Setup failed: {}  Run failed: {}  Skipped: {}\n",
        summary.total_trials,
        summary.succeeded,
        summary.setup_failed,
        summary.run_failed,
        summary.skipped
    ));
    output.push_str(&format!("  Duration: {:.2} ms\n", summary.total_duration_ms));
    if summary.interrupted {
        output.push_str("  Interrupted: remaining trials were not started\n");
    }

    output
}

/// List every failed trial with its reason
///
/// Empty when every trial succeeded or was skipped.
pub fn format_failures(results: &ResultSet) -> String {
    let mut output = String::new();
    let failed: Vec<_> = results
        .records()
        .iter()
        .filter(|r| matches!(r.status, TrialStatus::SetupFailed | TrialStatus::RunFailed))
        .collect();
    if failed.is_empty() {
        return output;
    }

    output.push_str("\nFailures\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    for record in failed {
        let label = results
            .configuration(record.configuration)
            .map(|c| c.label.as_str())
            .unwrap_or("?");
        output.push_str(&format!(
            "  ✗ {} @ {}: {}: {}\n",
            record.function,
            label,
            record.status.label(),
            record.reason.as_deref().unwrap_or("")
        ));
    }
    output
}

/// Format the `list` subcommand output
pub fn format_function_list(listing: &Listing) -> String {
    let mut output = String::new();

    for (group, entries) in &listing.groups {
        output.push_str(&format!("Group: {}\n", group));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        let width = entries.iter().map(|e| e.id.len()).max().unwrap_or(0);
        for entry in entries {
            let mut flags = Vec::new();
            if entry.device {
                flags.push("device".to_string());
            }
            if entry.slow {
                flags.push("slow".to_string());
            }
            if let Some(library) = entry.requires {
                flags.push(format!("requires {}", library));
            }
            if let Some(reason) = &entry.excluded {
                flags.push(format!("excluded: {}", reason));
            }

            output.push_str(&format!(
                "  {:<width$}  {:<12}",
                entry.id,
                entry.implementation,
                width = width
            ));
            if !flags.is_empty() {
                output.push_str(&format!("  [{}]", flags.join(", ")));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "{} functions in {} groups\n",
        listing.total,
        listing.groups.len()
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_mentions_interrupt() {
        let summary = RunSummary {
            total_trials: 4,
            succeeded: 2,
            skipped: 2,
            interrupted: true,
            ..RunSummary::default()
        };
        let text = format_run_summary(&summary);
        assert!(text.contains("Total: 4"));
        assert!(text.contains("Skipped: 2"));
        assert!(text.contains("Interrupted"));
    }
}
