//! Table Output
//!
//! One block per group. Rows follow the sweep's configuration order and
//! columns follow registry order, so the same sweep and function set always
//! produce the same row and column order.

use crate::format::format_value;
use crate::ratio::Ratio;
use crate::report::FunctionInfo;
use crate::result_set::ResultSet;

/// Render every group as an aligned text table.
///
/// `reference` is the implementation label ratios are computed against;
/// `None` disables the ratio columns.
pub fn render_table(results: &ResultSet, reference: Option<&str>) -> String {
    let mut output = String::new();
    let axis = results.sweep().axis.title();

    for group in results.groups() {
        let functions = results.functions_in_group(group);
        let reference_fn = reference.and_then(|r| results.reference_in_group(group, r));
        // A group that lost its reference keeps its ratio columns, all undefined
        let comparisons: Vec<&FunctionInfo> = match (reference, reference_fn) {
            (None, _) => Vec::new(),
            (Some(_), Some(reference_fn)) => functions
                .iter()
                .copied()
                .filter(|f| f.id != reference_fn.id)
                .collect(),
            (Some(_), None) => functions.clone(),
        };

        let mut header = vec![axis.to_string()];
        header.extend(functions.iter().map(|f| f.implementation.clone()));
        if let Some(label) = reference {
            header.extend(
                comparisons
                    .iter()
                    .map(|f| format!("{}/{}", f.implementation, label)),
            );
        }

        let mut rows = Vec::with_capacity(results.sweep().len());
        for (index, configuration) in results.sweep().configurations.iter().enumerate() {
            let mut row = vec![configuration.label.clone()];
            row.extend(functions.iter().map(|f| cell(results, index, &f.id)));
            row.extend(comparisons.iter().map(|f| {
                reference_fn
                    .map_or(Ratio::Undefined, |r| results.ratio(index, &r.id, &f.id))
                    .to_string()
            }));
            rows.push(row);
        }

        let widths: Vec<usize> = (0..header.len())
            .map(|col| {
                rows.iter()
                    .map(|row| row[col].len())
                    .chain(std::iter::once(header[col].len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let total = widths.iter().sum::<usize>() + 2 * widths.len();

        output.push_str(&format!("Group: {}\n", group));
        output.push_str(&"-".repeat(total.max(20)));
        output.push('\n');
        output.push_str(&format_row(&header, &widths));
        for row in &rows {
            output.push_str(&format_row(row, &widths));
        }
        output.push('\n');
    }

    output
}

fn cell(results: &ResultSet, configuration: usize, function: &str) -> String {
    match results.get(configuration, function) {
        Some(record) => match (record.value(), record.measurement) {
            (Some(value), Some(m)) => format_value(value, m.unit),
            _ => format!("- ({})", record.status.label()),
        },
        None => "-".to_string(),
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from(" ");
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if i == 0 {
            line.push_str(&format!(" {:<width$}", cell, width = width));
        } else {
            line.push_str(&format!("  {:>width$}", cell, width = width));
        }
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::TrialStatus;
    use crate::result_set::fixtures::*;
    use sweepbench_core::{Preset, SweepOptions, generate};

    fn data_rows(table: &str) -> Vec<&str> {
        table
            .lines()
            .filter(|l| {
                l.trim_start()
                    .strip_prefix("depth ")
                    .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            })
            .collect()
    }

    #[test]
    fn test_every_configuration_has_a_row() {
        let mut results = small_pair();
        results.insert(success(0, "a_sum", 0.002));
        results.insert(success(0, "b_sum", 0.004));
        results.insert(success(1, "a_sum", 0.002));
        results.insert(failed(1, "b_sum", TrialStatus::SetupFailed));

        let table = render_table(&results, Some("a"));
        let rows = data_rows(&table);

        assert_eq!(rows.len(), results.sweep().len());
        assert!(table.contains("b/a"));
        assert!(rows[0].contains("2.00 ms"));
        assert!(rows[0].trim_end().ends_with("2.00"));
        assert!(rows[1].contains("- (setup failed)"));
        assert!(rows[1].trim_end().ends_with("undefined"));
        // Never measured at all
        assert!(rows[2].contains(" - "));
        assert!(rows[2].trim_end().ends_with("undefined"));
    }

    #[test]
    fn test_row_order_is_generator_order() {
        let mut results = small_pair();
        for configuration in (0..results.sweep().len()).rev() {
            results.insert(success(configuration, "b_sum", 1.0));
            results.insert(success(configuration, "a_sum", 1.0));
        }

        let first = render_table(&results, Some("a"));
        let second = render_table(&results, Some("a"));
        assert_eq!(first, second);

        let labels: Vec<String> = data_rows(&first)
            .iter()
            .map(|row| row.split_whitespace().take(2).collect::<Vec<_>>().join(" "))
            .collect();
        let expected: Vec<String> = results
            .sweep()
            .configurations
            .iter()
            .map(|c| c.label.clone())
            .collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_without_ratios() {
        let mut results = small_pair();
        results.insert(success(0, "a_sum", 1.0));
        let table = render_table(&results, None);
        assert!(!table.contains("b/a"));
        assert!(!table.contains("undefined"));
    }

    #[test]
    fn test_group_without_reference_shows_undefined_ratios() {
        let mut results = ResultSet::new(
            generate(Preset::Small, &SweepOptions::default()),
            vec![
                function("a_sum", "sum", "a"),
                function("b_sum", "sum", "b"),
                function("b_max", "max", "b"),
            ],
        );
        for configuration in 0..results.sweep().len() {
            results.insert(success(configuration, "a_sum", 1.0));
            results.insert(success(configuration, "b_sum", 2.0));
            results.insert(success(configuration, "b_max", 3.0));
        }

        let table = render_table(&results, Some("a"));
        let (sum, max) = table.split_at(table.find("Group: max").unwrap());

        assert!(data_rows(sum).iter().all(|r| r.trim_end().ends_with("2.00")));
        assert!(max.contains("b/a"));
        let rows = data_rows(max);
        assert_eq!(rows.len(), results.sweep().len());
        assert!(rows.iter().all(|r| r.trim_end().ends_with("undefined")));
    }
}
