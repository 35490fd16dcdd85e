//! Ratio Computation
//!
//! `ratio = comparison / reference` for each configuration. A ratio is
//! undefined when either side has no successful measurement or the
//! reference is zero; undefined ratios are kept, never dropped.

use serde::{Deserialize, Serialize};

use crate::report::FunctionInfo;
use crate::result_set::ResultSet;

/// Comparison over reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ratio {
    /// Both sides measured
    Defined(f64),
    /// A side is missing, failed, or the reference is zero
    Undefined,
}

impl Ratio {
    /// Value, if defined
    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(v),
            Ratio::Undefined => None,
        }
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ratio::Defined(v) => write!(f, "{:.2}", v),
            Ratio::Undefined => f.write_str("undefined"),
        }
    }
}

/// One ratio cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioEntry {
    /// Configuration index
    pub configuration: usize,
    /// Group both functions belong to
    pub group: String,
    /// Reference function id
    pub reference: String,
    /// Comparison function id
    pub comparison: String,
    /// The ratio
    pub ratio: Ratio,
}

impl ResultSet {
    /// `comparison / reference` at one configuration
    pub fn ratio(&self, configuration: usize, reference: &str, comparison: &str) -> Ratio {
        let reference = self.get(configuration, reference).and_then(|r| r.value());
        let comparison = self.get(configuration, comparison).and_then(|r| r.value());
        match (reference, comparison) {
            (Some(r), Some(c)) if r != 0.0 => Ratio::Defined(c / r),
            _ => Ratio::Undefined,
        }
    }

    /// The function of `group` implemented by `implementation`
    pub fn reference_in_group(&self, group: &str, implementation: &str) -> Option<&FunctionInfo> {
        self.functions()
            .iter()
            .find(|f| f.group == group && f.implementation == implementation)
    }

    /// Every ratio against the `implementation` reference.
    ///
    /// Groups without that implementation produce no entries. Order is
    /// group, then configuration, then function.
    pub fn ratios(&self, implementation: &str) -> Vec<RatioEntry> {
        let mut entries = Vec::new();
        for group in self.groups() {
            let Some(reference) = self.reference_in_group(group, implementation) else {
                continue;
            };
            let comparisons: Vec<&FunctionInfo> = self
                .functions_in_group(group)
                .into_iter()
                .filter(|f| f.id != reference.id)
                .collect();

            for configuration in 0..self.sweep().len() {
                for comparison in &comparisons {
                    entries.push(RatioEntry {
                        configuration,
                        group: group.to_string(),
                        reference: reference.id.clone(),
                        comparison: comparison.id.clone(),
                        ratio: self.ratio(configuration, &reference.id, &comparison.id),
                    });
                }
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::TrialStatus;
    use crate::result_set::fixtures::*;

    #[test]
    fn test_ratio_defined() {
        let mut results = small_pair();
        results.insert(success(0, "a_sum", 2.0));
        results.insert(success(0, "b_sum", 5.0));

        assert_eq!(results.ratio(0, "a_sum", "b_sum"), Ratio::Defined(2.5));
    }

    #[test]
    fn test_ratio_antisymmetry() {
        let mut results = small_pair();
        results.insert(success(0, "a_sum", 0.003));
        results.insert(success(0, "b_sum", 0.0171));

        let forward = results.ratio(0, "a_sum", "b_sum").value().unwrap();
        let backward = results.ratio(0, "b_sum", "a_sum").value().unwrap();
        assert!((forward * backward - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_undefined_cases() {
        let mut results = small_pair();
        results.insert(success(0, "a_sum", 1.0));
        results.insert(failed(1, "b_sum", TrialStatus::SetupFailed));
        results.insert(success(1, "a_sum", 1.0));
        results.insert(success(2, "a_sum", 0.0));
        results.insert(success(2, "b_sum", 1.0));

        // Missing comparison
        assert_eq!(results.ratio(0, "a_sum", "b_sum"), Ratio::Undefined);
        // Failed comparison
        assert_eq!(results.ratio(1, "a_sum", "b_sum"), Ratio::Undefined);
        // Zero reference
        assert_eq!(results.ratio(2, "a_sum", "b_sum"), Ratio::Undefined);
    }

    #[test]
    fn test_ratios_cover_every_configuration() {
        let mut results = small_pair();
        results.insert(success(0, "a_sum", 1.0));
        results.insert(success(0, "b_sum", 3.0));

        let entries = results.ratios("a");
        assert_eq!(entries.len(), results.sweep().len());
        assert_eq!(entries[0].ratio, Ratio::Defined(3.0));
        assert!(entries[1..].iter().all(|e| e.ratio == Ratio::Undefined));

        assert!(results.ratios("missing").is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Ratio::Defined(1.234).to_string(), "1.23");
        assert_eq!(Ratio::Undefined.to_string(), "undefined");
    }
}
