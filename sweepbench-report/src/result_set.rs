//! Result Set
//!
//! Every trial record of a run, indexed by `(configuration, function)`.
//! Records can be inserted while the sweep is still running, so an
//! interrupted run still has something to render.

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use sweepbench_core::{Configuration, Sweep};

use crate::report::{FunctionInfo, RunMeta, RunSummary, TrialRecord};

/// All results of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ResultSetData")]
pub struct ResultSet {
    /// Run metadata, attached once the run is set up
    pub meta: Option<RunMeta>,
    /// Trial counts, attached when the sweep ends
    pub summary: Option<RunSummary>,
    sweep: Sweep,
    functions: Vec<FunctionInfo>,
    records: Vec<TrialRecord>,
    #[serde(skip)]
    index: FxHashMap<(usize, usize), usize>,
}

#[derive(Deserialize)]
struct ResultSetData {
    meta: Option<RunMeta>,
    summary: Option<RunSummary>,
    sweep: Sweep,
    functions: Vec<FunctionInfo>,
    records: Vec<TrialRecord>,
}

impl From<ResultSetData> for ResultSet {
    fn from(data: ResultSetData) -> Self {
        let mut results = ResultSet::new(data.sweep, data.functions);
        results.meta = data.meta;
        results.summary = data.summary;
        for record in data.records {
            results.insert(record);
        }
        results
    }
}

impl ResultSet {
    /// Empty result set for a sweep and the functions selected for it
    pub fn new(sweep: Sweep, functions: Vec<FunctionInfo>) -> Self {
        Self {
            meta: None,
            summary: None,
            sweep,
            functions,
            records: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Add a record, replacing any earlier one for the same pair.
    ///
    /// Records for unknown functions are ignored.
    pub fn insert(&mut self, record: TrialRecord) {
        let Some(position) = self.function_position(&record.function) else {
            return;
        };
        let key = (record.configuration, position);
        match self.index.get(&key) {
            Some(&slot) => self.records[slot] = record,
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    fn function_position(&self, id: &str) -> Option<usize> {
        self.functions.iter().position(|f| f.id == id)
    }

    /// The sweep the results belong to
    pub fn sweep(&self) -> &Sweep {
        &self.sweep
    }

    /// Configuration by index
    pub fn configuration(&self, index: usize) -> Option<&Configuration> {
        self.sweep.configurations.get(index)
    }

    /// Functions in registry order
    pub fn functions(&self) -> &[FunctionInfo] {
        &self.functions
    }

    /// Function by id
    pub fn function(&self, id: &str) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.id == id)
    }

    /// All records in insertion order
    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for one trial
    pub fn get(&self, configuration: usize, function: &str) -> Option<&TrialRecord> {
        let position = self.function_position(function)?;
        self.index
            .get(&(configuration, position))
            .map(|&slot| &self.records[slot])
    }

    /// Records of one configuration, in function order
    pub fn by_configuration(&self, configuration: usize) -> Vec<&TrialRecord> {
        (0..self.functions.len())
            .filter_map(|position| self.index.get(&(configuration, position)))
            .map(|&slot| &self.records[slot])
            .collect()
    }

    /// Records of one function across the sweep, in generator order
    pub fn by_function(&self, function: &str) -> Vec<&TrialRecord> {
        let Some(position) = self.function_position(function) else {
            return Vec::new();
        };
        (0..self.sweep.len())
            .filter_map(|configuration| self.index.get(&(configuration, position)))
            .map(|&slot| &self.records[slot])
            .collect()
    }

    /// Group names in first-appearance order
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for function in &self.functions {
            if !groups.contains(&function.group.as_str()) {
                groups.push(&function.group);
            }
        }
        groups
    }

    /// Functions of one group, in registry order
    pub fn functions_in_group(&self, group: &str) -> Vec<&FunctionInfo> {
        self.functions.iter().filter(|f| f.group == group).collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::report::{Measurement, TrialStatus};
    use sweepbench_core::{Preset, Strategy, SweepOptions, Unit, generate};
    use sweepbench_stats::CentralStatistic;

    pub fn function(id: &str, group: &str, implementation: &str) -> FunctionInfo {
        FunctionInfo {
            id: id.to_string(),
            group: group.to_string(),
            implementation: implementation.to_string(),
            device: false,
        }
    }

    pub fn success(configuration: usize, function: &str, value: f64) -> TrialRecord {
        TrialRecord {
            configuration,
            function: function.to_string(),
            strategy: Strategy::Time,
            status: TrialStatus::Success,
            reason: None,
            samples: vec![value],
            discarded: Vec::new(),
            measurement: Some(Measurement {
                value,
                spread: 0.0,
                unit: Unit::Seconds,
                strategy: Strategy::Time,
                statistic: CentralStatistic::Median,
                samples: 1,
            }),
            summary: None,
        }
    }

    pub fn failed(configuration: usize, function: &str, status: TrialStatus) -> TrialRecord {
        TrialRecord {
            status,
            reason: Some("boom".to_string()),
            measurement: None,
            samples: Vec::new(),
            ..success(configuration, function, 0.0)
        }
    }

    /// `small` sweep, one group with implementations `a` and `b`
    pub fn small_pair() -> ResultSet {
        ResultSet::new(
            generate(Preset::Small, &SweepOptions::default()),
            vec![function("a_sum", "sum", "a"), function("b_sum", "sum", "b")],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::report::TrialStatus;

    #[test]
    fn test_get_and_replace() {
        let mut results = small_pair();
        results.insert(success(0, "a_sum", 1.0));
        results.insert(success(0, "a_sum", 2.0));

        assert_eq!(results.len(), 1);
        assert_eq!(results.get(0, "a_sum").and_then(|r| r.value()), Some(2.0));
        assert!(results.get(1, "a_sum").is_none());
        assert!(results.get(0, "unknown").is_none());
    }

    #[test]
    fn test_unknown_function_ignored() {
        let mut results = small_pair();
        results.insert(success(0, "c_sum", 1.0));
        assert!(results.is_empty());
    }

    #[test]
    fn test_queries_follow_order() {
        let mut results = small_pair();
        // Inserted out of order on purpose
        results.insert(success(2, "a_sum", 3.0));
        results.insert(success(0, "b_sum", 10.0));
        results.insert(success(0, "a_sum", 1.0));
        results.insert(failed(1, "a_sum", TrialStatus::RunFailed));

        let values: Vec<_> = results.by_function("a_sum").iter().map(|r| r.configuration).collect();
        assert_eq!(values, vec![0, 1, 2]);

        let row: Vec<_> = results.by_configuration(0).iter().map(|r| r.function.as_str()).collect();
        assert_eq!(row, vec!["a_sum", "b_sum"]);

        assert_eq!(results.get(1, "a_sum").and_then(|r| r.value()), None);
        assert_eq!(results.groups(), vec!["sum"]);
        assert_eq!(results.functions_in_group("sum").len(), 2);
    }

    #[test]
    fn test_json_reload_rebuilds_index() {
        let mut results = small_pair();
        results.insert(success(1, "b_sum", 4.0));

        let json = serde_json::to_string(&results).unwrap();
        let reloaded: super::ResultSet = serde_json::from_str(&json).unwrap();

        assert_eq!(reloaded.get(1, "b_sum").and_then(|r| r.value()), Some(4.0));
    }
}
