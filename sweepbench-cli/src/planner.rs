//! Function Planner
//!
//! Builds the execution plan by filtering registered functions.
//!
//! Filtering options:
//! - Regex pattern matching on function ID
//! - Group filtering
//! - Slow and device-backed exclusion
//! - External dependency availability
//!
//! Ordering: functions keep registry order, which is also column order.

use regex::Regex;
use sweepbench_core::{FunctionDef, Registry, SweepError};
use tracing::{debug, warn};

/// Why a registered function will not run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Rejected by `--fns` or `--group`
    Filtered,
    /// Marked slow and `--no-slow` given
    Slow,
    /// Device-backed and `--no-gpu` given
    DeviceDisabled,
    /// Device-backed but no device was injected
    NoDevice,
    /// Required library is not available
    MissingDependency(&'static str),
}

/// Excluded function and the reason
#[derive(Debug, Clone)]
pub struct Exclusion {
    /// The function
    pub function: FunctionDef,
    /// Why it was excluded
    pub reason: ExclusionReason,
}

/// Filters applied to the registry
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions<'a> {
    /// Keep ids matching this pattern
    pub filter: Option<&'a Regex>,
    /// Keep only this group
    pub group: Option<&'a str>,
    /// Drop slow functions
    pub no_slow: bool,
    /// Drop device-backed functions
    pub no_device: bool,
    /// Whether a device was injected for the run
    pub device_available: bool,
}

/// Execution plan for a sweep
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    /// Functions to run, in registry order
    pub functions: Vec<FunctionDef>,
    /// Functions left out, in registry order
    pub excluded: Vec<Exclusion>,
}

/// Build execution plan from the registry
pub fn build_plan(registry: &Registry, options: &PlanOptions<'_>) -> ExecutionPlan {
    let mut plan = ExecutionPlan::default();

    for def in registry.iter() {
        match exclusion_reason(def, options) {
            None => plan.functions.push(*def),
            Some(reason) => {
                match &reason {
                    ExclusionReason::Filtered => {}
                    ExclusionReason::MissingDependency(library) => warn!(
                        "Excluding {}: required library `{}` is not available",
                        def.id, library
                    ),
                    ExclusionReason::NoDevice => {
                        warn!("Excluding {}: device-backed and no device is available", def.id)
                    }
                    other => debug!("Excluding {}: {:?}", def.id, other),
                }
                plan.excluded.push(Exclusion {
                    function: *def,
                    reason,
                });
            }
        }
    }

    plan
}

fn exclusion_reason(def: &FunctionDef, options: &PlanOptions<'_>) -> Option<ExclusionReason> {
    if let Some(re) = options.filter {
        if !re.is_match(def.id) {
            return Some(ExclusionReason::Filtered);
        }
    }
    if let Some(group) = options.group {
        if def.group != group {
            return Some(ExclusionReason::Filtered);
        }
    }
    if options.no_slow && def.slow {
        return Some(ExclusionReason::Slow);
    }
    if def.device {
        if options.no_device {
            return Some(ExclusionReason::DeviceDisabled);
        }
        if !options.device_available {
            return Some(ExclusionReason::NoDevice);
        }
    }
    if let Some(requirement) = def.requires {
        if !(requirement.available)() {
            return Some(ExclusionReason::MissingDependency(requirement.library));
        }
    }
    None
}

impl ExecutionPlan {
    /// Check the plan can run and resolve the reference implementation.
    ///
    /// Returns the reference label when ratios are enabled. A missing
    /// dependency is fatal when it leaves nothing to run or removes the
    /// reference from a group that still has functions.
    pub fn validate(
        &self,
        ratio: bool,
        reference: Option<&str>,
    ) -> Result<Option<String>, SweepError> {
        let missing = |e: &Exclusion| match e.reason {
            ExclusionReason::MissingDependency(library) => Some(SweepError::MissingDependency {
                function: e.function.id.to_string(),
                library: library.to_string(),
            }),
            _ => None,
        };

        if self.functions.is_empty() {
            return Err(self
                .excluded
                .iter()
                .find_map(missing)
                .unwrap_or_else(|| SweepError::config("no functions selected")));
        }

        if !ratio {
            return Ok(None);
        }

        let label = match reference {
            Some(label) => label,
            None => self.functions[0].implementation,
        };

        for exclusion in &self.excluded {
            let lost_reference = exclusion.function.implementation == label
                && self
                    .functions
                    .iter()
                    .any(|f| f.group == exclusion.function.group);
            if lost_reference {
                if let Some(err) = missing(exclusion) {
                    return Err(err);
                }
            }
        }

        if !self.functions.iter().any(|f| f.implementation == label) {
            return Err(SweepError::config(format!(
                "reference implementation `{}` matches no selected function",
                label
            )));
        }

        let mut groups: Vec<&str> = Vec::new();
        for function in &self.functions {
            if !groups.contains(&function.group) {
                groups.push(function.group);
            }
        }
        for group in groups {
            let has_reference = self
                .functions
                .iter()
                .any(|f| f.group == group && f.implementation == label);
            if !has_reference {
                warn!(
                    "Group `{}` has no `{}` implementation selected; its ratios are undefined",
                    group, label
                );
            }
        }

        Ok(Some(label.to_string()))
    }
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionReason::Filtered => write!(f, "filtered"),
            ExclusionReason::Slow => write!(f, "slow"),
            ExclusionReason::DeviceDisabled => write!(f, "device disabled"),
            ExclusionReason::NoDevice => write!(f, "no device"),
            ExclusionReason::MissingDependency(library) => write!(f, "missing {}", library),
        }
    }
}

/// One row of the `list` output
#[derive(Debug, Clone)]
pub struct ListEntry {
    /// Function id
    pub id: &'static str,
    /// Implementation label
    pub implementation: &'static str,
    /// Device-backed
    pub device: bool,
    /// Marked slow
    pub slow: bool,
    /// Required external library
    pub requires: Option<&'static str>,
    /// Why the function would not run, if excluded
    pub excluded: Option<ExclusionReason>,
}

/// Registered functions grouped for listing
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Groups in first-appearance order
    pub groups: Vec<(&'static str, Vec<ListEntry>)>,
    /// Number of listed functions
    pub total: usize,
}

/// Group the plan's functions for the `list` subcommand.
///
/// Functions dropped by `--fns` or `--group` are left out; every other
/// exclusion is shown with its reason.
pub fn list_functions(registry: &Registry, plan: &ExecutionPlan) -> Listing {
    let mut listing = Listing::default();

    for def in registry.iter() {
        let excluded = plan
            .excluded
            .iter()
            .find(|e| e.function.id == def.id)
            .map(|e| e.reason.clone());
        if excluded == Some(ExclusionReason::Filtered) {
            continue;
        }

        let entry = ListEntry {
            id: def.id,
            implementation: def.implementation,
            device: def.device,
            slow: def.slow,
            requires: def.requires.map(|r| r.library),
            excluded,
        };
        match listing.groups.iter_mut().find(|(g, _)| *g == def.group) {
            Some((_, entries)) => entries.push(entry),
            None => listing.groups.push((def.group, vec![entry])),
        }
        listing.total += 1;
    }

    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepbench_core::{BenchFunction, FunctionError, TrialContext};

    struct Noop;

    impl BenchFunction for Noop {
        fn setup(&mut self, _ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
            Ok(())
        }

        fn run(&mut self, _ctx: &TrialContext<'_>) -> Result<(), FunctionError> {
            Ok(())
        }
    }

    fn noop() -> Box<dyn BenchFunction> {
        Box::new(Noop)
    }

    fn missing() -> bool {
        false
    }

    fn registry() -> Registry {
        Registry::from_defs(vec![
            FunctionDef::new("naive_sum", "sum", "naive", noop),
            FunctionDef::new("fast_sum", "sum", "fast", noop),
            FunctionDef::new("gpu_sum", "sum", "gpu", noop).on_device(),
            FunctionDef::new("slow_sum", "sum", "slow", noop).slow(),
            FunctionDef::new("naive_prod", "prod", "naive", noop),
        ])
        .unwrap()
    }

    fn ids(plan: &ExecutionPlan) -> Vec<&str> {
        plan.functions.iter().map(|f| f.id).collect()
    }

    #[test]
    fn test_group_without_reference_is_not_fatal() {
        // `prod` has no `fast` implementation; its ratios are simply undefined
        let plan = build_plan(&registry(), &PlanOptions::default());
        assert_eq!(plan.validate(true, Some("fast")).unwrap(), Some("fast".to_string()));
    }

    #[test]
    fn test_no_filter_keeps_registry_order() {
        let options = PlanOptions {
            device_available: true,
            ..PlanOptions::default()
        };
        let plan = build_plan(&registry(), &options);
        assert_eq!(
            ids(&plan),
            vec!["naive_sum", "fast_sum", "gpu_sum", "slow_sum", "naive_prod"]
        );
    }

    #[test]
    fn test_regex_and_group() {
        let re = Regex::new("^naive").unwrap();
        let options = PlanOptions {
            filter: Some(&re),
            group: Some("sum"),
            ..PlanOptions::default()
        };
        let plan = build_plan(&registry(), &options);
        assert_eq!(ids(&plan), vec!["naive_sum"]);
    }

    #[test]
    fn test_slow_and_device_flags() {
        let options = PlanOptions {
            no_slow: true,
            no_device: true,
            device_available: true,
            ..PlanOptions::default()
        };
        let plan = build_plan(&registry(), &options);
        assert_eq!(ids(&plan), vec!["naive_sum", "fast_sum", "naive_prod"]);
        assert!(plan
            .excluded
            .iter()
            .any(|e| e.reason == ExclusionReason::DeviceDisabled));
    }

    #[test]
    fn test_no_device_excludes_device_functions() {
        let plan = build_plan(&registry(), &PlanOptions::default());
        assert!(!ids(&plan).contains(&"gpu_sum"));
        assert!(plan.excluded.iter().any(|e| e.reason == ExclusionReason::NoDevice));
    }

    #[test]
    fn test_missing_dependency_non_fatal() {
        let registry = Registry::from_defs(vec![
            FunctionDef::new("naive_sum", "sum", "naive", noop),
            FunctionDef::new("ext_sum", "sum", "ext", noop).requires("extlib", missing),
        ])
        .unwrap();
        let plan = build_plan(&registry, &PlanOptions::default());

        assert_eq!(ids(&plan), vec!["naive_sum"]);
        assert_eq!(plan.validate(true, None).unwrap(), Some("naive".to_string()));
    }

    #[test]
    fn test_missing_reference_is_fatal() {
        let registry = Registry::from_defs(vec![
            FunctionDef::new("ext_sum", "sum", "ext", noop).requires("extlib", missing),
            FunctionDef::new("naive_sum", "sum", "naive", noop),
        ])
        .unwrap();
        let plan = build_plan(&registry, &PlanOptions::default());

        let err = plan.validate(true, Some("ext")).unwrap_err();
        assert!(matches!(
            err,
            SweepError::MissingDependency { ref library, .. } if library == "extlib"
        ));
        // Without ratios the reference does not matter
        assert!(plan.validate(false, Some("ext")).is_ok());
    }

    #[test]
    fn test_nothing_left_to_run() {
        let registry = Registry::from_defs(vec![
            FunctionDef::new("ext_sum", "sum", "ext", noop).requires("extlib", missing),
        ])
        .unwrap();
        let plan = build_plan(&registry, &PlanOptions::default());
        assert!(matches!(
            plan.validate(false, None),
            Err(SweepError::MissingDependency { .. })
        ));

        let empty = ExecutionPlan::default();
        assert!(matches!(empty.validate(true, None), Err(SweepError::Configuration(_))));
    }

    #[test]
    fn test_listing_shows_exclusions() {
        let re = Regex::new("sum").unwrap();
        let options = PlanOptions {
            filter: Some(&re),
            ..PlanOptions::default()
        };
        let registry = registry();
        let plan = build_plan(&registry, &options);
        let listing = list_functions(&registry, &plan);

        assert_eq!(listing.total, 4);
        assert_eq!(listing.groups.len(), 1);
        let (group, entries) = &listing.groups[0];
        assert_eq!(*group, "sum");
        let gpu = entries.iter().find(|e| e.id == "gpu_sum").unwrap();
        assert_eq!(gpu.excluded, Some(ExclusionReason::NoDevice));
    }

    #[test]
    fn test_unknown_reference() {
        let plan = build_plan(&registry(), &PlanOptions::default());
        assert!(matches!(
            plan.validate(true, Some("nope")),
            Err(SweepError::Configuration(_))
        ));
    }
}
