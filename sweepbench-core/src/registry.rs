//! Function Registry
//!
//! The static table of candidate implementations. Built once at process
//! start and read-only afterwards.

use crate::FunctionDef;
use crate::error::SweepError;
use tracing::debug;

/// Registered functions in a stable order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    functions: Vec<FunctionDef>,
}

impl Registry {
    /// Collect every `FunctionDef` submitted with [`register!`](crate::register).
    ///
    /// Link order is not stable across builds, so entries are sorted by
    /// `(group, implementation, id)`.
    pub fn discover() -> Result<Self, SweepError> {
        let mut functions: Vec<FunctionDef> = inventory::iter::<FunctionDef>
            .into_iter()
            .copied()
            .collect();
        functions.sort_by(|a, b| {
            (a.group, a.implementation, a.id).cmp(&(b.group, b.implementation, b.id))
        });
        debug!("Discovered {} registered functions", functions.len());
        Self::from_defs(functions)
    }

    /// Build a registry from explicit definitions, keeping their order.
    pub fn from_defs(functions: Vec<FunctionDef>) -> Result<Self, SweepError> {
        for (i, def) in functions.iter().enumerate() {
            if functions[..i].iter().any(|other| other.id == def.id) {
                return Err(SweepError::config(format!(
                    "function id `{}` is registered more than once",
                    def.id
                )));
            }
        }
        Ok(Self { functions })
    }

    /// All functions in registry order
    pub fn iter(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.iter()
    }

    /// Look up a function by id
    pub fn get(&self, id: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.id == id)
    }

    /// Group names in first-appearance order
    pub fn groups(&self) -> Vec<&'static str> {
        let mut groups = Vec::new();
        for def in &self.functions {
            if !groups.contains(&def.group) {
                groups.push(def.group);
            }
        }
        groups
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FunctionError;
    use crate::function::{BenchFunction, TrialContext};

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

    #[test]
    fn test_duplicate_ids_rejected() {
        let defs = vec![
            FunctionDef::new("a", "sum", "naive", noop),
            FunctionDef::new("a", "sum", "fast", noop),
        ];
        let err = Registry::from_defs(defs).unwrap_err();
        assert!(err.to_string().contains("`a`"));
    }

    #[test]
    fn test_groups_in_order() {
        let registry = Registry::from_defs(vec![
            FunctionDef::new("b_fwd", "forward", "b", noop),
            FunctionDef::new("a_bwd", "backward", "a", noop),
            FunctionDef::new("a_fwd", "forward", "a", noop),
        ])
        .unwrap();

        assert_eq!(registry.groups(), vec!["forward", "backward"]);
        assert_eq!(registry.get("a_bwd").map(|f| f.implementation), Some("a"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 3);
    }
}
