//! Unknown layout and named state views
//!
//! A DAE model works on a flat vector of unknowns. This module keeps the
//! bookkeeping that maps that flat vector back to physics:
//!
//! - [`VariableLayout`]: ordered list of unknowns, each with a stable
//!   hierarchical name (`trode.vol0.part1.c3`) and an [`EquationKind`]
//! - [`StateSnapshot`]: the values of every named unknown at one time point
//!
//! # Naming
//!
//! Names are dot-separated paths from the coarsest container to the unknown
//! itself. They are stable for a given configuration, so a trajectory written
//! by one run can be compared name-by-name with another.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use nalgebra::DVector;

use crate::physics::traits::EquationKind;

// =================================================================================================
// Variable layout
// =================================================================================================

/// Ordered registry of unknowns
#[derive(Debug, Clone, Default)]
pub struct VariableLayout {
    names: Vec<String>,
    kinds: Vec<EquationKind>,
    index: HashMap<String, usize>,
}

impl VariableLayout {
    /// Create an empty layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one unknown and return its index
    ///
    /// # Panics
    ///
    /// Panics when `name` is already registered. Duplicate names are a bug in
    /// the model that builds the layout, not a runtime condition.
    pub fn push(&mut self, name: impl Into<String>, kind: EquationKind) -> usize {
        let name = name.into();
        let idx = self.names.len();
        let previous = self.index.insert(name.clone(), idx);
        assert!(previous.is_none(), "duplicate unknown name '{}'", name);
        self.names.push(name);
        self.kinds.push(kind);
        idx
    }

    /// Append `count` unknowns named `{prefix}{k}` and return their range
    pub fn push_block(&mut self, prefix: &str, count: usize, kind: EquationKind) -> Range<usize> {
        let start = self.names.len();
        for k in 0..count {
            self.push(format!("{prefix}{k}"), kind);
        }
        start..start + count
    }

    /// Number of unknowns
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of a named unknown
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn kinds(&self) -> &[EquationKind] {
        &self.kinds
    }

    /// Number of differential unknowns
    pub fn differential_count(&self) -> usize {
        self.kinds.iter().filter(|k| k.is_differential()).count()
    }

    /// Build a named snapshot of a state vector
    pub fn snapshot(&self, time: f64, state: &DVector<f64>) -> StateSnapshot {
        StateSnapshot {
            time,
            names: self.names.clone(),
            values: state.iter().copied().collect(),
        }
    }
}

// =================================================================================================
// State snapshot
// =================================================================================================

/// Values of every named unknown at one time point
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    /// Dimensionless time
    pub time: f64,
    names: Vec<String>,
    values: Vec<f64>,
}

impl StateSnapshot {
    pub fn new(time: f64, names: Vec<String>, values: Vec<f64>) -> Self {
        assert_eq!(names.len(), values.len(), "snapshot names and values differ in length");
        Self { time, names, values }
    }

    /// Value of a named unknown
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names.iter().position(|n| n == name).map(|i| self.values[i])
    }

    /// All `(name, value)` pairs whose name starts with `prefix`
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.names
            .iter()
            .zip(self.values.iter())
            .filter(move |(n, _)| n.starts_with(prefix))
            .map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for StateSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "t = {}", self.time)?;
        for (name, value) in self.names.iter().zip(self.values.iter()) {
            writeln!(f, "  {name} = {value:.6e}")?;
        }
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
