// SPDX-License-Identifier: MIT

//! Probability tables: per-variable value -> probability lookups

use crate::pxml::error::PxmlError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Source of per-variable probabilities
pub trait ProbabilityTable {
    /// Probability of `variable` taking `value`; 0.0 when the table has no entry
    fn lookup(&self, variable: &str, value: i32) -> f64;
}

impl<T: ProbabilityTable + ?Sized> ProbabilityTable for &T {
    fn lookup(&self, variable: &str, value: i32) -> f64 {
        (**self).lookup(variable, value)
    }
}

/// In-memory probability table
///
/// Deserializes from YAML of the form:
/// ```yaml
/// x: { 0: 0.3, 1: 0.7 }
/// y: { 0: 0.5, 1: 0.5 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MemoryTable {
    variables: HashMap<String, HashMap<i32, f64>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the probability of `variable` taking `value`
    pub fn insert(&mut self, variable: impl Into<String>, value: i32, probability: f64) {
        self.variables
            .entry(variable.into())
            .or_default()
            .insert(value, probability);
    }

    /// Load a table from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PxmlError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a table from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Self, PxmlError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl ProbabilityTable for MemoryTable {
    fn lookup(&self, variable: &str, value: i32) -> f64 {
        self.variables
            .get(variable)
            .and_then(|values| values.get(&value))
            .copied()
            .unwrap_or(0.0)
    }
}
