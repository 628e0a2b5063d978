// SPDX-License-Identifier: MIT

//! The `name=value` condition record

use crate::pxml::error::ConditionError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A single variable binding, `name=value`
///
/// Ordering is by name first; equal names order by *descending* value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    name: String,
    value: i32,
}

impl Condition {
    /// Create a condition from its parts, taken as given
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Whether both conditions can hold at the same time
    ///
    /// Only the same name bound to a different value is inconsistent.
    pub fn is_consistent_with(&self, other: &Condition) -> bool {
        self.name != other.name || self.value == other.value
    }
}

impl FromStr for Condition {
    type Err = ConditionError;

    /// Parse a `name=value` token; surrounding whitespace is trimmed
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.split('=');
        let name = parts.next().unwrap_or_default().trim();
        let value = parts
            .next()
            .ok_or_else(|| ConditionError::condition(input, "expected 'name=value'"))?
            .trim();

        if name.is_empty() {
            return Err(ConditionError::condition(input, "empty name"));
        }

        let value = value.parse::<i32>().map_err(|_| {
            ConditionError::condition(input, format!("'{}' is not an integer", value))
        })?;

        Ok(Self::new(name, value))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl Ord for Condition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| other.value.cmp(&self.value))
    }
}

impl PartialOrd for Condition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
