//! Descriptor algebra: combine, consistency and mutual exclusion

use super::parser::ConditionParser;
use super::types::Condition;
use crate::pxml::error::ConditionError;
use std::collections::{BTreeSet, HashMap};

/// Merge descriptors into one, dropping exact `name=value` repeats
///
/// Conditions sharing a name but not a value all survive. The result is
/// joined with single spaces; callers must not rely on its order.
pub fn combine<S: AsRef<str>>(descriptors: &[S]) -> Result<String, ConditionError> {
    let mut combined = BTreeSet::new();
    for descriptor in descriptors {
        for condition in ConditionParser::new(descriptor.as_ref()) {
            combined.insert(condition?);
        }
    }

    Ok(combined
        .iter()
        .map(Condition::to_string)
        .collect::<Vec<_>>()
        .join(" "))
}

/// Whether no name in the descriptor is bound to two different values
pub fn consistent(descriptor: &str) -> Result<bool, ConditionError> {
    let mut seen: HashMap<String, i32> = HashMap::new();

    for condition in ConditionParser::new(descriptor) {
        let condition = condition?;
        match seen.get(condition.name()) {
            Some(&value) if value != condition.value() => return Ok(false),
            Some(_) => {}
            None => {
                seen.insert(condition.name().to_string(), condition.value());
            }
        }
    }

    Ok(true)
}

/// Whether some name is bound to different values in `a` and `b`
///
/// `a` is read into a map where the last value for a repeated name wins;
/// `a` itself is not checked for consistency.
pub fn mutually_exclusive(a: &str, b: &str) -> Result<bool, ConditionError> {
    let mut bindings: HashMap<String, i32> = HashMap::new();
    for condition in ConditionParser::new(a) {
        let condition = condition?;
        bindings.insert(condition.name().to_string(), condition.value());
    }

    for condition in ConditionParser::new(b) {
        let condition = condition?;
        if let Some(&value) = bindings.get(condition.name()) {
            if value != condition.value() {
                return Ok(true);
            }
        }
    }

    Ok(false)
}
