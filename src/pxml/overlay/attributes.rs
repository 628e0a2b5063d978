//! Per-type attribute synthesis for probability nodes
//!
//! Attributes are returned as `(local name, value)` pairs; the generator
//! places them in the probability namespace.

use super::types::ProbabilityNodeType;
use crate::pxml::condition::Condition;
use rand::seq::SliceRandom;
use rand::Rng;

/// Attribute holding the combined descriptor of an events node
pub const DESCRIPTORS_ATTRIBUTE: &str = "descriptors";

/// Local name of the `i`-th random variable
pub fn variable_name(index: usize) -> String {
    format!("var-{}", index)
}

/// Local name of the attribute carrying child `i`'s probability (1-based)
pub fn child_attribute(index: usize) -> String {
    format!("child-{}", index)
}

impl ProbabilityNodeType {
    /// Draw the attributes of a node of this type
    ///
    /// `child_count` is the node's final number of children and
    /// `num_variables` the size of the document's variable pool.
    pub fn synthesize_attributes<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        child_count: usize,
        num_variables: usize,
    ) -> Vec<(String, String)> {
        match self {
            ProbabilityNodeType::Deterministic => Vec::new(),
            ProbabilityNodeType::Independent => independent(rng, child_count),
            ProbabilityNodeType::Mutex => mutex(rng, child_count),
            ProbabilityNodeType::Explicit => {
                log::debug!("explicit nodes carry no attributes");
                Vec::new()
            }
            ProbabilityNodeType::Events => events(rng, num_variables),
        }
    }
}

/// One independent inclusion probability per child
fn independent<R: Rng + ?Sized>(rng: &mut R, child_count: usize) -> Vec<(String, String)> {
    (1..=child_count)
        .map(|i| (child_attribute(i), rng.gen::<f64>().to_string()))
        .collect()
}

/// A distribution over "no child" and each single child
fn mutex<R: Rng + ?Sized>(rng: &mut R, child_count: usize) -> Vec<(String, String)> {
    let weights: Vec<u64> = (0..=child_count)
        .map(|_| u64::from(rng.gen::<u32>()))
        .collect();
    let sum: u64 = weights.iter().sum();
    let share = |weight: u64| {
        if sum == 0 {
            1.0 / weights.len() as f64
        } else {
            weight as f64 / sum as f64
        }
    };

    let mut attributes = Vec::with_capacity(weights.len());
    attributes.push(("none".to_string(), share(weights[0]).to_string()));
    for (i, &weight) in weights.iter().enumerate().skip(1) {
        attributes.push((child_attribute(i), share(weight).to_string()));
    }
    attributes
}

/// Requirements on a random subset of the variable pool
///
/// Between one and `1 + floor(log2(num_variables))` variables are used.
/// Each gets its own attribute and the whole set is repeated as a
/// descriptor string.
fn events<R: Rng + ?Sized>(rng: &mut R, num_variables: usize) -> Vec<(String, String)> {
    let num_used = if num_variables > 1 {
        rng.gen_range(1..=1 + num_variables.ilog2() as usize)
    } else {
        1
    };

    let mut pool: Vec<usize> = (0..num_variables).collect();
    pool.shuffle(rng);

    let mut attributes = Vec::with_capacity(num_used + 1);
    let mut descriptors = Vec::with_capacity(num_used);
    for &index in pool.iter().take(num_used) {
        let value = i32::from(rng.gen_bool(0.5));
        let condition = Condition::new(variable_name(index), value);
        attributes.push((condition.name().to_string(), value.to_string()));
        descriptors.push(condition.to_string());
    }
    attributes.push((DESCRIPTORS_ATTRIBUTE.to_string(), descriptors.join(" ")));
    attributes
}
