// SPDX-License-Identifier: MIT

//! Session-scoped cache of resolved condition probabilities

use crate::pxml::condition::Condition;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Key of a cached probability: evaluation context plus condition
///
/// Ordered context-major, condition-minor. Equality compares the
/// condition first since it differs far more often than the context.
#[derive(Debug, Clone, Eq)]
pub struct CacheKey {
    context: String,
    condition: Condition,
}

impl CacheKey {
    pub fn new(context: impl Into<String>, condition: Condition) -> Self {
        Self {
            context: context.into(),
            condition,
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.condition == other.condition && self.context == other.context
    }
}

impl Ord for CacheKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.context
            .cmp(&other.context)
            .then_with(|| self.condition.cmp(&other.condition))
    }
}

impl PartialOrd for CacheKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cache of probabilities for one evaluation session
///
/// Not shared across sessions; call `clear` (or build a new cache) before
/// evaluating against a different table.
#[derive(Debug, Clone, Default)]
pub struct ProbabilityCache {
    entries: BTreeMap<CacheKey, f64>,
    hits: u64,
    misses: u64,
}

impl ProbabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached probability, recording a hit or miss
    pub fn get(&mut self, key: &CacheKey) -> Option<f64> {
        match self.entries.get(key) {
            Some(&probability) => {
                self.hits += 1;
                Some(probability)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up without touching the counters
    pub fn peek(&self, key: &CacheKey) -> Option<f64> {
        self.entries.get(key).copied()
    }

    pub fn insert(&mut self, key: CacheKey, probability: f64) {
        self.entries.insert(key, probability);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop all entries and reset the counters
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Cached keys in key order
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.keys()
    }
}
