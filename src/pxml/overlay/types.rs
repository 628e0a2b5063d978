//! Probability node types and the overlay summary

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of probabilistic choice a probability node makes over its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum ProbabilityNodeType {
    /// Every child is chosen
    #[serde(rename = "det")]
    Deterministic,
    /// Children are chosen independently of each other
    #[serde(rename = "ind")]
    Independent,
    /// At most one child is chosen
    #[serde(rename = "mux")]
    Mutex,
    /// Each subset of children has an explicit probability
    #[serde(rename = "exp")]
    Explicit,
    /// Children are chosen by a conjunction of document-wide events
    #[serde(rename = "cie")]
    Events,
}

impl ProbabilityNodeType {
    pub const ALL: [ProbabilityNodeType; 5] = [
        ProbabilityNodeType::Deterministic,
        ProbabilityNodeType::Independent,
        ProbabilityNodeType::Mutex,
        ProbabilityNodeType::Explicit,
        ProbabilityNodeType::Events,
    ];

    /// Local element name of nodes of this type
    pub fn node_name(&self) -> &'static str {
        match self {
            ProbabilityNodeType::Deterministic => "det",
            ProbabilityNodeType::Independent => "ind",
            ProbabilityNodeType::Mutex => "mux",
            ProbabilityNodeType::Explicit => "exp",
            ProbabilityNodeType::Events => "cie",
        }
    }
}

impl fmt::Display for ProbabilityNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node_name())
    }
}

/// Outcome of one overlay pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlaySummary {
    /// Elements eligible for wrapping
    pub candidates: usize,
    /// Wrap operations performed
    pub insertions: usize,
    /// Size of the random-variable pool
    pub variables: usize,
    /// Text nodes wrapped in `text` elements
    pub wrapped_text: usize,
    /// Probability nodes left in the document, by type
    pub nodes: BTreeMap<ProbabilityNodeType, usize>,
}
