// SPDX-License-Identifier: MIT

//! Overlay generator configuration

use super::types::ProbabilityNodeType;
use crate::pxml::document::QName;
use crate::pxml::error::{OverlayError, PxmlError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_NAMESPACE_PREFIX: &str = "p";
pub const DEFAULT_NAMESPACE_URI: &str = "http://www.cs.utwente.nl/~keulen/pxml";

/// What to do with text children of probability nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextNodeStrategy {
    /// Leave text nodes as they are
    #[default]
    Keep,
    /// Wrap every text child in a `text` element
    Wrap,
}

impl FromStr for TextNodeStrategy {
    type Err = PxmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "wrap" => Ok(Self::Wrap),
            other => Err(PxmlError::config(format!(
                "unknown text node strategy '{}' (expected 'keep' or 'wrap')",
                other
            ))),
        }
    }
}

/// Settings for an overlay pass
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Prefix of generated elements and attributes
    pub namespace_prefix: String,
    /// Namespace of generated elements and attributes
    pub namespace_uri: String,
    /// Fraction of candidate elements that trigger a wrap (0.0 - 1.0)
    pub occurrence: f64,
    /// Node types to draw from; repeat a type to make it more likely
    pub distribution: Vec<ProbabilityNodeType>,
    /// Random variables per expected events node
    pub variables_ratio: f64,
    pub text_nodes: TextNodeStrategy,
    /// Seed for reproducible overlays; entropy when absent
    pub seed: Option<u64>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        use ProbabilityNodeType::{Events, Independent, Mutex};

        Self {
            namespace_prefix: DEFAULT_NAMESPACE_PREFIX.to_string(),
            namespace_uri: DEFAULT_NAMESPACE_URI.to_string(),
            occurrence: 0.2,
            distribution: vec![
                Mutex,
                Mutex,
                Mutex,
                Mutex,
                Independent,
                Independent,
                Independent,
                Independent,
                Events,
            ],
            variables_ratio: 0.1,
            text_nodes: TextNodeStrategy::Keep,
            seed: None,
        }
    }
}

impl OverlayConfig {
    /// Reject settings that leave generation undefined
    pub fn validate(&self) -> Result<(), OverlayError> {
        if self.distribution.is_empty() {
            return Err(OverlayError::Config(
                "node type distribution is empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.occurrence) {
            return Err(OverlayError::Config(format!(
                "occurrence must be within [0, 1], got {}",
                self.occurrence
            )));
        }
        if !self.variables_ratio.is_finite() || self.variables_ratio < 0.0 {
            return Err(OverlayError::Config(format!(
                "variables ratio must be a non-negative number, got {}",
                self.variables_ratio
            )));
        }
        if self.namespace_prefix.is_empty() || self.namespace_prefix == "xmlns" {
            return Err(OverlayError::Config(format!(
                "invalid namespace prefix '{}'",
                self.namespace_prefix
            )));
        }
        if self.namespace_uri.is_empty() {
            return Err(OverlayError::Config("namespace uri is empty".to_string()));
        }
        Ok(())
    }

    /// Number of wrap operations for a document with `candidates` elements
    pub fn insertions(&self, candidates: usize) -> usize {
        (candidates as f64 * self.occurrence).floor() as usize
    }

    /// Size of the random-variable pool, scaled to the expected number of
    /// events nodes and never below one
    pub fn num_variables(&self, candidates: usize) -> usize {
        let events = self
            .distribution
            .iter()
            .filter(|&&t| t == ProbabilityNodeType::Events)
            .count();
        let share = events as f64 / self.distribution.len().max(1) as f64;
        let expected = candidates as f64 * self.occurrence * share * self.variables_ratio;
        (expected.floor() as usize).max(1)
    }

    /// Name `local` in the probability namespace
    pub fn name(&self, local: &str) -> QName {
        QName::qualified(&self.namespace_prefix, &self.namespace_uri, local)
    }
}

/// Loads overlay configuration from YAML files
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a configuration from a YAML file
    pub fn load_config<P: AsRef<Path>>(&self, path: P) -> Result<OverlayConfig, PxmlError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a configuration from a YAML string; missing fields take defaults
    pub fn parse_yaml(content: &str) -> Result<OverlayConfig, PxmlError> {
        let config: OverlayConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
